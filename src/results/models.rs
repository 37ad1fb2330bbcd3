use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::models::GameMode;
use crate::game::state::GameState;
use crate::player::PlayerModel;

/// Immutable leaderboard record, one per (game, player), written once at
/// finalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: Uuid,
    pub game_id: String,
    pub player_id: Uuid,
    /// `None` for guests, who never appear on cross-game boards.
    pub user_id: Option<Uuid>,
    pub display_name: String,
    pub mode: GameMode,
    pub score: u32,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    pub final_rank: u32,
    pub recorded_at: DateTime<Utc>,
}

impl LeaderboardEntry {
    pub fn from_player(player: &PlayerModel, mode: GameMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            game_id: player.game_id.clone(),
            player_id: player.id,
            user_id: player.user_id(),
            display_name: player.display_name().to_string(),
            mode,
            score: player.score,
            correct_answers: player.correct_answers,
            wrong_answers: player.wrong_answers,
            final_rank: player.final_rank.unwrap_or(0),
            recorded_at: Utc::now(),
        }
    }
}

/// One row of a finalized game's standings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStanding {
    pub player_id: Uuid,
    pub display_name: String,
    pub rank: u32,
    pub score: u32,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    pub skipped_answers: u32,
    pub accuracy_pct: f64,
}

impl From<&PlayerModel> for PlayerStanding {
    fn from(player: &PlayerModel) -> Self {
        Self {
            player_id: player.id,
            display_name: player.display_name().to_string(),
            rank: player.final_rank.unwrap_or(0),
            score: player.score,
            correct_answers: player.correct_answers,
            wrong_answers: player.wrong_answers,
            skipped_answers: player.skipped_answers,
            accuracy_pct: player.accuracy_pct(),
        }
    }
}

/// Headline numbers derived from the standings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSummary {
    pub winner: Option<PlayerStanding>,
    /// Standings holding ranks 1 through 3, in rank order.
    pub podium: Vec<PlayerStanding>,
    pub top_scorer: Option<PlayerStanding>,
    pub average_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameResults {
    pub game_id: String,
    pub mode: GameMode,
    pub total_questions: u32,
    pub questions_played: u32,
    pub standings: Vec<PlayerStanding>,
    pub summary: GameSummary,
}

impl GameResults {
    /// Builds the results view from a finalized game. Callers must have
    /// assigned `final_rank` to every player first.
    pub fn from_state(game: &GameState) -> Self {
        let standings: Vec<PlayerStanding> =
            game.players_ranked().into_iter().map(Into::into).collect();

        let winner = standings.first().cloned();
        let podium = standings
            .iter()
            .filter(|s| (1..=3).contains(&s.rank))
            .cloned()
            .collect();
        let top_scorer = standings
            .iter()
            .max_by(|a, b| a.score.cmp(&b.score))
            .cloned();
        let average_score = if standings.is_empty() {
            0.0
        } else {
            standings.iter().map(|s| f64::from(s.score)).sum::<f64>() / standings.len() as f64
        };

        Self {
            game_id: game.id.clone(),
            mode: game.mode,
            total_questions: game.total_questions,
            questions_played: game.current_question,
            standings,
            summary: GameSummary {
                winner,
                podium,
                top_scorer,
                average_score,
            },
        }
    }
}
