use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::{GameMode, GamePhase, GameStatus};
use super::state::GameState;
use crate::player::PlayerModel;
use crate::question::{Question, QuestionKind, SubmittedAnswer};

/// Request payload for creating a new game
#[derive(Debug, Deserialize)]
pub struct CreateGameRequest {
    pub host_id: Uuid,
    pub mode: GameMode,
    pub total_questions: u32,
}

/// Request payload for joining a game: authenticated users carry their id,
/// guests only a display name.
#[derive(Debug, Deserialize)]
pub struct JoinGameRequest {
    pub user_id: Option<Uuid>,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LeaveGameRequest {
    pub player_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct StartGameRequest {
    pub host_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SelectCategoryRequest {
    pub player_id: Uuid,
    pub category_id: Uuid,
    pub difficulty_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct DrawQuestionRequest {
    pub player_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub player_id: Uuid,
    pub question_id: Uuid,
    pub answer: SubmittedAnswer,
}

#[derive(Debug, Deserialize)]
pub struct TimeoutRequest {
    pub player_id: Uuid,
    pub question_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct FinalizeGameRequest {
    pub host_id: Uuid,
}

/// Query parameters for the cross-game leaderboard.
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub mode: Option<GameMode>,
    pub limit: Option<usize>,
}

/// Snapshot of a game's public fields.
#[derive(Debug, Clone, Serialize)]
pub struct GameResponse {
    pub id: String,
    pub mode: GameMode,
    pub status: GameStatus,
    pub phase: GamePhase,
    pub current_player_id: Option<Uuid>,
    pub current_turn: u32,
    pub current_question: u32,
    pub total_questions: u32,
    pub player_count: usize,
}

impl From<&GameState> for GameResponse {
    fn from(game: &GameState) -> Self {
        Self {
            id: game.id.clone(),
            mode: game.mode,
            status: game.status,
            phase: game.phase,
            current_player_id: game.current_player_id,
            current_turn: game.current_turn,
            current_question: game.current_question,
            total_questions: game.total_questions,
            player_count: game.players.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerResponse {
    pub id: Uuid,
    pub display_name: String,
    pub is_guest: bool,
    pub player_order: u32,
    pub score: u32,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    pub skipped_answers: u32,
    pub final_rank: Option<u32>,
}

impl From<&PlayerModel> for PlayerResponse {
    fn from(player: &PlayerModel) -> Self {
        Self {
            id: player.id,
            display_name: player.display_name().to_string(),
            is_guest: player.user_id().is_none(),
            player_order: player.player_order,
            score: player.score,
            correct_answers: player.correct_answers,
            wrong_answers: player.wrong_answers,
            skipped_answers: player.skipped_answers,
            final_rank: player.final_rank,
        }
    }
}

/// A drawn question as served to clients: answers included, correctness
/// flags stripped.
#[derive(Debug, Clone, Serialize)]
pub struct ServedQuestion {
    pub id: Uuid,
    pub category_id: Uuid,
    pub difficulty_id: Uuid,
    pub text: String,
    pub points: u32,
    pub time_limit_secs: u32,
    pub question_number: u32,
    pub answers: Vec<ServedAnswer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServedAnswer {
    pub id: Uuid,
    pub text: String,
}

impl ServedQuestion {
    pub fn from_question(question: &Question, question_number: u32) -> Self {
        // Text questions carry their correct text as the sole answer row,
        // so they are served with no answer list at all.
        let answers = if question.kind == QuestionKind::TextInput {
            Vec::new()
        } else {
            question
                .answers
                .iter()
                .map(|a| ServedAnswer {
                    id: a.id,
                    text: a.text.clone(),
                })
                .collect()
        };
        Self {
            id: question.id,
            category_id: question.category_id,
            difficulty_id: question.difficulty_id,
            text: question.text.clone(),
            points: question.points,
            time_limit_secs: question.time_limit_secs,
            question_number,
            answers,
        }
    }
}
