use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::models::{GameResults, LeaderboardEntry};
use super::repository::LeaderboardRepository;
use crate::event::{EventBus, GameEvent};
use crate::game::models::{GameMode, GameStatus};
use crate::game::state::GameState;
use crate::game::store::GameStore;
use crate::shared::{AppError, AppState};

/// Finalization and ranking. Rank assignment happens inside the store's
/// atomic `mutate`; leaderboard writes follow and are individually
/// idempotent, so a crashed or retried finalization converges.
#[derive(Clone)]
pub struct ResultsService {
    store: Arc<GameStore>,
    repository: Arc<dyn LeaderboardRepository>,
    event_bus: EventBus,
}

impl ResultsService {
    pub fn new(
        store: Arc<GameStore>,
        repository: Arc<dyn LeaderboardRepository>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            store,
            repository,
            event_bus,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            Arc::clone(&state.game_store),
            Arc::clone(&state.leaderboard_repository),
            state.event_bus.clone(),
        )
    }

    /// Completes the game (if the host ends it early), assigns final ranks,
    /// and records one leaderboard entry per player. Calling it again on a
    /// finalized game re-serves the existing results without recomputation.
    #[instrument(skip(self))]
    pub async fn finalize_game(&self, game_id: &str, caller: Uuid) -> Result<GameResults, AppError> {
        let (game, newly_finalized, completed_now) = self
            .store
            .mutate(game_id, |game| {
                if game.host_id != caller {
                    return Err(AppError::Forbidden(
                        "only the host can finalize the game".to_string(),
                    ));
                }
                if game.status == GameStatus::Waiting {
                    return Err(AppError::Conflict("game has not started".to_string()));
                }
                if is_finalized(game) {
                    return Ok((game.clone(), false, false));
                }
                let completed_now = game.status != GameStatus::Completed;
                if completed_now {
                    game.complete()?;
                }
                assign_ranks(game);
                Ok((game.clone(), true, completed_now))
            })
            .await?;

        if newly_finalized {
            let mut written = 0;
            for player in &game.players {
                let entry = LeaderboardEntry::from_player(player, game.mode);
                if self.repository.insert_if_absent(entry).await? {
                    written += 1;
                }
            }
            info!(game_id = %game_id, players = game.players.len(), written, "Game finalized");
            // Modes that auto-complete already broadcast the completion
            // event when the last round resolved.
            if completed_now {
                self.event_bus
                    .emit(GameEvent::GameCompleted {
                        game_id: game_id.to_string(),
                        winner_id: game.players_ranked().first().map(|p| p.id),
                    })
                    .await;
            }
            // No further events can occur for this game.
            self.event_bus.close_game(game_id).await;
        } else {
            debug!(game_id = %game_id, "Game already finalized, re-serving results");
        }

        Ok(GameResults::from_state(&game))
    }

    /// Read-only view of a finalized game's results.
    #[instrument(skip(self))]
    pub async fn get_results(&self, game_id: &str) -> Result<GameResults, AppError> {
        let game = self.store.get(game_id).await?;
        if !is_finalized(&game) {
            return Err(AppError::Conflict(
                "game has not been finalized".to_string(),
            ));
        }
        Ok(GameResults::from_state(&game))
    }

    #[instrument(skip(self))]
    pub async fn top_entries(
        &self,
        mode: Option<GameMode>,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, AppError> {
        self.repository.top_entries(mode, limit).await
    }
}

fn is_finalized(game: &GameState) -> bool {
    game.status == GameStatus::Completed
        && !game.players.is_empty()
        && game.players.iter().all(|p| p.final_rank.is_some())
}

/// Competition ranking: players tied on (score, correct answers) share a
/// rank, and the next distinct player takes their 1-based position, so a
/// two-way tie for first yields ranks 1, 1, 3.
fn assign_ranks(game: &mut GameState) {
    let mut order: Vec<usize> = (0..game.players.len()).collect();
    order.sort_by(|&a, &b| {
        let pa = &game.players[a];
        let pb = &game.players[b];
        pb.score
            .cmp(&pa.score)
            .then(pb.correct_answers.cmp(&pa.correct_answers))
            .then(pa.player_order.cmp(&pb.player_order))
    });

    let mut prev_key: Option<(u32, u32)> = None;
    let mut prev_rank = 0;
    for (position, &idx) in order.iter().enumerate() {
        let key = (game.players[idx].score, game.players[idx].correct_answers);
        let rank = if prev_key == Some(key) {
            prev_rank
        } else {
            position as u32 + 1
        };
        game.players[idx].final_rank = Some(rank);
        prev_key = Some(key);
        prev_rank = rank;
    }
}
