use rand::seq::IndexedRandom;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::models::{GameMode, GamePhase, GameStatus};
use super::state::{AnswerOutcome, GameState, Selection, TimeoutOutcome};
use super::store::GameStore;
use crate::entitlement::QuotaChecker;
use crate::event::{EventBus, GameEvent};
use crate::player::{PlayerIdentity, PlayerModel};
use crate::question::bank::{Catalog, QuestionBank};
use crate::question::{Question, SubmittedAnswer};
use crate::shared::{AppError, AppState};
use uuid::Uuid;

const CREATE_ATTEMPTS: usize = 3;

/// Service for the game lifecycle and the turn/round engine. Owns no state
/// of its own; every mutation goes through the store's atomic `mutate`.
#[derive(Clone)]
pub struct GameService {
    store: Arc<GameStore>,
    question_bank: Arc<dyn QuestionBank>,
    catalog: Arc<dyn Catalog>,
    quota_checker: Arc<dyn QuotaChecker>,
    event_bus: EventBus,
}

impl GameService {
    pub fn new(
        store: Arc<GameStore>,
        question_bank: Arc<dyn QuestionBank>,
        catalog: Arc<dyn Catalog>,
        quota_checker: Arc<dyn QuotaChecker>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            store,
            question_bank,
            catalog,
            quota_checker,
            event_bus,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            Arc::clone(&state.game_store),
            Arc::clone(&state.question_bank),
            Arc::clone(&state.catalog),
            Arc::clone(&state.quota_checker),
            state.event_bus.clone(),
        )
    }

    /// Creates a new game with a generated join code, after checking the
    /// host's quota for the requested mode.
    #[instrument(skip(self))]
    pub async fn create_game(
        &self,
        host_id: Uuid,
        mode: GameMode,
        total_questions: u32,
    ) -> Result<GameState, AppError> {
        if total_questions == 0 {
            return Err(AppError::InvalidInput(
                "a game needs at least one question".to_string(),
            ));
        }
        if !self
            .quota_checker
            .has_remaining_quota(host_id, mode)
            .await?
        {
            return Err(AppError::Exhausted(format!(
                "game quota exhausted for mode {}",
                mode
            )));
        }

        // Join codes are short pet names; retry the rare collision.
        let mut last_err = None;
        for _ in 0..CREATE_ATTEMPTS {
            let id = petname::Petnames::default().generate_one(2, "-");
            let game = GameState::new(id.clone(), mode, host_id, total_questions);
            match self.store.insert(game.clone()).await {
                Ok(()) => {
                    info!(game_id = %id, mode = %mode, "Game created");
                    self.event_bus
                        .emit(GameEvent::GameCreated {
                            game_id: id,
                            host_id,
                            mode,
                        })
                        .await;
                    return Ok(game);
                }
                Err(err) => {
                    warn!(game_id = %id, "Join code collision, retrying");
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| AppError::Unexpected("game creation failed".to_string())))
    }

    #[instrument(skip(self))]
    pub async fn get_game(&self, game_id: &str) -> Result<GameState, AppError> {
        self.store.get(game_id).await
    }

    /// Players ordered by their seat (`player_order`).
    #[instrument(skip(self))]
    pub async fn list_players(&self, game_id: &str) -> Result<Vec<PlayerModel>, AppError> {
        let game = self.store.get(game_id).await?;
        Ok(game.players_by_order().into_iter().cloned().collect())
    }

    #[instrument(skip(self))]
    pub async fn join_game(
        &self,
        game_id: &str,
        identity: PlayerIdentity,
    ) -> Result<PlayerModel, AppError> {
        let player = self
            .store
            .mutate(game_id, |game| game.add_player(identity))
            .await?;

        let game = self.store.get(game_id).await?;
        info!(
            game_id = %game_id,
            player_id = %player.id,
            display_name = %player.display_name(),
            "Player joined game"
        );
        self.event_bus
            .emit(GameEvent::PlayerJoined {
                game_id: game_id.to_string(),
                player_id: player.id,
                display_name: player.display_name().to_string(),
                player_count: game.players.len(),
            })
            .await;
        Ok(player)
    }

    #[instrument(skip(self))]
    pub async fn leave_game(&self, game_id: &str, player_id: Uuid) -> Result<(), AppError> {
        let removed = self
            .store
            .mutate(game_id, |game| game.remove_player(player_id))
            .await?;

        let game = self.store.get(game_id).await?;
        info!(game_id = %game_id, player_id = %removed.id, "Player left game");
        self.event_bus
            .emit(GameEvent::PlayerLeft {
                game_id: game_id.to_string(),
                player_id: removed.id,
                player_count: game.players.len(),
            })
            .await;

        // An emptied lobby is torn down rather than left waiting forever.
        if game.players.is_empty() {
            info!(game_id = %game_id, "Lobby is empty, removing game");
            self.store.remove(game_id).await;
            self.event_bus.close_game(game_id).await;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn start_game(&self, game_id: &str, host_id: Uuid) -> Result<GameState, AppError> {
        self.store
            .mutate(game_id, |game| game.start(host_id))
            .await?;

        let game = self.store.get(game_id).await?;
        let current = game
            .current_player_id
            .ok_or_else(|| AppError::Unexpected("started game has no current player".to_string()))?;
        info!(game_id = %game_id, current_player = %current, "Game started");
        self.event_bus
            .emit(GameEvent::GameStarted {
                game_id: game_id.to_string(),
                current_player_id: current,
            })
            .await;
        Ok(game)
    }

    /// Ends the game when an auto-completing mode runs out of questions.
    /// Returns whether this call performed the completion.
    async fn complete_on_exhaustion(&self, game_id: &str) -> Result<bool, AppError> {
        let completed = self
            .store
            .mutate(game_id, |game| {
                let eligible = game.policy().auto_complete
                    && game.status != GameStatus::Waiting
                    && game.status != GameStatus::Completed
                    && game.phase != GamePhase::StealOpen;
                if !eligible {
                    return Ok(false);
                }
                game.complete()?;
                Ok(true)
            })
            .await?;

        if completed {
            info!(game_id = %game_id, "Question bank exhausted, completing game");
            let winner_id = match self.store.get(game_id).await {
                Ok(game) => game.players_ranked().first().map(|p| p.id),
                Err(_) => None,
            };
            self.event_bus
                .emit(GameEvent::GameCompleted {
                    game_id: game_id.to_string(),
                    winner_id,
                })
                .await;
        }
        Ok(completed)
    }

    /// Records a (category, difficulty) choice for the upcoming question.
    /// When the pair has no unserved questions left, auto-completing modes
    /// end the game on the spot; the caller still gets `Exhausted`.
    #[instrument(skip(self))]
    pub async fn select_category(
        &self,
        game_id: &str,
        player_id: Uuid,
        category_id: Uuid,
        difficulty_id: Uuid,
    ) -> Result<Selection, AppError> {
        let category = self
            .catalog
            .get_category(category_id)
            .await?
            .ok_or_else(|| AppError::NotFound("category not found".to_string()))?;
        let difficulty = self
            .catalog
            .get_difficulty(difficulty_id)
            .await?
            .ok_or_else(|| AppError::NotFound("difficulty not found".to_string()))?;

        let game = self.store.get(game_id).await?;
        let available = self
            .question_bank
            .find_questions(category_id, difficulty_id, &game.served_questions)
            .await?;
        if available.is_empty() {
            self.complete_on_exhaustion(game_id).await?;
            return Err(AppError::Exhausted(format!(
                "no questions available for category '{}' at difficulty '{}'",
                category.name, difficulty.name
            )));
        }

        let points = difficulty.point_value();
        let selection = self
            .store
            .mutate(game_id, |game| {
                game.record_selection(player_id, category_id, difficulty_id, points)
            })
            .await?;

        debug!(game_id = %game_id, player_id = %player_id, points, "Category selected");
        self.event_bus
            .emit(GameEvent::CategorySelected {
                game_id: game_id.to_string(),
                player_id,
                category_id,
                difficulty_id,
                points,
            })
            .await;
        Ok(selection)
    }

    /// Draws a question for the player's latest unconsumed selection,
    /// uniformly at random among the pair's unserved questions.
    #[instrument(skip(self))]
    pub async fn draw_question(
        &self,
        game_id: &str,
        player_id: Uuid,
    ) -> Result<(Question, u32), AppError> {
        let game = self.store.get(game_id).await?;
        if game.player(player_id).is_none() {
            return Err(AppError::NotFound("player not in this game".to_string()));
        }
        let selection = game
            .latest_unconsumed_selection(player_id)
            .cloned()
            .ok_or_else(|| {
                AppError::NotFound("player has no pending category selection".to_string())
            })?;

        let candidates = self
            .question_bank
            .find_questions(
                selection.category_id,
                selection.difficulty_id,
                &game.served_questions,
            )
            .await?;
        let chosen = candidates.choose(&mut rand::rng()).cloned();
        let question = match chosen {
            Some(question) => question,
            None => {
                self.complete_on_exhaustion(game_id).await?;
                return Err(AppError::Exhausted(
                    "all questions for this category and difficulty have been served".to_string(),
                ));
            }
        };

        let question_number = self
            .store
            .mutate(game_id, |game| {
                game.serve_question(selection.id, question.id)?;
                Ok(game.current_question)
            })
            .await?;

        info!(game_id = %game_id, question_id = %question.id, question_number, "Question drawn");
        self.event_bus
            .emit(GameEvent::QuestionDrawn {
                game_id: game_id.to_string(),
                question_id: question.id,
                question_number,
                points: question.points,
            })
            .await;
        Ok((question, question_number))
    }

    /// Resolves an answer submission, normal turn or steal attempt.
    #[instrument(skip(self, answer))]
    pub async fn submit_answer(
        &self,
        game_id: &str,
        player_id: Uuid,
        question_id: Uuid,
        answer: SubmittedAnswer,
    ) -> Result<AnswerOutcome, AppError> {
        let question = self
            .question_bank
            .get_question(question_id)
            .await?
            .ok_or_else(|| AppError::NotFound("question not found".to_string()))?;

        let outcome = self
            .store
            .mutate(game_id, |game| {
                game.submit_answer(player_id, &question, answer)
            })
            .await?;

        info!(
            game_id = %game_id,
            player_id = %player_id,
            is_correct = outcome.is_correct,
            is_steal = outcome.is_steal,
            points_earned = outcome.points_earned,
            "Answer resolved"
        );
        self.emit_answer_events(game_id, player_id, &outcome).await;
        Ok(outcome)
    }

    async fn emit_answer_events(&self, game_id: &str, player_id: Uuid, outcome: &AnswerOutcome) {
        self.event_bus
            .emit(GameEvent::AnswerSubmitted {
                game_id: game_id.to_string(),
                player_id,
                is_correct: outcome.is_correct,
                is_steal: outcome.is_steal,
                points_earned: outcome.points_earned,
            })
            .await;

        if outcome.steal_opened {
            if let Ok(game) = self.store.get(game_id).await {
                if let Some(question_id) = game.current_question_id {
                    self.event_bus
                        .emit(GameEvent::StealOpened {
                            game_id: game_id.to_string(),
                            question_id,
                        })
                        .await;
                }
            }
            return;
        }

        // In simultaneous modes the question stays open between answers, so
        // a submission only yields a round event once the round actually
        // resolved.
        let round_resolved = matches!(
            outcome.phase,
            GamePhase::RoundComplete | GamePhase::Completed
        );
        if !round_resolved {
            return;
        }
        if let Some(owner) = outcome.current_player_id {
            self.event_bus
                .emit(GameEvent::RoundCompleted {
                    game_id: game_id.to_string(),
                    current_player_id: owner,
                    round_over: outcome.round_over,
                })
                .await;
        }
        if outcome.game_completed {
            // Ranks are assigned at finalization; the completion event only
            // reports the provisional leader.
            let winner_id = match self.store.get(game_id).await {
                Ok(game) => game
                    .players_ranked()
                    .first()
                    .map(|p| p.id),
                Err(_) => None,
            };
            self.event_bus
                .emit(GameEvent::GameCompleted {
                    game_id: game_id.to_string(),
                    winner_id,
                })
                .await;
        }
    }

    /// Reports the current player's time limit expiring. Records a skip and
    /// opens the steal window (or advances the turn in no-steal modes).
    #[instrument(skip(self))]
    pub async fn handle_timeout(
        &self,
        game_id: &str,
        player_id: Uuid,
        question_id: Uuid,
    ) -> Result<TimeoutOutcome, AppError> {
        let outcome = self
            .store
            .mutate(game_id, |game| game.handle_timeout(player_id, question_id))
            .await?;

        info!(game_id = %game_id, player_id = %player_id, "Player timed out");
        self.event_bus
            .emit(GameEvent::PlayerTimedOut {
                game_id: game_id.to_string(),
                player_id,
            })
            .await;
        if outcome.steal_opened {
            self.event_bus
                .emit(GameEvent::StealOpened {
                    game_id: game_id.to_string(),
                    question_id,
                })
                .await;
        } else if let Some(current) = outcome.current_player_id {
            let game = self.store.get(game_id).await?;
            self.event_bus
                .emit(GameEvent::TurnChanged {
                    game_id: game_id.to_string(),
                    current_player_id: current,
                    current_turn: game.current_turn,
                })
                .await;
        }
        Ok(outcome)
    }
}
