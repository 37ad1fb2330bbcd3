use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::{GameMode, GamePhase, GameStatus, ModePolicy};
use super::scoring;
use crate::player::{sanitize_guest_name, PlayerIdentity, PlayerModel};
use crate::question::{Answer, Question, SubmittedAnswer};
use crate::shared::AppError;

/// A recorded (category, difficulty) choice awaiting a drawn question.
/// Consumed selections are kept as history, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selection {
    pub id: Uuid,
    pub player_id: Uuid,
    pub category_id: Uuid,
    pub difficulty_id: Uuid,
    pub points: u32,
    pub consumed: bool,
    pub created_at: DateTime<Utc>,
}

/// One immutable answer record per (player, question) pair. The vector in
/// [`GameState`] is the append-only event log; insertion order is creation
/// order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerAnswer {
    pub player_id: Uuid,
    pub question_id: Uuid,
    pub submitted: SubmittedAnswer,
    pub is_correct: bool,
    pub was_steal: bool,
    pub created_at: DateTime<Utc>,
}

/// What a resolved answer submission looks like to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub is_steal: bool,
    pub points_earned: u32,
    /// The round has visited every player; the caller should advance the
    /// game toward a new round or completion.
    pub round_over: bool,
    pub steal_opened: bool,
    pub game_completed: bool,
    pub phase: GamePhase,
    pub current_player_id: Option<Uuid>,
    /// Revealed whenever the submitted answer was wrong.
    pub correct_answer: Option<Answer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeoutOutcome {
    pub steal_opened: bool,
    pub round_over: bool,
    pub phase: GamePhase,
    pub current_player_id: Option<Uuid>,
}

/// The aggregate for one play session: game fields plus the owned players,
/// selection history, answer log and served-question history. All state
/// machine decisions happen on this struct; the store guarantees that one
/// client action sees and mutates it atomically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub id: String,
    pub mode: GameMode,
    pub status: GameStatus,
    pub phase: GamePhase,
    pub host_id: Uuid,
    /// `None` exactly while a steal window is open (and trivially before
    /// the game starts); otherwise always a player of this game.
    pub current_player_id: Option<Uuid>,
    pub current_turn: u32,
    pub current_question: u32,
    pub total_questions: u32,
    pub current_question_id: Option<Uuid>,
    pub players: Vec<PlayerModel>,
    pub selections: Vec<Selection>,
    pub answers: Vec<PlayerAnswer>,
    pub served_questions: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl GameState {
    pub fn new(id: String, mode: GameMode, host_id: Uuid, total_questions: u32) -> Self {
        Self {
            id,
            mode,
            status: GameStatus::Waiting,
            phase: GamePhase::Waiting,
            host_id,
            current_player_id: None,
            current_turn: 0,
            current_question: 0,
            total_questions,
            current_question_id: None,
            players: Vec::new(),
            selections: Vec::new(),
            answers: Vec::new(),
            served_questions: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn policy(&self) -> ModePolicy {
        self.mode.policy()
    }

    pub fn player(&self, player_id: Uuid) -> Option<&PlayerModel> {
        self.players.iter().find(|p| p.id == player_id)
    }

    fn player_mut(&mut self, player_id: Uuid) -> Option<&mut PlayerModel> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    /// Players in join order. The vector is append-only once the game has
    /// started, so it is already ordered by `player_order`.
    pub fn players_by_order(&self) -> Vec<&PlayerModel> {
        let mut players: Vec<&PlayerModel> = self.players.iter().collect();
        players.sort_by_key(|p| p.player_order);
        players
    }

    /// Ranking view: final rank first, then score, then join order.
    pub fn players_ranked(&self) -> Vec<&PlayerModel> {
        let mut players: Vec<&PlayerModel> = self.players.iter().collect();
        players.sort_by(|a, b| {
            a.final_rank
                .unwrap_or(u32::MAX)
                .cmp(&b.final_rank.unwrap_or(u32::MAX))
                .then(b.score.cmp(&a.score))
                .then(a.player_order.cmp(&b.player_order))
        });
        players
    }

    fn last_order(&self) -> u32 {
        self.players.iter().map(|p| p.player_order).max().unwrap_or(0)
    }

    fn transition(&mut self, next: GamePhase) -> Result<(), AppError> {
        if !self.phase.can_transition(next) {
            return Err(AppError::Unexpected(format!(
                "illegal phase transition {} -> {} in game {}",
                self.phase, next, self.id
            )));
        }
        self.phase = next;
        Ok(())
    }

    /// Adds a participant while the game is still waiting.
    pub fn add_player(&mut self, identity: PlayerIdentity) -> Result<PlayerModel, AppError> {
        if self.status != GameStatus::Waiting {
            return Err(AppError::Forbidden(
                "cannot join a game that has already started".to_string(),
            ));
        }
        if self.players.len() >= self.policy().max_players {
            return Err(AppError::Conflict(format!(
                "game is full ({} players max)",
                self.policy().max_players
            )));
        }

        let identity = match identity {
            PlayerIdentity::Guest { name } => PlayerIdentity::Guest {
                name: sanitize_guest_name(&name)?,
            },
            user => user,
        };

        let duplicate = self.players.iter().any(|p| match (&identity, &p.identity) {
            (PlayerIdentity::User { id, .. }, existing) => existing.user_id() == Some(*id),
            (PlayerIdentity::Guest { name }, existing) => {
                existing.display_name().eq_ignore_ascii_case(name)
            }
        });
        if duplicate {
            return Err(AppError::Conflict(
                "participant already joined this game".to_string(),
            ));
        }

        let order = self.players.len() as u32 + 1;
        let player = PlayerModel::new(self.id.clone(), identity, order);
        self.players.push(player.clone());
        Ok(player)
    }

    /// Removes a participant; only legal while the game is waiting, so
    /// historical results are never lost. Orders are re-packed densely since
    /// the game has not started yet.
    pub fn remove_player(&mut self, player_id: Uuid) -> Result<PlayerModel, AppError> {
        if self.status != GameStatus::Waiting {
            return Err(AppError::Forbidden(
                "players cannot leave once the game has started".to_string(),
            ));
        }
        let index = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or_else(|| AppError::NotFound("player not in this game".to_string()))?;
        let removed = self.players.remove(index);
        for (i, player) in self.players.iter_mut().enumerate() {
            player.player_order = i as u32 + 1;
        }
        Ok(removed)
    }

    /// Starts the game: host only, at least two players.
    pub fn start(&mut self, caller: Uuid) -> Result<(), AppError> {
        if caller != self.host_id {
            return Err(AppError::Forbidden(
                "only the host can start the game".to_string(),
            ));
        }
        if self.status != GameStatus::Waiting {
            return Err(AppError::Conflict("game has already started".to_string()));
        }
        if self.players.len() < 2 {
            return Err(AppError::InvalidInput(
                "at least two players are required to start".to_string(),
            ));
        }

        self.transition(GamePhase::CategorySelection)?;
        self.status = GameStatus::Active;
        self.current_turn = 1;
        self.current_player_id = self
            .players
            .iter()
            .min_by_key(|p| p.player_order)
            .map(|p| p.id);
        Ok(())
    }

    /// Records a (category, difficulty) choice and readies the game for a
    /// question draw.
    pub fn record_selection(
        &mut self,
        player_id: Uuid,
        category_id: Uuid,
        difficulty_id: Uuid,
        points: u32,
    ) -> Result<Selection, AppError> {
        if self.player(player_id).is_none() {
            return Err(AppError::NotFound("player not in this game".to_string()));
        }
        if !matches!(
            self.phase,
            GamePhase::CategorySelection | GamePhase::RoundComplete
        ) {
            return Err(AppError::Conflict(format!(
                "cannot select a category while the game is {}",
                self.phase
            )));
        }
        if self.policy().enforce_turn && self.current_player_id != Some(player_id) {
            return Err(AppError::Forbidden("not your turn".to_string()));
        }

        let selection = Selection {
            id: Uuid::new_v4(),
            player_id,
            category_id,
            difficulty_id,
            points,
            consumed: false,
            created_at: Utc::now(),
        };
        self.selections.push(selection.clone());
        self.transition(GamePhase::QuestionReady)?;
        Ok(selection)
    }

    /// The player's most recent unconsumed selection, if any.
    pub fn latest_unconsumed_selection(&self, player_id: Uuid) -> Option<&Selection> {
        self.selections
            .iter()
            .rev()
            .find(|s| s.player_id == player_id && !s.consumed)
    }

    /// Marks a selection consumed and records the drawn question as the
    /// active one.
    pub fn serve_question(&mut self, selection_id: Uuid, question_id: Uuid) -> Result<(), AppError> {
        if self.phase != GamePhase::QuestionReady {
            return Err(AppError::Conflict(format!(
                "cannot draw a question while the game is {}",
                self.phase
            )));
        }
        if self.served_questions.contains(&question_id) {
            return Err(AppError::Conflict(
                "question was already served in this game".to_string(),
            ));
        }
        let selection = self
            .selections
            .iter_mut()
            .find(|s| s.id == selection_id)
            .ok_or_else(|| AppError::NotFound("selection not found".to_string()))?;
        if selection.consumed {
            return Err(AppError::Conflict("selection already consumed".to_string()));
        }
        selection.consumed = true;

        self.served_questions.push(question_id);
        self.current_question += 1;
        self.current_question_id = Some(question_id);
        self.status = GameStatus::InProgress;
        Ok(())
    }

    fn first_answerer(&self, question_id: Uuid) -> Option<Uuid> {
        self.answers
            .iter()
            .find(|a| a.question_id == question_id)
            .map(|a| a.player_id)
    }

    pub fn has_answered(&self, player_id: Uuid, question_id: Uuid) -> bool {
        self.answers
            .iter()
            .any(|a| a.player_id == player_id && a.question_id == question_id)
    }

    /// The core transition: resolves one answer submission, normal turn or
    /// steal attempt, and advances the round.
    ///
    /// All validation happens before the first mutation, so an error leaves
    /// the aggregate untouched and the answer insertion plus the score
    /// update land together.
    pub fn submit_answer(
        &mut self,
        player_id: Uuid,
        question: &Question,
        submitted: SubmittedAnswer,
    ) -> Result<AnswerOutcome, AppError> {
        let policy = self.policy();

        if self.status == GameStatus::Completed {
            return Err(AppError::Conflict("game is already completed".to_string()));
        }
        let answering_order = self
            .player(player_id)
            .ok_or_else(|| AppError::NotFound("player not in this game".to_string()))?
            .player_order;
        if self.current_question_id != Some(question.id) {
            return Err(AppError::Conflict(
                "question is not the active question".to_string(),
            ));
        }

        let is_steal = match self.phase {
            GamePhase::QuestionReady => false,
            GamePhase::StealOpen => true,
            _ => {
                return Err(AppError::Conflict(
                    "no question is open for answers".to_string(),
                ))
            }
        };

        if !is_steal && policy.enforce_turn && self.current_player_id != Some(player_id) {
            return Err(AppError::Forbidden("not your turn".to_string()));
        }
        // One answer per (player, question), ever. In steal mode this also
        // limits each player to a single steal attempt.
        if self.has_answered(player_id, question.id) {
            return Err(AppError::Conflict(
                "player already answered this question".to_string(),
            ));
        }

        let is_correct = question.check(&submitted)?;
        let points_earned = scoring::points_earned(question.points, is_correct, is_steal);

        self.answers.push(PlayerAnswer {
            player_id,
            question_id: question.id,
            submitted,
            is_correct,
            was_steal: is_steal,
            created_at: Utc::now(),
        });
        if let Some(player) = self.player_mut(player_id) {
            scoring::apply_answer(player, is_correct, points_earned);
        }

        let mut round_over = false;
        let mut steal_opened = false;
        let mut game_completed = false;
        let mut correct_answer = None;

        // Simultaneous modes hold the round open until the whole lobby has
        // answered; turn modes resolve on the first conclusive answer.
        let round_resolves = if policy.simultaneous {
            let answered = self
                .answers
                .iter()
                .filter(|a| a.question_id == question.id)
                .count();
            answered == self.players.len()
        } else {
            is_correct || is_steal || !policy.steal_enabled
        };

        if round_resolves {
            // The next selection belongs to the player who originally faced
            // the question, which for a direct answer is the answerer
            // themself. Round completion is keyed off the answering player's
            // order reaching the last seat.
            let owner = self.first_answerer(question.id).unwrap_or(player_id);
            round_over = if policy.simultaneous {
                true
            } else {
                answering_order == self.last_order()
            };
            if !is_correct {
                correct_answer = question.correct_answer().cloned();
            }
            self.current_player_id = Some(owner);
            // The question's round is settled; a stale submission or timeout
            // for it must not reopen it.
            self.current_question_id = None;
            self.transition(GamePhase::RoundComplete)?;

            if policy.advance_every_answer {
                self.next_turn();
            }
            if policy.auto_complete && self.current_question >= self.total_questions {
                self.complete()?;
                game_completed = true;
            }
        } else if policy.steal_enabled {
            // Wrong answer on a normal turn with stealing enabled: open the
            // question to every other player.
            self.current_player_id = None;
            self.transition(GamePhase::StealOpen)?;
            steal_opened = true;
            correct_answer = question.correct_answer().cloned();
        }
        // Otherwise the question stays open for the rest of the lobby, and
        // the correct answer stays hidden while others may still answer.

        Ok(AnswerOutcome {
            is_correct,
            is_steal,
            points_earned,
            round_over,
            steal_opened,
            game_completed,
            phase: self.phase,
            current_player_id: self.current_player_id,
            correct_answer,
        })
    }

    /// Advances the turn to the next player by order, wrapping around.
    pub fn next_turn(&mut self) {
        if self.players.is_empty() {
            return;
        }
        let next = {
            let current_order = self
                .current_player_id
                .and_then(|id| self.player(id))
                .map(|p| p.player_order);
            let successor = current_order.and_then(|order| {
                self.players
                    .iter()
                    .filter(|p| p.player_order > order)
                    .min_by_key(|p| p.player_order)
            });
            match successor {
                Some(player) => player.id,
                None => {
                    self.players
                        .iter()
                        .min_by_key(|p| p.player_order)
                        .expect("players is non-empty")
                        .id
                }
            }
        };
        self.current_player_id = Some(next);
        self.current_turn += 1;
    }

    /// The current player's time limit expired: record a skip (no answer
    /// row, no score change) and open the question for stealing, or advance
    /// the turn in modes without a steal window.
    pub fn handle_timeout(
        &mut self,
        player_id: Uuid,
        question_id: Uuid,
    ) -> Result<TimeoutOutcome, AppError> {
        let policy = self.policy();

        let answering_order = self
            .player(player_id)
            .ok_or_else(|| AppError::NotFound("player not in this game".to_string()))?
            .player_order;
        if self.phase != GamePhase::QuestionReady {
            return Err(AppError::Conflict(
                "no question is awaiting the current player".to_string(),
            ));
        }
        if self.current_question_id != Some(question_id) {
            return Err(AppError::Conflict(
                "question is not the active question".to_string(),
            ));
        }
        if self.current_player_id != Some(player_id) {
            return Err(AppError::Forbidden("not your turn".to_string()));
        }

        if let Some(player) = self.player_mut(player_id) {
            scoring::apply_skip(player);
        }

        let mut round_over = false;
        let steal_opened = if policy.steal_enabled {
            self.current_player_id = None;
            self.transition(GamePhase::StealOpen)?;
            true
        } else {
            round_over = answering_order == self.last_order();
            self.current_question_id = None;
            self.transition(GamePhase::RoundComplete)?;
            if policy.advance_every_answer {
                self.next_turn();
            }
            false
        };

        Ok(TimeoutOutcome {
            steal_opened,
            round_over,
            phase: self.phase,
            current_player_id: self.current_player_id,
        })
    }

    /// Transitions the game to its terminal state. Phase and status move
    /// together so a second caller cannot re-run completion logic.
    pub fn complete(&mut self) -> Result<(), AppError> {
        if self.phase == GamePhase::Completed {
            return Err(AppError::Conflict("game is already completed".to_string()));
        }
        if self.phase == GamePhase::StealOpen {
            return Err(AppError::Conflict(
                "cannot complete the game while a steal window is open".to_string(),
            ));
        }
        self.transition(GamePhase::Completed)?;
        self.status = GameStatus::Completed;
        Ok(())
    }

    /// Structural invariants, asserted by tests after every mutation.
    #[cfg(test)]
    pub fn check_invariants(&self) {
        if let Some(current) = self.current_player_id {
            assert!(
                self.players.iter().any(|p| p.id == current),
                "current player must belong to this game"
            );
        }
        if self.phase == GamePhase::StealOpen {
            assert!(
                self.current_player_id.is_none(),
                "steal-open games have no current player"
            );
        }
        let mut seen = std::collections::HashSet::new();
        for answer in &self.answers {
            assert!(
                seen.insert((answer.player_id, answer.question_id)),
                "duplicate (player, question) answer"
            );
        }
        let mut orders: Vec<u32> = self.players.iter().map(|p| p.player_order).collect();
        orders.sort_unstable();
        orders.dedup();
        assert_eq!(orders.len(), self.players.len(), "player orders must be unique");
    }
}
