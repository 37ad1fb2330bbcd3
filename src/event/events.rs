use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::models::GameMode;

/// Events broadcast to connected clients after a state transition commits.
///
/// Events are facts about things that have already happened; emitting one can
/// never fail the transition that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GameEvent {
    /// A new game has been created
    GameCreated {
        game_id: String,
        host_id: Uuid,
        mode: GameMode,
    },

    /// A player (user or guest) has joined the game
    PlayerJoined {
        game_id: String,
        player_id: Uuid,
        display_name: String,
        player_count: usize,
    },

    /// A player has left while the game was still waiting
    PlayerLeft {
        game_id: String,
        player_id: Uuid,
        player_count: usize,
    },

    /// The game has started (waiting → category selection)
    GameStarted {
        game_id: String,
        current_player_id: Uuid,
    },

    /// A category and difficulty were picked for the upcoming question
    CategorySelected {
        game_id: String,
        player_id: Uuid,
        category_id: Uuid,
        difficulty_id: Uuid,
        points: u32,
    },

    /// A question has been drawn and served
    QuestionDrawn {
        game_id: String,
        question_id: Uuid,
        question_number: u32,
        points: u32,
    },

    /// A player submitted an answer (direct or steal)
    AnswerSubmitted {
        game_id: String,
        player_id: Uuid,
        is_correct: bool,
        is_steal: bool,
        points_earned: u32,
    },

    /// The current player answered wrong or timed out; the question is
    /// open to every other player
    StealOpened { game_id: String, question_id: Uuid },

    /// The current player ran out of time
    PlayerTimedOut { game_id: String, player_id: Uuid },

    /// The turn has moved to another player
    TurnChanged {
        game_id: String,
        current_player_id: Uuid,
        current_turn: u32,
    },

    /// A round resolved; the named player owns the next selection
    RoundCompleted {
        game_id: String,
        current_player_id: Uuid,
        round_over: bool,
    },

    /// The game has finished and final ranks are assigned
    GameCompleted {
        game_id: String,
        winner_id: Option<Uuid>,
    },
}

impl GameEvent {
    /// Every event belongs to exactly one game.
    pub fn game_id(&self) -> &str {
        match self {
            GameEvent::GameCreated { game_id, .. } => game_id,
            GameEvent::PlayerJoined { game_id, .. } => game_id,
            GameEvent::PlayerLeft { game_id, .. } => game_id,
            GameEvent::GameStarted { game_id, .. } => game_id,
            GameEvent::CategorySelected { game_id, .. } => game_id,
            GameEvent::QuestionDrawn { game_id, .. } => game_id,
            GameEvent::AnswerSubmitted { game_id, .. } => game_id,
            GameEvent::StealOpened { game_id, .. } => game_id,
            GameEvent::PlayerTimedOut { game_id, .. } => game_id,
            GameEvent::TurnChanged { game_id, .. } => game_id,
            GameEvent::RoundCompleted { game_id, .. } => game_id,
            GameEvent::GameCompleted { game_id, .. } => game_id,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            GameEvent::GameCreated { .. } => "game_created",
            GameEvent::PlayerJoined { .. } => "player_joined",
            GameEvent::PlayerLeft { .. } => "player_left",
            GameEvent::GameStarted { .. } => "game_started",
            GameEvent::CategorySelected { .. } => "category_selected",
            GameEvent::QuestionDrawn { .. } => "question_drawn",
            GameEvent::AnswerSubmitted { .. } => "answer_submitted",
            GameEvent::StealOpened { .. } => "steal_opened",
            GameEvent::PlayerTimedOut { .. } => "player_timed_out",
            GameEvent::TurnChanged { .. } => "turn_changed",
            GameEvent::RoundCompleted { .. } => "round_completed",
            GameEvent::GameCompleted { .. } => "game_completed",
        }
    }
}
