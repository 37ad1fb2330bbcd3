use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// How a game is played. Differences between modes are captured entirely by
/// [`ModePolicy`]; the state machine itself is shared.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameMode {
    /// Classic round-robin: the turn advances after every answer.
    TurnBased,
    /// Lobby-style simultaneous play: every player answers each question,
    /// no turn enforcement.
    GridStyle,
    /// Turn-based with a steal window after a wrong answer or timeout.
    Competitive,
    /// Like competitive, but the host drives question flow remotely.
    HostControlled,
}

/// Coarse game lifecycle, separate from the per-round phase.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    Waiting,
    Active,
    InProgress,
    Completed,
}

/// The game's position inside a round. Closed enum with an explicit
/// transition table; anything not in the table is rejected.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    Waiting,
    CategorySelection,
    QuestionReady,
    StealOpen,
    RoundComplete,
    Completed,
}

impl GamePhase {
    /// The exhaustive transition table of the round state machine.
    pub fn can_transition(self, next: GamePhase) -> bool {
        use GamePhase::*;
        matches!(
            (self, next),
            (Waiting, CategorySelection)
                | (CategorySelection, QuestionReady)
                | (RoundComplete, QuestionReady)
                | (QuestionReady, StealOpen)
                | (QuestionReady, RoundComplete)
                | (StealOpen, RoundComplete)
                | (CategorySelection, Completed)
                | (QuestionReady, Completed)
                | (RoundComplete, Completed)
        )
    }
}

/// The per-mode knobs the unified state machine is parameterized by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModePolicy {
    pub max_players: usize,
    /// Wrong answers and timeouts open the question to other players.
    pub steal_enabled: bool,
    /// Only the current player may select and answer.
    pub enforce_turn: bool,
    /// The turn advances after every answer regardless of correctness.
    pub advance_every_answer: bool,
    /// The game completes itself once all questions have been served and the
    /// round resolved; otherwise completion needs an explicit end-game call.
    pub auto_complete: bool,
    /// Every player answers the same question; the round resolves once the
    /// whole lobby has answered.
    pub simultaneous: bool,
}

impl GameMode {
    pub fn policy(self) -> ModePolicy {
        match self {
            GameMode::TurnBased => ModePolicy {
                max_players: 4,
                steal_enabled: false,
                enforce_turn: true,
                advance_every_answer: true,
                auto_complete: false,
                simultaneous: false,
            },
            GameMode::GridStyle => ModePolicy {
                max_players: 8,
                steal_enabled: false,
                enforce_turn: false,
                advance_every_answer: false,
                auto_complete: false,
                simultaneous: true,
            },
            GameMode::Competitive => ModePolicy {
                max_players: 4,
                steal_enabled: true,
                enforce_turn: true,
                advance_every_answer: false,
                auto_complete: true,
                simultaneous: false,
            },
            GameMode::HostControlled => ModePolicy {
                max_players: 4,
                steal_enabled: true,
                enforce_turn: true,
                advance_every_answer: false,
                auto_complete: true,
                simultaneous: false,
            },
        }
    }
}
