// Library crate for the QuizClash trivia server
// This file exposes the public API for integration tests

pub mod entitlement;
pub mod event;
pub mod game;
pub mod player;
pub mod question;
pub mod results;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use event::{EventBus, GameEvent};
pub use game::{GameMode, GamePhase, GameService, GameState, GameStatus, GameStore};
pub use player::{PlayerIdentity, PlayerModel};
pub use question::{QuestionBank, SubmittedAnswer};
pub use results::{GameResults, LeaderboardRepository, ResultsService};
pub use shared::{AppError, AppState};
