pub mod handlers;
pub mod models;
pub mod scoring;
pub mod service;
pub mod state;
pub mod store;
pub mod types;

pub use models::{GameMode, GamePhase, GameStatus, ModePolicy};
pub use service::GameService;
pub use state::GameState;
pub use store::GameStore;
