pub mod models;
pub mod repository;
pub mod service;

pub use models::{GameResults, GameSummary, LeaderboardEntry, PlayerStanding};
pub use repository::{InMemoryLeaderboardRepository, LeaderboardRepository};
pub use service::ResultsService;
