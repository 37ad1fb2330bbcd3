use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::LeaderboardEntry;
use crate::game::models::GameMode;
use crate::shared::AppError;

/// Persistence seam for finalized results. Records are write-once; the
/// insert is a check-before-write so finalization retries are safe.
#[async_trait]
pub trait LeaderboardRepository: Send + Sync {
    /// Inserts the entry unless one already exists for its (game, player)
    /// pair. Returns whether a new record was written.
    async fn insert_if_absent(&self, entry: LeaderboardEntry) -> Result<bool, AppError>;

    async fn entries_for_game(&self, game_id: &str) -> Result<Vec<LeaderboardEntry>, AppError>;

    /// Cross-game board: registered users only, best score first.
    async fn top_entries(
        &self,
        mode: Option<GameMode>,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, AppError>;
}

pub struct InMemoryLeaderboardRepository {
    entries: RwLock<HashMap<(String, Uuid), LeaderboardEntry>>,
}

impl InMemoryLeaderboardRepository {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryLeaderboardRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LeaderboardRepository for InMemoryLeaderboardRepository {
    async fn insert_if_absent(&self, entry: LeaderboardEntry) -> Result<bool, AppError> {
        let mut entries = self.entries.write().await;
        let key = (entry.game_id.clone(), entry.player_id);
        if entries.contains_key(&key) {
            return Ok(false);
        }
        entries.insert(key, entry);
        Ok(true)
    }

    async fn entries_for_game(&self, game_id: &str) -> Result<Vec<LeaderboardEntry>, AppError> {
        let entries = self.entries.read().await;
        let mut found: Vec<LeaderboardEntry> = entries
            .values()
            .filter(|e| e.game_id == game_id)
            .cloned()
            .collect();
        found.sort_by_key(|e| e.final_rank);
        Ok(found)
    }

    async fn top_entries(
        &self,
        mode: Option<GameMode>,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, AppError> {
        let entries = self.entries.read().await;
        let mut found: Vec<LeaderboardEntry> = entries
            .values()
            .filter(|e| e.user_id.is_some() && mode.map(|m| e.mode == m).unwrap_or(true))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(b.correct_answers.cmp(&a.correct_answers))
                .then(a.recorded_at.cmp(&b.recorded_at))
        });
        found.truncate(limit);
        Ok(found)
    }
}
