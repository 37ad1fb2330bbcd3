use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::state::GameState;
use crate::shared::AppError;

/// In-memory home of all live game aggregates.
///
/// `mutate` is the single write path: it runs the whole decide-and-commit
/// step of one client action under the write lock, against a scratch copy
/// that only replaces the stored aggregate on success. Two concurrent
/// actions on the same game therefore serialize, and a failed action leaves
/// no partial state behind.
pub struct GameStore {
    games: Arc<RwLock<HashMap<String, GameState>>>,
}

impl GameStore {
    pub fn new() -> Self {
        Self {
            games: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn insert(&self, game: GameState) -> Result<(), AppError> {
        let mut games = self.games.write().await;
        if games.contains_key(&game.id) {
            return Err(AppError::Conflict(format!(
                "game {} already exists",
                game.id
            )));
        }
        games.insert(game.id.clone(), game);
        Ok(())
    }

    pub async fn get(&self, game_id: &str) -> Result<GameState, AppError> {
        let games = self.games.read().await;
        games
            .get(game_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("game {} not found", game_id)))
    }

    /// Applies one atomic action to a game. The closure works on a copy; the
    /// copy is swapped in only when the closure succeeds.
    pub async fn mutate<F, T>(&self, game_id: &str, action: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut GameState) -> Result<T, AppError>,
    {
        let mut games = self.games.write().await;
        let game = games
            .get_mut(game_id)
            .ok_or_else(|| AppError::NotFound(format!("game {} not found", game_id)))?;

        let mut scratch = game.clone();
        let value = action(&mut scratch)?;
        *game = scratch;
        Ok(value)
    }

    pub async fn remove(&self, game_id: &str) {
        let mut games = self.games.write().await;
        games.remove(game_id);
    }
}

impl Default for GameStore {
    fn default() -> Self {
        Self::new()
    }
}
