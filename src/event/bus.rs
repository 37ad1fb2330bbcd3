use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::events::GameEvent;

const CHANNEL_CAPACITY: usize = 100;

/// Fan-out point for real-time game events.
///
/// One broadcast channel per game id; emission is fire-and-forget, so a game
/// with no connected subscribers still transitions normally.
#[derive(Debug, Clone)]
pub struct EventBus {
    game_channels: Arc<RwLock<HashMap<String, broadcast::Sender<GameEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            game_channels: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Emits an event to all subscribers of the event's game.
    pub async fn emit(&self, event: GameEvent) {
        let game_id = event.game_id().to_string();
        let mut channels = self.game_channels.write().await;
        let sender = channels
            .entry(game_id.clone())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);

        match sender.send(event) {
            Ok(receiver_count) => {
                debug!(game_id = %game_id, receivers = receiver_count, "Game event emitted");
            }
            Err(_) => {
                debug!(game_id = %game_id, "Game event emitted with no receivers");
            }
        }
    }

    /// Subscribe to events for a specific game.
    pub async fn subscribe(&self, game_id: &str) -> broadcast::Receiver<GameEvent> {
        let mut channels = self.game_channels.write().await;
        channels
            .entry(game_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Drops the channel for a finished game.
    pub async fn close_game(&self, game_id: &str) {
        let mut channels = self.game_channels.write().await;
        channels.remove(game_id);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
