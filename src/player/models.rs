use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who a participant is: an authenticated user or a named guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PlayerIdentity {
    User { id: Uuid, name: String },
    Guest { name: String },
}

impl PlayerIdentity {
    pub fn display_name(&self) -> &str {
        match self {
            PlayerIdentity::User { name, .. } => name,
            PlayerIdentity::Guest { name } => name,
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            PlayerIdentity::User { id, .. } => Some(*id),
            PlayerIdentity::Guest { .. } => None,
        }
    }
}

/// A participant in exactly one game, owned by that game's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerModel {
    pub id: Uuid,
    pub game_id: String,
    pub identity: PlayerIdentity,
    /// 1-based, dense, unique per game; append-stable once the game starts.
    pub player_order: u32,
    pub score: u32,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    pub skipped_answers: u32,
    pub final_rank: Option<u32>,
    pub joined_at: DateTime<Utc>,
}

impl PlayerModel {
    pub fn new(game_id: String, identity: PlayerIdentity, player_order: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            game_id,
            identity,
            player_order,
            score: 0,
            correct_answers: 0,
            wrong_answers: 0,
            skipped_answers: 0,
            final_rank: None,
            joined_at: Utc::now(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.identity.display_name()
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.identity.user_id()
    }

    /// Share of real answers that were correct, as a percentage.
    /// Defined as 0 when the player never submitted a real answer.
    pub fn accuracy_pct(&self) -> f64 {
        let attempts = self.correct_answers + self.wrong_answers;
        if attempts == 0 {
            0.0
        } else {
            f64::from(self.correct_answers) * 100.0 / f64::from(attempts)
        }
    }
}
