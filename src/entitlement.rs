use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::game::GameMode;
use crate::shared::AppError;

/// Entitlement check consulted at game creation. The engine only asks a
/// yes/no question; plan tiers and billing live behind this seam.
#[async_trait]
pub trait QuotaChecker: Send + Sync {
    async fn has_remaining_quota(&self, user_id: Uuid, mode: GameMode) -> Result<bool, AppError>;
}

/// Default checker: every user may create games in every mode.
pub struct AllowAllQuota;

#[async_trait]
impl QuotaChecker for AllowAllQuota {
    async fn has_remaining_quota(&self, _user_id: Uuid, _mode: GameMode) -> Result<bool, AppError> {
        Ok(true)
    }
}

/// Checker with a fixed per-user budget of game creations, counted across
/// all modes. Used for capped environments and in tests.
pub struct FixedQuota {
    limit: u32,
    used: Mutex<HashMap<Uuid, u32>>,
}

impl FixedQuota {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            used: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl QuotaChecker for FixedQuota {
    async fn has_remaining_quota(&self, user_id: Uuid, _mode: GameMode) -> Result<bool, AppError> {
        let mut used = self
            .used
            .lock()
            .map_err(|_| AppError::Unexpected("quota lock poisoned".to_string()))?;
        let count = used.entry(user_id).or_insert(0);
        if *count >= self.limit {
            return Ok(false);
        }
        *count += 1;
        Ok(true)
    }
}
