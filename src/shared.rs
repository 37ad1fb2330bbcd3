use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::entitlement::QuotaChecker;
use crate::event::EventBus;
use crate::game::store::GameStore;
use crate::question::bank::{Catalog, QuestionBank};
use crate::results::repository::LeaderboardRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub game_store: Arc<GameStore>,
    pub question_bank: Arc<dyn QuestionBank>,
    pub catalog: Arc<dyn Catalog>,
    pub quota_checker: Arc<dyn QuotaChecker>,
    pub leaderboard_repository: Arc<dyn LeaderboardRepository>,
    pub event_bus: EventBus,
}

impl AppState {
    pub fn new(
        game_store: Arc<GameStore>,
        question_bank: Arc<dyn QuestionBank>,
        catalog: Arc<dyn Catalog>,
        quota_checker: Arc<dyn QuotaChecker>,
        leaderboard_repository: Arc<dyn LeaderboardRepository>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            game_store,
            question_bank,
            catalog,
            quota_checker,
            leaderboard_repository,
            event_bus,
        }
    }
}

/// Error taxonomy shared across the whole crate.
///
/// Every failure a client can observe maps onto exactly one of these kinds,
/// so callers can branch on the kind instead of parsing messages.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Exhausted: {0}")]
    Exhausted(String),

    #[error("Unexpected: {0}")]
    Unexpected(String),
}

impl AppError {
    /// Machine-readable kind tag carried in every error response body.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Exhausted(_) => "EXHAUSTED",
            AppError::Unexpected(_) => "UNEXPECTED",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Exhausted(msg) => (StatusCode::GONE, msg),
            AppError::Unexpected(detail) => {
                // Full context stays server-side; the client gets a generic failure.
                error!(detail = %detail, "Unexpected internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "kind": kind,
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Uniform envelope for successful action responses.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ActionResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn ok_empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}
