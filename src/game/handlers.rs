use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::service::GameService;
use super::types::{
    CreateGameRequest, DrawQuestionRequest, FinalizeGameRequest, GameResponse, JoinGameRequest,
    LeaderboardQuery, LeaveGameRequest, PlayerResponse, SelectCategoryRequest, ServedQuestion,
    StartGameRequest, SubmitAnswerRequest, TimeoutRequest,
};
use crate::game::state::{AnswerOutcome, TimeoutOutcome};
use crate::player::PlayerIdentity;
use crate::results::{GameResults, LeaderboardEntry, ResultsService};
use crate::shared::{ActionResponse, AppError, AppState};

const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

/// All routes for the game lifecycle, rounds, and results.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/game", post(create_game))
        .route("/game/:game_id", get(get_game))
        .route("/game/:game_id/players", get(get_players))
        .route("/game/:game_id/join", post(join_game))
        .route("/game/:game_id/leave", post(leave_game))
        .route("/game/:game_id/start", post(start_game))
        .route("/game/:game_id/select", post(select_category))
        .route("/game/:game_id/draw", post(draw_question))
        .route("/game/:game_id/answer", post(submit_answer))
        .route("/game/:game_id/timeout", post(report_timeout))
        .route("/game/:game_id/finalize", post(finalize_game))
        .route("/game/:game_id/results", get(get_results))
        .route("/leaderboard", get(get_leaderboard))
}

/// POST /game
#[instrument(name = "create_game", skip(state))]
pub async fn create_game(
    State(state): State<AppState>,
    Json(request): Json<CreateGameRequest>,
) -> Result<Json<ActionResponse<GameResponse>>, AppError> {
    info!(host_id = %request.host_id, mode = %request.mode, "Creating new game");

    let service = GameService::from_state(&state);
    let game = service
        .create_game(request.host_id, request.mode, request.total_questions)
        .await?;

    Ok(Json(ActionResponse::ok(
        "Game created",
        GameResponse::from(&game),
    )))
}

/// GET /game/{game_id}
#[instrument(name = "get_game", skip(state))]
pub async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<GameResponse>, AppError> {
    let service = GameService::from_state(&state);
    let game = service.get_game(&game_id).await?;
    Ok(Json(GameResponse::from(&game)))
}

/// GET /game/{game_id}/players
#[instrument(name = "get_players", skip(state))]
pub async fn get_players(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<Vec<PlayerResponse>>, AppError> {
    let service = GameService::from_state(&state);
    let players = service.list_players(&game_id).await?;
    Ok(Json(players.iter().map(PlayerResponse::from).collect()))
}

/// POST /game/{game_id}/join
#[instrument(name = "join_game", skip(state))]
pub async fn join_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(request): Json<JoinGameRequest>,
) -> Result<Json<ActionResponse<PlayerResponse>>, AppError> {
    let identity = match request.user_id {
        Some(id) => PlayerIdentity::User {
            id,
            name: request.display_name,
        },
        None => PlayerIdentity::Guest {
            name: request.display_name,
        },
    };

    let service = GameService::from_state(&state);
    let player = service.join_game(&game_id, identity).await?;

    Ok(Json(ActionResponse::ok(
        "Joined game",
        PlayerResponse::from(&player),
    )))
}

/// POST /game/{game_id}/leave
#[instrument(name = "leave_game", skip(state))]
pub async fn leave_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(request): Json<LeaveGameRequest>,
) -> Result<Json<ActionResponse<()>>, AppError> {
    let service = GameService::from_state(&state);
    service.leave_game(&game_id, request.player_id).await?;
    Ok(Json(ActionResponse::ok_empty("Left game")))
}

/// POST /game/{game_id}/start
#[instrument(name = "start_game", skip(state))]
pub async fn start_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(request): Json<StartGameRequest>,
) -> Result<Json<ActionResponse<GameResponse>>, AppError> {
    let service = GameService::from_state(&state);
    let game = service.start_game(&game_id, request.host_id).await?;
    Ok(Json(ActionResponse::ok(
        "Game started",
        GameResponse::from(&game),
    )))
}

/// POST /game/{game_id}/select
#[instrument(name = "select_category", skip(state))]
pub async fn select_category(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(request): Json<SelectCategoryRequest>,
) -> Result<Json<ActionResponse<()>>, AppError> {
    let service = GameService::from_state(&state);
    service
        .select_category(
            &game_id,
            request.player_id,
            request.category_id,
            request.difficulty_id,
        )
        .await?;
    Ok(Json(ActionResponse::ok_empty("Category selected")))
}

/// POST /game/{game_id}/draw
#[instrument(name = "draw_question", skip(state))]
pub async fn draw_question(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(request): Json<DrawQuestionRequest>,
) -> Result<Json<ActionResponse<ServedQuestion>>, AppError> {
    let service = GameService::from_state(&state);
    let (question, question_number) = service.draw_question(&game_id, request.player_id).await?;
    Ok(Json(ActionResponse::ok(
        "Question drawn",
        ServedQuestion::from_question(&question, question_number),
    )))
}

/// POST /game/{game_id}/answer
#[instrument(name = "submit_answer", skip(state, request))]
pub async fn submit_answer(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(request): Json<SubmitAnswerRequest>,
) -> Result<Json<ActionResponse<AnswerOutcome>>, AppError> {
    let service = GameService::from_state(&state);
    let outcome = service
        .submit_answer(
            &game_id,
            request.player_id,
            request.question_id,
            request.answer,
        )
        .await?;

    let message = if outcome.is_correct {
        "Correct answer"
    } else {
        "Wrong answer"
    };
    Ok(Json(ActionResponse::ok(message, outcome)))
}

/// POST /game/{game_id}/timeout
#[instrument(name = "report_timeout", skip(state))]
pub async fn report_timeout(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(request): Json<TimeoutRequest>,
) -> Result<Json<ActionResponse<TimeoutOutcome>>, AppError> {
    let service = GameService::from_state(&state);
    let outcome = service
        .handle_timeout(&game_id, request.player_id, request.question_id)
        .await?;
    Ok(Json(ActionResponse::ok("Timeout recorded", outcome)))
}

/// POST /game/{game_id}/finalize
#[instrument(name = "finalize_game", skip(state))]
pub async fn finalize_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(request): Json<FinalizeGameRequest>,
) -> Result<Json<ActionResponse<GameResults>>, AppError> {
    let service = ResultsService::from_state(&state);
    let results = service.finalize_game(&game_id, request.host_id).await?;
    Ok(Json(ActionResponse::ok("Game finalized", results)))
}

/// GET /game/{game_id}/results
#[instrument(name = "get_results", skip(state))]
pub async fn get_results(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<GameResults>, AppError> {
    let service = ResultsService::from_state(&state);
    let results = service.get_results(&game_id).await?;
    Ok(Json(results))
}

/// GET /leaderboard
#[instrument(name = "get_leaderboard", skip(state))]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let service = ResultsService::from_state(&state);
    let entries = service
        .top_entries(query.mode, query.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT))
        .await?;
    Ok(Json(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::models::GameMode;
    use crate::question::bank::InMemoryQuestionBank;
    use crate::question::QuestionKind;
    use crate::results::LeaderboardRepository;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`
    use uuid::Uuid;

    fn app(state: AppState) -> Router {
        routes().with_state(state)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn create_game_returns_envelope_with_join_code() {
        let app = app(AppStateBuilder::new().build());

        let response = app
            .oneshot(post_json(
                "/game",
                json!({
                    "host_id": Uuid::new_v4(),
                    "mode": "COMPETITIVE",
                    "total_questions": 5
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert!(!body["data"]["id"].as_str().unwrap().is_empty());
        assert_eq!(body["data"]["status"], "WAITING");
        assert_eq!(body["data"]["player_count"], 0);
    }

    #[tokio::test]
    async fn join_rejects_reserved_guest_name() {
        let app = app(AppStateBuilder::new().build());
        let host_id = Uuid::new_v4();

        let response = app
            .clone()
            .oneshot(post_json(
                "/game",
                json!({
                    "host_id": host_id,
                    "mode": "COMPETITIVE",
                    "total_questions": 5
                }),
            ))
            .await
            .unwrap();
        let game_id = body_json(response).await["data"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app
            .oneshot(post_json(
                &format!("/game/{}/join", game_id),
                json!({ "display_name": "admin99" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["kind"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn get_game_unknown_id_is_404() {
        let app = app(AppStateBuilder::new().build());

        let response = app.oneshot(get_req("/game/no-such-game")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["kind"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn answer_flow_over_http() {
        let bank = Arc::new(InMemoryQuestionBank::new());
        let category = bank.add_category("Science");
        let difficulty = bank.add_difficulty("Easy", Some(10));
        bank.add_question(
            &category,
            &difficulty,
            QuestionKind::MultipleChoice,
            "Water's formula?",
            &[("H2O", true), ("CO2", false)],
        );
        let app = app(AppStateBuilder::new().with_question_bank(bank).build());

        let host_id = Uuid::new_v4();
        let response = app
            .clone()
            .oneshot(post_json(
                "/game",
                json!({
                    "host_id": host_id,
                    "mode": "GRID_STYLE",
                    "total_questions": 3
                }),
            ))
            .await
            .unwrap();
        let game_id = body_json(response).await["data"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/game/{}/join", game_id),
                json!({ "display_name": "Ada" }),
            ))
            .await
            .unwrap();
        let player_id = body_json(response).await["data"]["id"]
            .as_str()
            .unwrap()
            .to_string();
        app.clone()
            .oneshot(post_json(
                &format!("/game/{}/join", game_id),
                json!({ "display_name": "Grace" }),
            ))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/game/{}/start", game_id),
                json!({ "host_id": host_id }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/game/{}/select", game_id),
                json!({
                    "player_id": player_id,
                    "category_id": category.id,
                    "difficulty_id": difficulty.id
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/game/{}/draw", game_id),
                json!({ "player_id": player_id }),
            ))
            .await
            .unwrap();
        let drawn = body_json(response).await;
        let question_id = drawn["data"]["id"].as_str().unwrap().to_string();
        let answer_id = drawn["data"]["answers"][0]["id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(post_json(
                &format!("/game/{}/answer", game_id),
                json!({
                    "player_id": player_id,
                    "question_id": question_id,
                    "answer": { "type": "choice", "value": answer_id }
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        // The served answers keep insertion order, so index 0 is "H2O".
        assert_eq!(body["data"]["is_correct"], true);
        assert_eq!(body["data"]["points_earned"], 10);
    }

    #[tokio::test]
    async fn exhausted_quota_maps_to_gone() {
        struct DenyAllQuota;

        #[async_trait::async_trait]
        impl crate::entitlement::QuotaChecker for DenyAllQuota {
            async fn has_remaining_quota(
                &self,
                _user_id: Uuid,
                _mode: GameMode,
            ) -> Result<bool, AppError> {
                Ok(false)
            }
        }

        let app = app(
            AppStateBuilder::new()
                .with_quota_checker(Arc::new(DenyAllQuota))
                .build(),
        );

        let response = app
            .oneshot(post_json(
                "/game",
                json!({
                    "host_id": Uuid::new_v4(),
                    "mode": "COMPETITIVE",
                    "total_questions": 5
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::GONE);

        let body = body_json(response).await;
        assert_eq!(body["kind"], "EXHAUSTED");
    }

    #[tokio::test]
    async fn finalize_over_http_writes_leaderboard_records() {
        let repo = Arc::new(crate::results::InMemoryLeaderboardRepository::new());
        let app = app(
            AppStateBuilder::new()
                .with_leaderboard_repository(repo.clone())
                .build(),
        );

        let host_id = Uuid::new_v4();
        let response = app
            .clone()
            .oneshot(post_json(
                "/game",
                json!({
                    "host_id": host_id,
                    "mode": "HOST_CONTROLLED",
                    "total_questions": 3
                }),
            ))
            .await
            .unwrap();
        let game_id = body_json(response).await["data"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        for name in ["Ada", "Grace"] {
            app.clone()
                .oneshot(post_json(
                    &format!("/game/{}/join", game_id),
                    json!({ "display_name": name }),
                ))
                .await
                .unwrap();
        }
        app.clone()
            .oneshot(post_json(
                &format!("/game/{}/start", game_id),
                json!({ "host_id": host_id }),
            ))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/game/{}/finalize", game_id),
                json!({ "host_id": host_id }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["data"]["standings"].as_array().unwrap().len(), 2);

        let entries = repo.entries_for_game(&game_id).await.unwrap();
        assert_eq!(entries.len(), 2);

        let response = app
            .oneshot(get_req(&format!("/game/{}/results", game_id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn leaderboard_defaults_to_empty() {
        let app = app(AppStateBuilder::new().build());

        let response = app.oneshot(get_req("/leaderboard")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn results_before_finalization_is_conflict() {
        let app = app(AppStateBuilder::new().build());
        let host_id = Uuid::new_v4();

        let response = app
            .clone()
            .oneshot(post_json(
                "/game",
                json!({
                    "host_id": host_id,
                    "mode": "TURN_BASED",
                    "total_questions": 3
                }),
            ))
            .await
            .unwrap();
        let game_id = body_json(response).await["data"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        for name in ["Ada", "Grace"] {
            app.clone()
                .oneshot(post_json(
                    &format!("/game/{}/join", game_id),
                    json!({ "display_name": name }),
                ))
                .await
                .unwrap();
        }
        app.clone()
            .oneshot(post_json(
                &format!("/game/{}/start", game_id),
                json!({ "host_id": host_id }),
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(get_req(&format!("/game/{}/results", game_id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn mode_strings_parse_for_all_modes() {
        for mode in [
            GameMode::TurnBased,
            GameMode::GridStyle,
            GameMode::Competitive,
            GameMode::HostControlled,
        ] {
            let app = app(AppStateBuilder::new().build());
            let response = app
                .oneshot(post_json(
                    "/game",
                    json!({
                        "host_id": Uuid::new_v4(),
                        "mode": mode,
                        "total_questions": 1
                    }),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }
}
