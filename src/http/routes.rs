//! HTTP route definitions

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeFile, trace::TraceLayer,
};

use crate::app::AppState;
use crate::game::RoomHandle;
use crate::util::time::uptime_secs;
use crate::ws::handler::ws_handler;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let static_dir = &state.config.static_dir;

    // Pages
    let page_routes = Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .route_service("/game", ServeFile::new(static_dir.join("game.html")));

    // API + game socket; any origin may connect
    let api_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/rooms", get(rooms_handler))
        .route("/rooms/:id", get(room_handler))
        .route("/ws", get(ws_handler));

    Router::new()
        .merge(page_routes)
        .merge(api_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    rooms: usize,
    /// Connected sessions, joined or not
    players: usize,
    /// Sessions that joined a room
    in_rooms: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        rooms: state.rooms.active_rooms(),
        players: state.players.len(),
        in_rooms: state.rooms.total_players(),
    })
}

// ============================================================================
// Room endpoints
// ============================================================================

#[derive(Debug, Serialize, PartialEq)]
struct RoomSummary {
    id: String,
    players: usize,
}

impl From<&RoomHandle> for RoomSummary {
    fn from(room: &RoomHandle) -> Self {
        Self {
            id: room.id().to_string(),
            players: room.player_count(),
        }
    }
}

async fn rooms_handler(State(state): State<AppState>) -> Json<Vec<RoomSummary>> {
    Json(state.rooms.all().iter().map(RoomSummary::from).collect())
}

async fn room_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RoomSummary>, AppError> {
    state
        .rooms
        .get(&id)
        .map(|room| Json(RoomSummary::from(&room)))
        .ok_or_else(|| AppError::NotFound(format!("room {}", id)))
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}
