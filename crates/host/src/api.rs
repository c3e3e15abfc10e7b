//! JSON API for home automation and scripts
//!
//! Same commands the firmware took over MQTT, posted as JSON instead.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use marquee_protocol::{DisplayCommand, LightCommand, ReadyState, TextCommand};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::marquee::{FrameSnapshot, MarqueeStatus, SharedMarquee};
use crate::user_config::{ParamInfo, UserConfig};

// Shared state
#[derive(Clone)]
pub struct AppState {
    pub marquee: SharedMarquee,
    pub user_config: Arc<RwLock<UserConfig>>,
    /// Where `POST /api/config` persists; `None` keeps changes in memory
    pub user_config_path: Option<PathBuf>,
}

impl AppState {
    pub fn new(marquee: SharedMarquee, user_config: UserConfig, user_config_path: Option<PathBuf>) -> Self {
        Self {
            marquee,
            user_config: Arc::new(RwLock::new(user_config)),
            user_config_path,
        }
    }
}

// Routes
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(status))
        .route("/ready", get(ready))
        .route("/frame", get(frame))
        .route("/set", post(set_light))
        .route("/text", post(set_text))
        .route("/display", post(set_display))
        .route("/config", get(get_config).post(update_config))
        .route("/config/params", get(config_params))
}

// Handlers

async fn health_check() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn status(State(state): State<AppState>) -> Json<MarqueeStatus> {
    Json(state.marquee.read().await.snapshot())
}

async fn ready(State(state): State<AppState>) -> Json<ReadyState> {
    Json(ReadyState {
        ready: state.marquee.read().await.is_ready(),
    })
}

async fn frame(State(state): State<AppState>) -> Json<FrameSnapshot> {
    Json(state.marquee.read().await.frame())
}

async fn set_light(State(state): State<AppState>, Json(cmd): Json<LightCommand>) -> Json<MarqueeStatus> {
    let mut marquee = state.marquee.write().await;
    marquee.apply_light(&cmd);
    Json(marquee.snapshot())
}

async fn set_text(State(state): State<AppState>, Json(cmd): Json<TextCommand>) -> Json<MarqueeStatus> {
    let mut marquee = state.marquee.write().await;
    marquee.apply_text(&cmd);
    Json(marquee.snapshot())
}

async fn set_display(State(state): State<AppState>, Json(cmd): Json<DisplayCommand>) -> Json<MarqueeStatus> {
    let mut marquee = state.marquee.write().await;
    marquee.apply_display(&cmd);
    Json(marquee.snapshot())
}

async fn get_config(State(state): State<AppState>) -> Json<Value> {
    Json(state.user_config.read().await.redacted())
}

async fn config_params(State(state): State<AppState>) -> Json<Vec<ParamInfo>> {
    Json(state.user_config.read().await.describe())
}

async fn update_config(State(state): State<AppState>, Json(body): Json<Value>) -> impl IntoResponse {
    if !body.is_object() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "expected a JSON object" })),
        );
    }

    let mut config = state.user_config.write().await;
    config.read_from_json(&body);

    if let Some(path) = &state.user_config_path {
        if let Err(e) = config.save(path) {
            warn!("failed to save user config: {e:#}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            );
        }
        info!(path = %path.display(), "user config saved");
    }

    (StatusCode::OK, Json(config.redacted()))
}
