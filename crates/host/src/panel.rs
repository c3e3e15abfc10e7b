//! The browser control panel: its page and the form posts it sends
//!
//! Every form route ignores what it cannot use and sends the browser back to
//! the panel with `303 See Other`.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use marquee_protocol::Rgb;
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;

use crate::api::{api_router, AppState};
use crate::embedded;
use crate::form::FormFields;

/// Full application: panel page, form routes and `/api`
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(serve_index).fallback(serve_not_found))
        .route("/*path", get(serve_static).fallback(serve_not_found))
        .route("/color", post(set_color).fallback(serve_not_found))
        .route("/brightness", post(set_brightness).fallback(serve_not_found))
        .route("/speed", post(set_speed).fallback(serve_not_found))
        .route("/text", post(set_text).fallback(serve_not_found))
        .nest("/api", api_router())
        .fallback(serve_not_found)
        .with_state(state)
        .layer(cors)
}

fn back_to_panel() -> Redirect {
    Redirect::to("/")
}

/// Only a well-formed `#rrggbb` is applied. The firmware parsed any 7-char
/// value with `strtoul`, turning `#zz0000` into black; that is not kept.
async fn set_color(State(state): State<AppState>, fields: FormFields) -> Redirect {
    if let Some(value) = fields.get("color") {
        match Rgb::from_hex(value) {
            Ok(color) => state.marquee.write().await.set_color(color),
            Err(e) => debug!(value, "color ignored: {e}"),
        }
    }
    back_to_panel()
}

async fn set_brightness(State(state): State<AppState>, fields: FormFields) -> Redirect {
    if let Some(value) = fields.int("brightness") {
        let brightness = u8::try_from(value.clamp(0, 255)).unwrap_or(u8::MAX);
        state.marquee.write().await.set_brightness(brightness);
    }
    back_to_panel()
}

async fn set_speed(State(state): State<AppState>, fields: FormFields) -> Redirect {
    if let Some(value) = fields.int("speed") {
        let speed = u32::try_from(value.max(0)).unwrap_or(u32::MAX);
        state.marquee.write().await.set_speed(speed);
    }
    back_to_panel()
}

async fn set_text(State(state): State<AppState>, fields: FormFields) -> Redirect {
    if let Some(text) = fields.get("text") {
        let queue = fields.contains("do_queue");
        state.marquee.write().await.show_text(text.as_bytes(), queue);
    }
    back_to_panel()
}

fn asset_response(status: StatusCode, data: Vec<u8>, mime: &'static str) -> Response {
    (status, [(header::CONTENT_TYPE, mime)], data).into_response()
}

fn not_found() -> Response {
    match embedded::get_asset(embedded::NOT_FOUND) {
        Some((data, mime)) => asset_response(StatusCode::NOT_FOUND, data, mime),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

/// Anything the panel does not serve, whatever the method
async fn serve_not_found() -> Response {
    not_found()
}

async fn serve_index() -> Response {
    match embedded::get_asset(embedded::INDEX) {
        Some((data, mime)) => asset_response(StatusCode::OK, data, mime),
        None => not_found(),
    }
}

async fn serve_static(Path(path): Path<String>) -> Response {
    let Some((data, mime)) = embedded::get_asset(&path) else {
        return not_found();
    };

    // wasm-bindgen glue must load as a module script
    let is_js = std::path::Path::new(&path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("js"));
    let mime = if is_js { "application/javascript" } else { mime };

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, mime), (header::CACHE_CONTROL, "public, max-age=3600")],
        data,
    )
        .into_response()
}
