//! Common test utilities
#![allow(dead_code)] // Not every test file uses every helper

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use marquee_host::api::AppState;
use marquee_host::config::Config;
use marquee_host::layout::SidebarKind;
use marquee_host::marquee::{Marquee, MarqueeStatus, SharedMarquee};
use marquee_host::panel;
use marquee_host::user_config::UserConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::RwLock;
use tower::ServiceExt;

pub const BOUNDARY: &str = "marquee-test-boundary";

/// Router plus a handle on the marquee it drives
pub struct TestApp {
    pub router: Router,
    pub marquee: SharedMarquee,
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.display.width = 32;
    config.display.sidebar = SidebarKind::None;
    config.scroll.wait_ms = 50;
    config
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_user_config(UserConfig::with_defaults(), None)
    }

    pub fn with_user_config(user_config: UserConfig, path: Option<std::path::PathBuf>) -> Self {
        let marquee = Marquee::with_rng(&test_config(), StdRng::seed_from_u64(7));
        let marquee = Arc::new(RwLock::new(marquee));
        let router = panel::router(AppState::new(marquee.clone(), user_config, path));
        Self { router, marquee }
    }

    pub async fn send(&self, req: Request<Body>) -> Response {
        self.router.clone().oneshot(req).await.unwrap()
    }

    pub async fn post_urlencoded(&self, uri: &str, body: &str) -> Response {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(req).await
    }

    /// What the panel's `FormData` submission looks like on the wire
    pub async fn post_multipart(&self, uri: &str, fields: &[(&str, &str)]) -> Response {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(fields)))
            .unwrap();
        self.send(req).await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(req).await
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn status(&self) -> MarqueeStatus {
        self.marquee.read().await.snapshot()
    }
}

pub fn multipart_body(fields: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Asserts the firmware-style answer to a form post
pub fn assert_redirects_home(response: &Response) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
}
