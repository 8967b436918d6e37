//! Route modules for the Pamphlets server

pub mod articles;
pub mod files;
pub mod health;
pub mod upload;

use axum::{extract::DefaultBodyLimit, http::HeaderValue, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full HTTP surface
pub fn build_router(state: AppState) -> Router {
    let server = &state.config().server;

    Router::new()
        .merge(health::router())
        .merge(upload::router())
        .merge(files::router())
        .merge(articles::router())
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&server.cors_allowed_origins))
        .with_state(state)
}

/// Any origin when the allowlist is empty
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
