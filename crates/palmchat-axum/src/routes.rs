//! Route definitions and router construction.
//!
//! The router is built once per service instance from the wiring slice of
//! a settings snapshot. A disabled surface's paths are not registered at
//! all - they 404 like any unknown path, leaking nothing about feature
//! availability.

use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use palmchat_core::settings::ServiceConfig;

use crate::auth;
use crate::handlers;
use crate::state::ApiState;

/// Build the router for one instance.
///
/// All surface routes sit behind the bearer guard; `/health` stays open as
/// a liveness probe for LAN peers that have not authenticated yet.
pub fn build_router(config: &ServiceConfig, state: ApiState) -> Router {
    let expected: Arc<str> = Arc::from(format!("Bearer {}", config.auth_token));
    let auth_layer = middleware::from_fn(move |req: Request, next: Next| {
        let expected = expected.clone();
        async move { auth::validate_bearer(expected, req, next).await }
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // route_layer refuses to wrap an empty router; with no surface enabled
    // the supervisor never builds an instance at all.
    let gated = surface_routes(config);
    let gated = if config.any_surface_enabled() {
        gated.route_layer(auth_layer)
    } else {
        gated
    };

    Router::new()
        .route("/health", get(health_check))
        .merge(gated.with_state(state))
        .layer(cors)
}

/// Routes for the surfaces this instance has enabled.
fn surface_routes(config: &ServiceConfig) -> Router<ApiState> {
    let mut router = Router::new();
    if config.normal_api {
        router = router
            .route("/v1/chat", post(handlers::chat::completion))
            .route("/v1/speech", post(handlers::speech::synthesize));
    }
    if config.weird_api {
        router = router.route("/events", get(handlers::events::mirror));
    }
    router
}

/// Health check endpoint.
pub(crate) async fn health_check() -> &'static str {
    "OK"
}
