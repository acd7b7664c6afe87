//! Axum router wiring.
//!
//! `Router::layer` wraps every route and the fallback individually, so the
//! metrics middleware also sees 404s from the fallback and 405s from a known
//! path with the wrong method. Requests rejected before routing never reach it.

use axum::{middleware, routing::get, Router};

use crate::{app_state::AppState, obs, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ops::root))
        .route("/health", get(ops::health))
        .route("/metrics", get(ops::metrics))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            obs::middleware::track_requests,
        ))
        .with_state(state)
}
