//! API routes module

pub mod gpu;
pub mod metrics;
pub mod sessions;

use std::sync::{Arc, RwLock};

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<RwLock<AppState>>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Chat session routes
        .nest("/sessions", sessions::router())
        // Usage metrics routes
        .nest("/metrics", metrics::router())
        // GPU sizing routes
        .nest("/gpu", gpu::router())
}
