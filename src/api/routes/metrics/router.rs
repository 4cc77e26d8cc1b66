//! Router for the metrics API

use std::sync::{Arc, RwLock};

use axum::{Router, extract::State, response::Json};
use axum_extra::extract::Query;

use super::public;
use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

/// Get daily usage counts for visualization
async fn get_metrics(
    State(state): State<SharedState>,
    Query(params): Query<public::MetricsQuery>,
) -> Result<Json<public::MetricsResponse>, crate::api::public::ApiError> {
    let usage = state.read().expect("Unable to read shared state").usage.clone();

    // Default to last 30 days if not specified
    let limit_days = params.limit_days.unwrap_or(30);
    let events = usage.summary(limit_days).await?;

    Ok(Json(public::MetricsResponse { events }))
}

/// Create the metrics router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", axum::routing::get(get_metrics))
}
