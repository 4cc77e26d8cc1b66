//! Router for the GPU sizing API

use std::sync::{Arc, RwLock};

use axum::{Router, http::StatusCode, response::Json, routing::get};
use axum_extra::extract::Query;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::gpu::{MEMORY_FORMULA, estimate_memory};

type SharedState = Arc<RwLock<AppState>>;

/// Estimate the GPU memory needed to load a model
async fn memory_estimate(
    Query(params): Query<public::MemoryQuery>,
) -> Result<Json<public::MemoryResponse>, ApiError> {
    let estimate = estimate_memory(params.parameters, params.bits.unwrap_or(16))
        .map_err(|e| ApiError::with_status(StatusCode::BAD_REQUEST, e))?;

    Ok(Json(public::MemoryResponse {
        parameters_billions: estimate.parameters_billions,
        bits: estimate.bits,
        memory_gb: estimate.memory_gb,
        formula: MEMORY_FORMULA.to_string(),
    }))
}

/// Create the GPU router
pub fn router() -> Router<SharedState> {
    Router::new().route("/memory", get(memory_estimate))
}
