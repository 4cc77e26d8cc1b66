//! Public types for the metrics API
use serde::{Deserialize, Serialize};

use crate::analytics::UsageCount;

/// Query parameters for getting usage counts
#[derive(Deserialize)]
pub struct MetricsQuery {
    pub limit_days: Option<i64>,
}

/// Response containing daily usage counts
#[derive(Serialize)]
pub struct MetricsResponse {
    pub events: Vec<UsageCount>,
}
