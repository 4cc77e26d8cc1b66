//! Public types for the GPU sizing API
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct MemoryQuery {
    // Model size in billions of parameters
    pub parameters: f64,
    // Bits used to load the model, defaults to 16
    pub bits: Option<u32>,
}

#[derive(Serialize)]
pub struct MemoryResponse {
    pub parameters_billions: f64,
    pub bits: u32,
    pub memory_gb: f64,
    pub formula: String,
}
