//! GPU memory needed to serve a model.
//!
//! `M = (P * 4B / (32 / Q)) * 1.2`
//!
//! | Symbol | Description |
//! |--------|-------------|
//! | M      | GPU memory in gigabytes |
//! | P      | Parameters in billions, e.g. 7 for a 7B model |
//! | 4B     | 4 bytes per parameter |
//! | 32     | Bits in 4 bytes |
//! | Q      | Bits used to load the model, e.g. 16, 8 or 4 |
//! | 1.2    | 20% overhead for everything else loaded into GPU memory |

use anyhow::{Result, bail};
use serde::Serialize;

pub const MEMORY_FORMULA: &str = "M = (P * 4B / (32 / Q)) * 1.2";

const BYTES_PER_PARAMETER: f64 = 4.0;
const BITS_PER_PARAMETER: f64 = 32.0;
const OVERHEAD: f64 = 1.2;

#[derive(Debug, Serialize, PartialEq)]
pub struct MemoryEstimate {
    pub parameters_billions: f64,
    pub bits: u32,
    pub memory_gb: f64,
}

pub fn estimate_memory(parameters_billions: f64, bits: u32) -> Result<MemoryEstimate> {
    if !parameters_billions.is_finite() || parameters_billions <= 0.0 {
        bail!(
            "Parameter count must be a positive number of billions, got {}",
            parameters_billions
        );
    }
    if bits == 0 || bits > 32 {
        bail!("Bits must be between 1 and 32, got {}", bits);
    }

    let memory_gb = (parameters_billions * BYTES_PER_PARAMETER)
        / (BITS_PER_PARAMETER / bits as f64)
        * OVERHEAD;
    if !memory_gb.is_finite() {
        bail!(
            "Parameter count {} is too large to estimate",
            parameters_billions
        );
    }

    Ok(MemoryEstimate {
        parameters_billions,
        bits,
        memory_gb,
    })
}
