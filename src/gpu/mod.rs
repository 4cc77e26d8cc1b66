mod memory;
pub use memory::{MEMORY_FORMULA, MemoryEstimate, estimate_memory};
