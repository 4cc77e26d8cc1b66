mod config;
pub use config::{AppConfig, DEFAULT_GREETING};
pub mod db;
mod error;
pub use error::ChatError;
