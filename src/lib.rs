pub mod analytics;
pub mod api;
pub mod chat;
pub mod cli;
pub mod core;
pub mod feedback;
pub mod gpu;
pub mod openai;
pub mod store;
