mod chat;
pub use self::chat::*;
mod core;
pub use self::core::*;
