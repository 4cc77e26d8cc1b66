mod session;
pub use session::{ChatSession, ContextMode, SessionError, SessionState};
