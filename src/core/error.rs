use thiserror::Error;

/// Failures that can escape a single session turn.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Missing or malformed settings. Fatal at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The completion service could not produce a reply (network,
    /// auth, bad status, or no choices returned).
    #[error("completion unavailable: {0}")]
    CompletionRequest(String),

    /// The document store rejected or failed the feedback insert.
    #[error("feedback write failed: {0}")]
    FeedbackWrite(String),
}
