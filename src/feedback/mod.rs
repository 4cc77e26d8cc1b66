mod models;
pub use models::{ANONYMOUS, FEEDBACK_COLLECTION, FeedbackRecord, Score};
mod recorder;
pub use recorder::FeedbackRecorder;
