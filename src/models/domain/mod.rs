pub mod acquisition;
pub mod document;
pub mod quiz_question;
pub mod quiz_session;
pub mod trigger_tracker;
pub use acquisition::AcquisitionState;
pub use document::{ActiveSource, DocumentContent, SourceKind, UploadedDocument};
pub use quiz_question::{QuizBatchPayload, QuizQuestion};
pub use quiz_session::QuizSessionState;
pub use trigger_tracker::TriggerTracker;
