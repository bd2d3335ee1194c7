pub mod acquisition_controller;
pub mod dedup;
pub mod ingestion;
pub mod question_provider;
pub mod scoring_service;
pub mod session_registry;
pub mod shuffle;

pub use acquisition_controller::{
    AcquisitionController, CheckOutcome, FetchMode, FetchOutcome, SkipReason, StartOutcome,
};
pub use ingestion::{DefaultDocumentIngestor, DocumentIngestor};
pub use question_provider::{OpenAiQuestionProvider, QuestionProvider};
pub use session_registry::SessionRegistry;
