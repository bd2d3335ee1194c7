#![allow(dead_code)]

use std::{collections::VecDeque, ops::Range, sync::Arc};

use async_trait::async_trait;
use quiz_miner_server::{
    app_state::AppState,
    config::Config,
    errors::{AppError, AppResult},
    models::domain::{DocumentContent, QuizQuestion, UploadedDocument},
    services::{AcquisitionController, DocumentIngestor, QuestionProvider},
};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{Notify, RwLock};
use uuid::Uuid;

pub fn sample_question(n: usize) -> QuizQuestion {
    QuizQuestion {
        question: format!("Question {}?", n),
        options: vec![
            format!("A{}", n),
            format!("B{}", n),
            format!("C{}", n),
            format!("D{}", n),
        ],
        correct_answers: [format!("A{}", n)].into_iter().collect(),
        explanation: format!("A{} is stated in section {}", n, n),
        original_index: format!("Q{}", n),
    }
}

pub fn sample_batch(range: Range<usize>) -> Vec<QuizQuestion> {
    range.map(sample_question).collect()
}

pub fn pdf_upload() -> UploadedDocument {
    UploadedDocument {
        name: "lecture.pdf".to_string(),
        mime_type: "application/pdf".to_string(),
        bytes: b"%PDF-1.4".to_vec(),
    }
}

/// One recorded provider call.
#[derive(Debug, Clone)]
pub struct ProviderCall {
    pub existing_titles: Vec<String>,
    pub api_key: Option<String>,
}

/// Replays queued results in order; an empty queue yields empty batches.
#[derive(Default)]
pub struct ScriptedProvider {
    responses: RwLock<VecDeque<AppResult<Vec<QuizQuestion>>>>,
    calls: RwLock<Vec<ProviderCall>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<AppResult<Vec<QuizQuestion>>>) -> Self {
        Self {
            responses: RwLock::new(responses.into()),
            calls: RwLock::new(Vec::new()),
        }
    }

    pub async fn calls(&self) -> Vec<ProviderCall> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl QuestionProvider for ScriptedProvider {
    async fn generate_batch(
        &self,
        _content: &DocumentContent,
        existing_titles: &[String],
        api_key: Option<SecretString>,
    ) -> AppResult<Vec<QuizQuestion>> {
        self.calls.write().await.push(ProviderCall {
            existing_titles: existing_titles.to_vec(),
            api_key: api_key.map(|key| key.expose_secret().to_string()),
        });
        self.responses
            .write()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Answers the first request at once and holds every later one until released.
pub struct GatedProvider {
    pub entered: Notify,
    pub release: Notify,
    initial: Vec<QuizQuestion>,
    follow_up: Vec<QuizQuestion>,
}

impl GatedProvider {
    pub fn new(initial: Vec<QuizQuestion>, follow_up: Vec<QuizQuestion>) -> Self {
        Self {
            entered: Notify::new(),
            release: Notify::new(),
            initial,
            follow_up,
        }
    }
}

#[async_trait]
impl QuestionProvider for GatedProvider {
    async fn generate_batch(
        &self,
        _content: &DocumentContent,
        existing_titles: &[String],
        _api_key: Option<SecretString>,
    ) -> AppResult<Vec<QuizQuestion>> {
        if existing_titles.is_empty() {
            return Ok(self.initial.clone());
        }
        self.entered.notify_one();
        self.release.notified().await;
        Ok(self.follow_up.clone())
    }
}

/// Returns fixed text for every upload, or a fixed ingestion error.
pub struct StaticIngestor {
    result: AppResult<DocumentContent>,
}

impl StaticIngestor {
    pub fn text(text: &str) -> Self {
        Self {
            result: Ok(DocumentContent::text(text)),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(AppError::IngestionError(message.to_string())),
        }
    }
}

#[async_trait]
impl DocumentIngestor for StaticIngestor {
    async fn extract(&self, _document: &UploadedDocument) -> AppResult<DocumentContent> {
        self.result.clone()
    }
}

pub fn controller(
    provider: Arc<dyn QuestionProvider>,
    ingestor: Arc<dyn DocumentIngestor>,
) -> Arc<AcquisitionController> {
    Arc::new(AcquisitionController::new(Uuid::new_v4(), provider, ingestor))
}

pub fn app_state(
    provider: Arc<dyn QuestionProvider>,
    ingestor: Arc<dyn DocumentIngestor>,
) -> Arc<AppState> {
    Arc::new(AppState::with_collaborators(
        Config::test_config(),
        provider,
        ingestor,
    ))
}
