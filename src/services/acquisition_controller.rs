use std::sync::Arc;

use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};
use secrecy::SecretString;
use serde::Serialize;
use tokio::{sync::RwLock, task::JoinHandle};
use uuid::Uuid;

use crate::{
    constants::quiz_limits::MAX_QUESTIONS,
    errors::{AppError, AppResult},
    models::{
        domain::{
            AcquisitionState, ActiveSource, DocumentContent, QuizQuestion, QuizSessionState,
            UploadedDocument,
        },
        dto::response::SessionSnapshot,
    },
    services::{
        dedup::DeduplicationFilter, ingestion::DocumentIngestor,
        question_provider::QuestionProvider, scoring_service::ScoringService,
        shuffle::shuffle_batch,
    },
};

const NO_NEW_UNIQUE_QUESTIONS: &str = "No more new, unique questions were found in the document.";
const SOURCE_EXHAUSTED: &str = "The document did not yield any further questions.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    Manual,
    Automatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoActiveSource,
    InitialLoadInProgress,
    AlreadyFetching,
    ReachedEnd,
    CeilingReached,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// The provider was not called.
    Skipped { reason: SkipReason },
    Appended { added: usize, reached_end: bool },
    /// Nothing new survived deduplication; the source counts as exhausted.
    Exhausted { raw_count: usize },
    Failed { message: String },
    /// The session was reset while the request was in flight.
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StartOutcome {
    Loaded { questions: usize },
    /// A newer upload or a reset replaced this one before it finished.
    Superseded,
}

#[derive(Debug)]
pub struct CheckOutcome {
    pub is_correct: bool,
    pub newly_checked: bool,
    /// Background fetch started by this grading, if it hit a fresh checkpoint.
    pub prefetch: Option<JoinHandle<FetchOutcome>>,
}

struct SessionInner {
    quiz: QuizSessionState,
    acquisition: AcquisitionState,
    rng: StdRng,
}

/// Owns one quiz session and every transition of its state.
///
/// The lock is never held across an ingestion or provider call. Work that awaits one of
/// those captures the acquisition epoch first and drops its result if a reset happened
/// in between.
pub struct AcquisitionController {
    id: Uuid,
    provider: Arc<dyn QuestionProvider>,
    ingestor: Arc<dyn DocumentIngestor>,
    inner: RwLock<SessionInner>,
}

impl AcquisitionController {
    pub fn new(
        id: Uuid,
        provider: Arc<dyn QuestionProvider>,
        ingestor: Arc<dyn DocumentIngestor>,
    ) -> Self {
        Self::with_rng(id, provider, ingestor, StdRng::from_os_rng())
    }

    pub fn with_rng(
        id: Uuid,
        provider: Arc<dyn QuestionProvider>,
        ingestor: Arc<dyn DocumentIngestor>,
        rng: StdRng,
    ) -> Self {
        Self {
            id,
            provider,
            ingestor,
            inner: RwLock::new(SessionInner {
                quiz: QuizSessionState::default(),
                acquisition: AcquisitionState::default(),
                rng,
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Replaces whatever the session held with a quiz built from `document`.
    ///
    /// Failures are recorded as the session error and also returned.
    pub async fn start_session(
        &self,
        document: UploadedDocument,
        api_key: Option<SecretString>,
    ) -> AppResult<StartOutcome> {
        let epoch = {
            let mut inner = self.inner.write().await;
            inner.quiz.reset();
            inner.quiz.is_loading = true;
            inner.acquisition.reset()
        };

        log::info!(
            "Session {}: starting quiz from '{}' ({} bytes)",
            self.id,
            document.name,
            document.bytes.len()
        );

        match self.load_initial_batch(epoch, document, api_key).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                let mut inner = self.inner.write().await;
                if inner.acquisition.epoch == epoch {
                    inner.quiz.is_loading = false;
                    inner.quiz.error = Some(err.user_message());
                }
                if err.is_provider_failure() {
                    log::warn!("Session {}: provider failed on initial load: {}", self.id, err);
                } else {
                    log::warn!("Session {}: initial load failed: {}", self.id, err);
                }
                Err(err)
            }
        }
    }

    async fn load_initial_batch(
        &self,
        epoch: u64,
        document: UploadedDocument,
        api_key: Option<SecretString>,
    ) -> AppResult<StartOutcome> {
        let content = self.ingestor.extract(&document).await?;

        {
            let mut inner = self.inner.write().await;
            if inner.acquisition.epoch != epoch {
                return Ok(StartOutcome::Superseded);
            }
            inner.acquisition.active_source = Some(ActiveSource {
                name: document.name.clone(),
                content: content.clone(),
                api_key: api_key.clone(),
                uploaded_at: Utc::now(),
            });
        }

        let batch = self.provider.generate_batch(&content, &[], api_key).await?;

        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        if inner.acquisition.epoch != epoch {
            log::info!("Session {}: dropping initial batch of a replaced upload", self.id);
            return Ok(StartOutcome::Superseded);
        }

        let mut accepted = DeduplicationFilter::from_titles(&[]).retain_unseen(batch);
        if accepted.is_empty() {
            return Err(AppError::ProviderError(
                "No questions could be extracted from the document.".to_string(),
            ));
        }
        accepted.truncate(MAX_QUESTIONS);

        let accepted = shuffle_batch(accepted, &mut inner.rng);
        let count = accepted.len();
        inner.quiz.append(accepted);
        inner.quiz.is_loading = false;
        if count >= MAX_QUESTIONS {
            inner.acquisition.mark_reached_end();
        }

        log::info!("Session {}: loaded {} initial questions", self.id, count);
        Ok(StartOutcome::Loaded { questions: count })
    }

    /// Requests another batch unless the session cannot or need not grow.
    pub async fn fetch_more(&self, mode: FetchMode) -> FetchOutcome {
        let (epoch, content, api_key, titles) = {
            let mut inner = self.inner.write().await;
            let Some(source) = inner.acquisition.active_source.as_ref() else {
                return FetchOutcome::Skipped { reason: SkipReason::NoActiveSource };
            };
            let content = source.content.clone();
            let api_key = source.api_key.clone();

            if inner.quiz.is_loading {
                return FetchOutcome::Skipped { reason: SkipReason::InitialLoadInProgress };
            }
            if inner.acquisition.is_fetching_more {
                return FetchOutcome::Skipped { reason: SkipReason::AlreadyFetching };
            }
            if inner.acquisition.has_reached_end {
                return FetchOutcome::Skipped { reason: SkipReason::ReachedEnd };
            }
            if inner.quiz.questions.len() >= MAX_QUESTIONS {
                inner.acquisition.mark_reached_end();
                return FetchOutcome::Skipped { reason: SkipReason::CeilingReached };
            }

            inner.acquisition.is_fetching_more = true;
            (inner.acquisition.epoch, content, api_key, inner.quiz.titles())
        };

        log::debug!(
            "Session {}: fetching more questions ({:?}, {} known)",
            self.id,
            mode,
            titles.len()
        );
        let result = self.request_batch(&content, &titles, api_key).await;

        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        if inner.acquisition.epoch != epoch {
            log::info!("Session {}: discarding batch that arrived after a reset", self.id);
            return FetchOutcome::Discarded;
        }
        inner.acquisition.is_fetching_more = false;

        match result {
            Ok(batch) => self.merge_batch(inner, batch, mode),
            Err(err) => {
                log::warn!("Session {}: {:?} fetch failed: {}", self.id, mode, err);
                if mode == FetchMode::Manual {
                    inner.quiz.notice =
                        Some(format!("Could not load more questions: {}", err.user_message()));
                }
                FetchOutcome::Failed {
                    message: err.user_message(),
                }
            }
        }
    }

    async fn request_batch(
        &self,
        content: &DocumentContent,
        titles: &[String],
        api_key: Option<SecretString>,
    ) -> AppResult<Vec<QuizQuestion>> {
        self.provider.generate_batch(content, titles, api_key).await
    }

    fn merge_batch(
        &self,
        inner: &mut SessionInner,
        batch: Vec<QuizQuestion>,
        mode: FetchMode,
    ) -> FetchOutcome {
        let raw_count = batch.len();
        let existing = inner.quiz.titles();
        let mut unseen = DeduplicationFilter::from_titles(&existing).retain_unseen(batch);

        if unseen.is_empty() {
            inner.acquisition.mark_reached_end();
            if mode == FetchMode::Manual {
                let notice = if raw_count > 0 {
                    NO_NEW_UNIQUE_QUESTIONS
                } else {
                    SOURCE_EXHAUSTED
                };
                inner.quiz.notice = Some(notice.to_string());
            }
            log::info!(
                "Session {}: source exhausted ({} candidates, none new)",
                self.id,
                raw_count
            );
            return FetchOutcome::Exhausted { raw_count };
        }

        unseen.truncate(AcquisitionState::remaining_capacity(inner.quiz.questions.len()));
        let accepted = shuffle_batch(unseen, &mut inner.rng);
        let added = accepted.len();
        inner.quiz.append(accepted);

        let reached_end = inner.quiz.questions.len() >= MAX_QUESTIONS;
        if reached_end {
            inner.acquisition.mark_reached_end();
        }

        log::info!(
            "Session {}: appended {} of {} candidates, {} total",
            self.id,
            added,
            raw_count,
            inner.quiz.questions.len()
        );
        FetchOutcome::Appended { added, reached_end }
    }

    /// Runs a fetch on its own task so it completes even if the caller goes away.
    pub fn spawn_fetch(self: &Arc<Self>, mode: FetchMode) -> JoinHandle<FetchOutcome> {
        let controller = Arc::clone(self);
        tokio::spawn(async move { controller.fetch_more(mode).await })
    }

    pub async fn toggle_option(&self, index: usize, option: &str) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        inner.quiz.toggle_option(index, option)
    }

    /// Grades a question and, at an untriggered checkpoint, starts a background fetch.
    ///
    /// The grading is committed before this returns; the fetch is not awaited.
    pub async fn check_answer(self: &Arc<Self>, index: usize) -> AppResult<CheckOutcome> {
        let (is_correct, newly_checked, should_prefetch) = {
            let mut inner = self.inner.write().await;
            let newly_checked = inner.quiz.check_answer(index)?;
            let question = inner.quiz.question(index)?;
            let is_correct = ScoringService::is_correct(question, inner.quiz.selected(index));
            let should_prefetch = inner.acquisition.triggers.register_grading(index);
            (is_correct, newly_checked, should_prefetch)
        };

        let prefetch = should_prefetch.then(|| {
            log::debug!("Session {}: checkpoint {} reached, prefetching", self.id, index);
            self.spawn_fetch(FetchMode::Automatic)
        });

        Ok(CheckOutcome {
            is_correct,
            newly_checked,
            prefetch,
        })
    }

    pub async fn reset(&self) {
        let mut inner = self.inner.write().await;
        inner.quiz.reset();
        inner.acquisition.reset();
        log::info!("Session {}: reset", self.id);
    }

    pub async fn dismiss_notice(&self) {
        self.inner.write().await.quiz.notice = None;
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.read().await;
        SessionSnapshot::build(self.id, &inner.quiz, &inner.acquisition)
    }
}
