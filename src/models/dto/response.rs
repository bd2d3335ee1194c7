use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    constants::quiz_limits::MAX_QUESTIONS,
    models::domain::{AcquisitionState, ActiveSource, QuizQuestion, QuizSessionState, SourceKind},
    services::{acquisition_controller::FetchOutcome, scoring_service::ScoringService},
};

#[derive(Debug, Clone, Serialize)]
pub struct SourceSummaryDto {
    pub name: String,
    #[serde(flatten)]
    pub kind: SourceKind,
    pub has_api_key: bool,
    pub uploaded_at: DateTime<Utc>,
}

impl From<&ActiveSource> for SourceSummaryDto {
    fn from(source: &ActiveSource) -> Self {
        SourceSummaryDto {
            name: source.name.clone(),
            kind: source.content.kind.clone(),
            has_api_key: source.api_key.is_some(),
            uploaded_at: source.uploaded_at,
        }
    }
}

/// A question as the player sees it. The answer key stays hidden until graded.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionDto {
    pub index: usize,
    pub question: String,
    pub options: Vec<String>,
    pub selected: Vec<String>,
    pub is_checked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_index: Option<String>,
}

impl QuestionDto {
    fn build(index: usize, question: &QuizQuestion, state: &QuizSessionState) -> Self {
        let selected_set = state.selected(index);
        let selected = question
            .options
            .iter()
            .filter(|option| selected_set.is_some_and(|set| set.contains(*option)))
            .cloned()
            .collect();

        let is_checked = state.is_checked(index);
        let (is_correct, correct_answers, explanation, original_index) = if is_checked {
            let correct_answers = question
                .options
                .iter()
                .filter(|option| question.is_correct_option(option))
                .cloned()
                .collect();
            (
                Some(ScoringService::is_correct(question, selected_set)),
                Some(correct_answers),
                Some(question.explanation.clone()),
                Some(question.original_index.clone()),
            )
        } else {
            (None, None, None, None)
        };

        QuestionDto {
            index,
            question: question.question.clone(),
            options: question.options.clone(),
            selected,
            is_checked,
            is_correct,
            correct_answers,
            explanation,
            original_index,
        }
    }
}

/// Everything a client needs to render one session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub source: Option<SourceSummaryDto>,
    pub questions: Vec<QuestionDto>,
    pub total_questions: usize,
    pub checked_count: usize,
    pub score: usize,
    pub progress: f64,
    pub progress_percent: u8,
    pub remaining_capacity: usize,
    pub max_questions: usize,
    pub is_loading: bool,
    pub is_fetching_more: bool,
    pub has_reached_end: bool,
    pub is_complete: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl SessionSnapshot {
    pub fn build(
        session_id: Uuid,
        quiz: &QuizSessionState,
        acquisition: &AcquisitionState,
    ) -> Self {
        let progress = ScoringService::progress(quiz);
        SessionSnapshot {
            session_id,
            source: acquisition.active_source.as_ref().map(SourceSummaryDto::from),
            questions: quiz
                .questions
                .iter()
                .enumerate()
                .map(|(index, question)| QuestionDto::build(index, question, quiz))
                .collect(),
            total_questions: quiz.questions.len(),
            checked_count: quiz.checked_indices.len(),
            score: ScoringService::score(quiz),
            progress,
            progress_percent: (progress * 100.0).round() as u8,
            remaining_capacity: AcquisitionState::remaining_capacity(quiz.questions.len()),
            max_questions: MAX_QUESTIONS,
            is_loading: quiz.is_loading,
            is_fetching_more: acquisition.is_fetching_more,
            has_reached_end: acquisition.has_reached_end,
            is_complete: ScoringService::is_complete(quiz, acquisition),
            error: quiz.error.clone(),
            notice: quiz.notice.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionCreatedResponse {
    pub session_id: Uuid,
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub struct CheckAnswerResponse {
    pub is_correct: bool,
    pub prefetch_triggered: bool,
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub struct FetchMoreResponse {
    pub outcome: FetchOutcome,
    pub snapshot: SessionSnapshot,
}
