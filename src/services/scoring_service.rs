use std::collections::HashSet;

use crate::models::domain::{AcquisitionState, QuizQuestion, QuizSessionState};

pub struct ScoringService;

impl ScoringService {
    /// Exact set equality between the selection and the answer key.
    pub fn is_correct(question: &QuizQuestion, selected: Option<&HashSet<String>>) -> bool {
        let Some(selected) = selected else {
            return false;
        };
        selected.len() == question.correct_answers.len()
            && selected.is_subset(&question.correct_answers)
    }

    /// Share of graded questions, between 0.0 and 1.0.
    pub fn progress(state: &QuizSessionState) -> f64 {
        if state.questions.is_empty() {
            return 0.0;
        }
        state.checked_indices.len() as f64 / state.questions.len() as f64
    }

    pub fn score(state: &QuizSessionState) -> usize {
        state
            .checked_indices
            .iter()
            .filter(|&&index| {
                state
                    .questions
                    .get(index)
                    .is_some_and(|question| Self::is_correct(question, state.selected(index)))
            })
            .count()
    }

    /// Every question graded, no more coming, and nothing in flight.
    pub fn is_complete(state: &QuizSessionState, acquisition: &AcquisitionState) -> bool {
        !state.questions.is_empty()
            && state.checked_indices.len() == state.questions.len()
            && acquisition.has_reached_end
            && !acquisition.is_fetching_more
    }
}
