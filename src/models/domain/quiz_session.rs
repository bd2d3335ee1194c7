use std::collections::{BTreeSet, HashMap, HashSet};

use crate::{
    errors::{AppError, AppResult},
    models::domain::QuizQuestion,
};

/// Authoritative in-memory model of one quiz.
///
/// `questions` only grows; `checked_indices` only grows and always indexes into `questions`.
/// Both shrink only through [`QuizSessionState::reset`].
#[derive(Clone, Debug, Default)]
pub struct QuizSessionState {
    pub questions: Vec<QuizQuestion>,
    pub user_answers: HashMap<usize, HashSet<String>>,
    pub checked_indices: BTreeSet<usize>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl QuizSessionState {
    pub fn question(&self, index: usize) -> AppResult<&QuizQuestion> {
        self.questions
            .get(index)
            .ok_or_else(|| AppError::NotFound(format!("Question {} does not exist", index)))
    }

    pub fn is_checked(&self, index: usize) -> bool {
        self.checked_indices.contains(&index)
    }

    pub fn selected(&self, index: usize) -> Option<&HashSet<String>> {
        self.user_answers.get(&index)
    }

    /// Toggles `option` in the answer set of an ungraded question.
    ///
    /// Returns `Ok(false)` without touching anything once the question is graded.
    pub fn toggle_option(&mut self, index: usize, option: &str) -> AppResult<bool> {
        let question = self.question(index)?;
        if self.is_checked(index) {
            return Ok(false);
        }

        if !question.has_option(option) {
            return Err(AppError::ValidationError(format!(
                "'{}' is not an option of question {}",
                option, index
            )));
        }

        let answers = self.user_answers.entry(index).or_default();
        if !answers.remove(option) {
            answers.insert(option.to_string());
        }
        Ok(true)
    }

    /// Marks a question as graded. Returns true only the first time.
    pub fn check_answer(&mut self, index: usize) -> AppResult<bool> {
        self.question(index)?;
        Ok(self.checked_indices.insert(index))
    }

    pub fn titles(&self) -> Vec<String> {
        self.questions.iter().map(|q| q.question.clone()).collect()
    }

    pub fn append(&mut self, batch: Vec<QuizQuestion>) {
        self.questions.extend(batch);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::{question_with, sample_batch};

    fn state_with_one_question() -> QuizSessionState {
        let mut state = QuizSessionState::default();
        state.append(vec![question_with("Colours?", &["red", "green", "blue", "black"], &["red", "blue"])]);
        state
    }

    #[test]
    fn test_selecting_two_then_deselecting_one_leaves_the_other() {
        let mut state = state_with_one_question();

        state.toggle_option(0, "red").unwrap();
        state.toggle_option(0, "green").unwrap();
        state.toggle_option(0, "red").unwrap();

        let selected = state.selected(0).unwrap();
        assert_eq!(selected.len(), 1);
        assert!(selected.contains("green"));
    }

    #[test]
    fn test_graded_question_ignores_toggles() {
        let mut state = state_with_one_question();
        state.toggle_option(0, "red").unwrap();
        state.check_answer(0).unwrap();

        let changed = state.toggle_option(0, "blue").unwrap();

        assert!(!changed);
        assert_eq!(state.selected(0).unwrap().len(), 1);
    }

    #[test]
    fn test_graded_question_ignores_unknown_options_too() {
        let mut state = state_with_one_question();
        state.toggle_option(0, "red").unwrap();
        state.check_answer(0).unwrap();

        let changed = state.toggle_option(0, "purple").unwrap();

        assert!(!changed);
        assert!(state.selected(0).unwrap().contains("red"));
    }

    #[test]
    fn test_check_answer_is_idempotent() {
        let mut state = state_with_one_question();

        assert!(state.check_answer(0).unwrap());
        assert!(!state.check_answer(0).unwrap());
        assert_eq!(state.checked_indices.len(), 1);
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let mut state = state_with_one_question();

        assert!(matches!(state.check_answer(5), Err(AppError::NotFound(_))));
        assert!(matches!(state.toggle_option(5, "red"), Err(AppError::NotFound(_))));
        assert!(state.checked_indices.is_empty());
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let mut state = state_with_one_question();

        let result = state.toggle_option(0, "purple");

        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert!(state.selected(0).is_none());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut state = QuizSessionState::default();
        state.append(sample_batch(0..3));
        state.check_answer(1).unwrap();
        state.error = Some("boom".to_string());
        state.is_loading = true;

        state.reset();

        assert!(state.questions.is_empty());
        assert!(state.checked_indices.is_empty());
        assert!(state.user_answers.is_empty());
        assert!(state.error.is_none());
        assert!(!state.is_loading);
    }
}
