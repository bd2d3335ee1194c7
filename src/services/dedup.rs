use std::collections::HashSet;

use crate::models::domain::QuizQuestion;

/// Rejects candidates whose question text was already accepted.
///
/// Matching is exact: case-sensitive and untrimmed. Duplicates inside the candidate
/// batch itself are dropped as well, keeping the first occurrence.
pub struct DeduplicationFilter {
    seen: HashSet<String>,
}

impl DeduplicationFilter {
    pub fn from_titles(existing_titles: &[String]) -> Self {
        Self {
            seen: existing_titles.iter().cloned().collect(),
        }
    }

    pub fn retain_unseen(&mut self, candidates: Vec<QuizQuestion>) -> Vec<QuizQuestion> {
        candidates
            .into_iter()
            .filter(|candidate| self.seen.insert(candidate.question.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::{sample_batch, sample_question, titles_of};

    #[test]
    fn test_four_duplicates_out_of_ten_leave_six() {
        let existing = titles_of(&sample_batch(0..15));
        let candidates = sample_batch(11..21);

        let unseen = DeduplicationFilter::from_titles(&existing).retain_unseen(candidates);

        assert_eq!(unseen.len(), 6);
        assert_eq!(unseen[0].question, "Question 15?");
    }

    #[test]
    fn test_matching_is_case_sensitive_and_untrimmed() {
        let existing = vec!["Question 1?".to_string()];
        let mut upper = sample_question(1);
        upper.question = "QUESTION 1?".to_string();
        let mut padded = sample_question(1);
        padded.question = " Question 1?".to_string();

        let unseen =
            DeduplicationFilter::from_titles(&existing).retain_unseen(vec![upper, padded, sample_question(1)]);

        assert_eq!(titles_of(&unseen), vec!["QUESTION 1?", " Question 1?"]);
    }

    #[test]
    fn test_repeats_within_one_batch_are_dropped() {
        let candidates = vec![sample_question(4), sample_question(4), sample_question(5)];

        let unseen = DeduplicationFilter::from_titles(&[]).retain_unseen(candidates);

        assert_eq!(titles_of(&unseen), vec!["Question 4?", "Question 5?"]);
    }
}
