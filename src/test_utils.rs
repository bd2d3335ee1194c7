use crate::models::domain::QuizQuestion;

#[cfg(test)]
pub mod fixtures {
    use super::*;
    use std::ops::Range;

    /// Creates a question with the given text, options and answer key
    pub fn question_with(text: &str, options: &[&str], correct: &[&str]) -> QuizQuestion {
        QuizQuestion {
            question: text.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answers: correct.iter().map(|c| c.to_string()).collect(),
            explanation: format!("Explanation for {}", text),
            original_index: "1".to_string(),
        }
    }

    /// Creates the n-th standard test question; option "A{n}" is the correct one
    pub fn sample_question(n: usize) -> QuizQuestion {
        let options = [
            format!("A{}", n),
            format!("B{}", n),
            format!("C{}", n),
            format!("D{}", n),
        ];
        QuizQuestion {
            question: format!("Question {}?", n),
            options: options.to_vec(),
            correct_answers: [format!("A{}", n)].into_iter().collect(),
            explanation: format!("A{} is stated in section {}", n, n),
            original_index: format!("Q{}", n),
        }
    }

    /// Creates one test question per number in the range
    pub fn sample_batch(range: Range<usize>) -> Vec<QuizQuestion> {
        range.map(sample_question).collect()
    }

    /// Question texts of the given questions
    pub fn titles_of(questions: &[QuizQuestion]) -> Vec<String> {
        questions.iter().map(|q| q.question.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use validator::Validate;

    #[test]
    fn test_fixtures_sample_question_is_valid() {
        let question = sample_question(7);
        assert_eq!(question.question, "Question 7?");
        assert!(question.is_correct_option("A7"));
        assert!(question.validate().is_ok());
    }

    #[test]
    fn test_fixtures_sample_batch() {
        let batch = sample_batch(3..6);
        assert_eq!(titles_of(&batch), vec!["Question 3?", "Question 4?", "Question 5?"]);
    }
}
