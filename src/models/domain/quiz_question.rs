use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Validate, JsonSchema)]
#[validate(schema(function = "validate_answer_key"))]
pub struct QuizQuestion {
    #[validate(length(min = 1, message = "Question text cannot be empty"))]
    pub question: String,
    // keep in sync with quiz_limits::OPTIONS_PER_QUESTION
    #[validate(length(
        equal = 4,
        message = "A question needs exactly OPTIONS_PER_QUESTION (4) options"
    ))]
    pub options: Vec<String>,
    pub correct_answers: HashSet<String>,
    pub explanation: String,
    pub original_index: String, // label from the source document, e.g. "Q15"
}

impl QuizQuestion {
    pub fn is_correct_option(&self, option: &str) -> bool {
        self.correct_answers.contains(option)
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

fn validate_answer_key(question: &QuizQuestion) -> Result<(), ValidationError> {
    let distinct: HashSet<&str> = question.options.iter().map(String::as_str).collect();
    if distinct.len() != question.options.len() {
        return Err(ValidationError::new("duplicate_options"));
    }

    if question.correct_answers.is_empty() {
        return Err(ValidationError::new("missing_correct_answer"));
    }

    if !question
        .correct_answers
        .iter()
        .all(|answer| distinct.contains(answer.as_str()))
    {
        return Err(ValidationError::new("correct_answer_not_an_option"));
    }

    Ok(())
}

/// Structured payload requested from the provider.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
pub struct QuizBatchPayload {
    pub questions: Vec<QuizQuestion>,
}
