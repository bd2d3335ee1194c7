use crate::constants::quiz_limits::{BATCH_SIZE, OPTIONS_PER_QUESTION};

pub const QUIZ_EXTRACTION_SYSTEM_PROMPT: &str = "You are a quiz extraction agent. You read study material supplied by the user and return multiple-choice questions as structured JSON that downstream software grades automatically.

### Output Specifications:

- Return a single JSON object with one key, questions, holding an array of question objects. No prose, no markdown, no extra keys.
- question: the full question text.
- options: exactly four answer options, all different from each other.
- correct_answers: every correct option, copied verbatim from options. More than one answer may be correct.
- explanation: a short explanation of why the correct answers are correct.
- original_index: the label or number the question carries in the source material (for example '1' or 'Q15'). Use your best reference to its position when the source has no label.

### Accuracy and Validation:

- Every correct answer must be directly supported by the material.
- Never invent a question that repeats one the user says was already extracted.";

/// Builds the avoidance paragraph listing already extracted question titles.
///
/// Only the most recent `context_limit` titles are quoted; the total count is always given.
pub fn avoidance_context(existing_titles: &[String], context_limit: usize) -> String {
    if existing_titles.is_empty() {
        return format!("Extract {} questions from the content.", BATCH_SIZE);
    }

    let start = existing_titles.len().saturating_sub(context_limit);
    let recent = existing_titles[start..].join(", ");
    format!(
        "IMPORTANT: {} questions have already been extracted. DO NOT REPEAT THESE: [{}]. Look for completely NEW questions.",
        existing_titles.len(),
        recent
    )
}

pub fn text_batch_prompt(
    content: &str,
    existing_titles: &[String],
    context_limit: usize,
    selection_seed: u32,
    language: &str,
) -> String {
    format!(
        "Based on the text below, extract {batch} UNIQUE questions following these strict rules:
1. {avoid}
2. SELECTION: Pick questions at random from the whole document (jump between the beginning, the middle and the end). Do not proceed in order.
3. RANDOMNESS: Use this hint to vary the selection: {seed}.
4. FORMAT: For every question extract question, exactly {options} options, all correct_answers, a short explanation and the original_index.
5. QUANTITY: Always try to return exactly {batch} questions if the material allows it.
6. LANGUAGE: All generated text must be in {language}.

Source text:

{content}",
        batch = BATCH_SIZE,
        avoid = avoidance_context(existing_titles, context_limit),
        seed = selection_seed,
        options = OPTIONS_PER_QUESTION,
        language = language,
        content = content,
    )
}

pub fn image_batch_prompt(existing_titles: &[String], context_limit: usize, language: &str) -> String {
    format!(
        "{avoid} Pick at random and extract {batch} questions from this image. Do not follow the visual order. Return {batch} unique questions as JSON with the question text, exactly {options} options, ALL correct answers (there may be several), an explanation and the original index. Answers must be in {language}.",
        avoid = avoidance_context(existing_titles, context_limit),
        batch = BATCH_SIZE,
        options = OPTIONS_PER_QUESTION,
        language = language,
    )
}
