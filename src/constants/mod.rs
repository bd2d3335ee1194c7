pub mod quiz_limits;
pub mod quiz_prompt;
