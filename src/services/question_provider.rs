use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    config::Config,
    constants::{
        quiz_limits::SELECTION_SEED_RANGE,
        quiz_prompt::{image_batch_prompt, text_batch_prompt, QUIZ_EXTRACTION_SYSTEM_PROMPT},
    },
    errors::{AppError, AppResult},
    models::domain::{DocumentContent, QuizBatchPayload, QuizQuestion, SourceKind},
};

static CODE_FENCE_REGEX: Lazy<regex::Regex> = Lazy::new(|| {
    regex::Regex::new(r"(?s)^\s*```(?:json|JSON)?\s*(.*?)\s*```\s*$")
        .expect("CODE_FENCE_REGEX is a valid regex pattern")
});

/// Source of proposed quiz questions for a document.
///
/// `existing_titles` is an exclusion hint only; callers still filter duplicates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    async fn generate_batch(
        &self,
        content: &DocumentContent,
        existing_titles: &[String],
        api_key: Option<SecretString>,
    ) -> AppResult<Vec<QuizQuestion>>;
}

/// Provider backed by any OpenAI-compatible chat completion endpoint.
pub struct OpenAiQuestionProvider {
    api_base: String,
    model: String,
    fallback_api_key: Option<SecretString>,
    language: String,
    exclusion_context_limit: usize,
}

impl OpenAiQuestionProvider {
    pub fn new(config: &Config) -> Self {
        Self {
            api_base: config.ai_api_base.clone(),
            model: config.ai_model.clone(),
            fallback_api_key: config.ai_api_key.clone(),
            language: config.quiz_language.clone(),
            exclusion_context_limit: config.exclusion_context_limit,
        }
    }

    /// The session's own key wins; the configured key is the fallback.
    fn resolve_api_key(&self, session_key: Option<SecretString>) -> AppResult<SecretString> {
        session_key
            .filter(|key| !key.expose_secret().trim().is_empty())
            .or_else(|| self.fallback_api_key.clone())
            .ok_or_else(|| {
                AppError::CredentialError(
                    "Missing API key. Please provide your API key with the upload.".to_string(),
                )
            })
    }

    fn build_request(
        &self,
        content: &DocumentContent,
        existing_titles: &[String],
        selection_seed: u32,
    ) -> AppResult<ChatRequest> {
        let user_content = match &content.kind {
            SourceKind::Text => MessageContent::Text(text_batch_prompt(
                &content.payload,
                existing_titles,
                self.exclusion_context_limit,
                selection_seed,
                &self.language,
            )),
            SourceKind::Image { mime_type } => MessageContent::Parts(vec![
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: format!("data:{};base64,{}", mime_type, content.payload),
                    },
                },
                ContentPart::Text {
                    text: image_batch_prompt(
                        existing_titles,
                        self.exclusion_context_limit,
                        &self.language,
                    ),
                },
            ]),
        };

        Ok(ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(QUIZ_EXTRACTION_SYSTEM_PROMPT.to_string()),
                },
                ChatMessage {
                    role: "user",
                    content: user_content,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: "quiz_batch",
                    schema: batch_schema()?,
                    strict: false,
                },
            },
        })
    }

    fn client(&self, api_key: &SecretString) -> Client<OpenAIConfig> {
        let config = OpenAIConfig::new()
            .with_api_base(self.api_base.clone())
            .with_api_key(api_key.expose_secret().to_string());
        Client::with_config(config)
    }
}

#[async_trait]
impl QuestionProvider for OpenAiQuestionProvider {
    async fn generate_batch(
        &self,
        content: &DocumentContent,
        existing_titles: &[String],
        api_key: Option<SecretString>,
    ) -> AppResult<Vec<QuizQuestion>> {
        let api_key = self.resolve_api_key(api_key)?;
        let selection_seed = rand::rng().random_range(0..SELECTION_SEED_RANGE);
        let request = self.build_request(content, existing_titles, selection_seed)?;

        log::info!(
            "Requesting question batch from model {} ({} known titles, image: {})",
            self.model,
            existing_titles.len(),
            content.kind.is_image()
        );

        let response: ChatResponse = self.client(&api_key).chat().create_byot(request).await?;

        let raw = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| AppError::ProviderError("The API sent no response.".to_string()))?;

        parse_batch(&raw)
    }
}

fn batch_schema() -> AppResult<serde_json::Value> {
    let mut schema = serde_json::to_value(schemars::schema_for!(QuizBatchPayload))
        .map_err(|e| AppError::InternalError(format!("Failed to build response schema: {}", e)))?;
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
    }
    Ok(schema)
}

fn strip_code_fence(raw: &str) -> &str {
    CODE_FENCE_REGEX
        .captures(raw)
        .and_then(|captures| captures.get(1))
        .map_or(raw.trim(), |body| body.as_str())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BatchEnvelope {
    Wrapped(QuizBatchPayload),
    Bare(Vec<QuizQuestion>),
}

/// Parses provider output; malformed JSON rejects the whole batch, while questions that
/// fail validation are dropped one by one.
pub fn parse_batch(raw: &str) -> AppResult<Vec<QuizQuestion>> {
    let envelope: BatchEnvelope = serde_json::from_str(strip_code_fence(raw)).map_err(|e| {
        log::error!("Failed to parse quiz batch: {}. Received: {}", e, raw);
        AppError::ParseError("Could not process the quiz data. Please try again.".to_string())
    })?;

    let questions = match envelope {
        BatchEnvelope::Wrapped(payload) => payload.questions,
        BatchEnvelope::Bare(questions) => questions,
    };

    Ok(questions
        .into_iter()
        .filter(|question| match question.validate() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Dropping malformed question '{}': {}", question.question, e);
                false
            }
        })
        .collect())
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat {
    name: &'static str,
    schema: serde_json::Value,
    strict: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}
