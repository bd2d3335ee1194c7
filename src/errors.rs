use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Ingestion error: {0}")]
    IngestionError(String),

    #[error("Missing credentials: {0}")]
    CredentialError(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    fn error_code(&self) -> &'static str {
        match self {
            AppError::IngestionError(_) => "INGESTION_ERROR",
            AppError::CredentialError(_) => "CREDENTIAL_ERROR",
            AppError::ProviderError(_) => "PROVIDER_ERROR",
            AppError::ParseError(_) => "PARSE_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Failures of the question provider, parse failures included.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            AppError::CredentialError(_) | AppError::ProviderError(_) | AppError::ParseError(_)
        )
    }

    /// The message shown to the quiz taker, without the error kind prefix.
    pub fn user_message(&self) -> String {
        match self {
            AppError::IngestionError(msg)
            | AppError::CredentialError(msg)
            | AppError::ProviderError(msg)
            | AppError::ParseError(msg)
            | AppError::NotFound(msg)
            | AppError::ValidationError(msg)
            | AppError::InternalError(msg) => msg.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    pub status: u16,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::IngestionError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::CredentialError(_) => StatusCode::UNAUTHORIZED,
            AppError::ProviderError(_) => StatusCode::BAD_GATEWAY,
            AppError::ParseError(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            code: self.error_code(),
            status: self.status_code().as_u16(),
        })
    }
}

impl From<async_openai::error::OpenAIError> for AppError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        AppError::ProviderError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(format!("Background task failed: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;
