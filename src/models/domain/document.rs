use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Serialize;

/// A raw upload, before ingestion.
#[derive(Clone, Debug)]
pub struct UploadedDocument {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceKind {
    Text,
    Image { mime_type: String },
}

impl SourceKind {
    pub fn is_image(&self) -> bool {
        matches!(self, SourceKind::Image { .. })
    }
}

/// Ingested document: extracted text, or base64 image bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentContent {
    pub kind: SourceKind,
    pub payload: String,
}

impl DocumentContent {
    pub fn text(payload: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Text,
            payload: payload.into(),
        }
    }

    pub fn image(mime_type: impl Into<String>, base64_payload: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Image {
                mime_type: mime_type.into(),
            },
            payload: base64_payload.into(),
        }
    }
}

/// The document a session draws questions from.
#[derive(Clone, Debug)]
pub struct ActiveSource {
    pub name: String,
    pub content: DocumentContent,
    pub api_key: Option<SecretString>,
    pub uploaded_at: DateTime<Utc>,
}
