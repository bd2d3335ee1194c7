use std::path::Path;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::{
    errors::{AppError, AppResult},
    models::domain::{DocumentContent, UploadedDocument},
};

/// Turns an uploaded file into text or a base64 image payload.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentIngestor: Send + Sync {
    async fn extract(&self, document: &UploadedDocument) -> AppResult<DocumentContent>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DocumentKind {
    Pdf,
    Image(String),
}

/// PDF text through `pdf-extract`, images passed through as base64.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultDocumentIngestor;

#[async_trait]
impl DocumentIngestor for DefaultDocumentIngestor {
    async fn extract(&self, document: &UploadedDocument) -> AppResult<DocumentContent> {
        if document.bytes.is_empty() {
            return Err(AppError::IngestionError(format!(
                "The file '{}' is empty.",
                document.name
            )));
        }

        match detect_kind(document) {
            Some(DocumentKind::Pdf) => {
                let text = extract_pdf_text(document.bytes.clone()).await?;
                log::debug!("Extracted {} characters from '{}'", text.len(), document.name);
                Ok(DocumentContent::text(text))
            }
            Some(DocumentKind::Image(mime_type)) => {
                Ok(DocumentContent::image(mime_type, STANDARD.encode(&document.bytes)))
            }
            None => Err(AppError::IngestionError(
                "Please upload a PDF file or an image.".to_string(),
            )),
        }
    }
}

/// MIME type first, file extension as the fallback for generic uploads.
fn detect_kind(document: &UploadedDocument) -> Option<DocumentKind> {
    let mime_type = document
        .mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if mime_type == "application/pdf" {
        return Some(DocumentKind::Pdf);
    }
    if mime_type.starts_with("image/") {
        return Some(DocumentKind::Image(mime_type));
    }

    let extension = Path::new(&document.name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())?;

    match extension.as_str() {
        "pdf" => Some(DocumentKind::Pdf),
        "png" => Some(DocumentKind::Image("image/png".to_string())),
        "jpg" | "jpeg" => Some(DocumentKind::Image("image/jpeg".to_string())),
        "gif" => Some(DocumentKind::Image("image/gif".to_string())),
        "webp" => Some(DocumentKind::Image("image/webp".to_string())),
        _ => None,
    }
}

/// Runs `pdf-extract` off the async executor; a panic inside the parser counts as a failed extraction.
async fn extract_pdf_text(pdf_bytes: Vec<u8>) -> AppResult<String> {
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf_bytes))
        .await
        .map_err(|e| AppError::IngestionError(format!("PDF extraction aborted: {}", e)))?
        .map_err(|e| AppError::IngestionError(format!("Failed to extract text from PDF: {}", e)))?;

    if text.trim().is_empty() {
        return Err(AppError::IngestionError(
            "PDF appears to be empty or contains only images.".to_string(),
        ));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::SourceKind;

    fn upload(name: &str, mime_type: &str, bytes: &[u8]) -> UploadedDocument {
        UploadedDocument {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn test_detects_kind_from_mime_type() {
        assert_eq!(detect_kind(&upload("a", "application/pdf", b"x")), Some(DocumentKind::Pdf));
        assert_eq!(
            detect_kind(&upload("a", "image/PNG", b"x")),
            Some(DocumentKind::Image("image/png".to_string()))
        );
    }

    #[test]
    fn test_falls_back_to_extension_for_generic_uploads() {
        assert_eq!(
            detect_kind(&upload("notes.PDF", "application/octet-stream", b"x")),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(
            detect_kind(&upload("scan.jpeg", "", b"x")),
            Some(DocumentKind::Image("image/jpeg".to_string()))
        );
        assert_eq!(detect_kind(&upload("notes.txt", "text/plain", b"x")), None);
    }

    #[tokio::test]
    async fn test_image_is_encoded_as_base64() {
        let content = DefaultDocumentIngestor
            .extract(&upload("photo.png", "image/png", b"hello"))
            .await
            .unwrap();

        assert_eq!(content.payload, "aGVsbG8=");
        assert_eq!(
            content.kind,
            SourceKind::Image {
                mime_type: "image/png".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_unsupported_file_is_rejected() {
        let result = DefaultDocumentIngestor
            .extract(&upload("notes.txt", "text/plain", b"plain text"))
            .await;

        assert!(matches!(result, Err(AppError::IngestionError(_))));
    }

    #[tokio::test]
    async fn test_empty_file_is_rejected() {
        let result = DefaultDocumentIngestor
            .extract(&upload("empty.pdf", "application/pdf", b""))
            .await;

        assert!(matches!(result, Err(AppError::IngestionError(_))));
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_an_ingestion_error() {
        let result = DefaultDocumentIngestor
            .extract(&upload("broken.pdf", "application/pdf", b"definitely not a pdf"))
            .await;

        assert!(matches!(result, Err(AppError::IngestionError(_))));
    }
}
