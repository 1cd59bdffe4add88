//! Document text extraction seam.
//!
//! Format-specific extraction (PDF, DOCX, OCR pipelines) lives behind
//! [`DocumentExtractor`]; the retrieval tool only sees bytes in, text out.

use async_trait::async_trait;

/// Error type for document extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The bytes are not a document this extractor understands.
    #[error("unsupported or corrupt document: {0}")]
    Unsupported(String),

    /// Extraction started but failed partway through.
    #[error("extraction failed: {0}")]
    Failed(String),
}

/// Trait for turning raw file bytes into extracted text.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Extracts text from the given raw bytes.
    async fn extract(&self, data: &[u8]) -> Result<String, ExtractError>;
}

/// Extractor for plain-text documents.
///
/// Decodes strictly as UTF-8; anything else is rejected rather than
/// silently mangled.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    /// Creates a new plain-text extractor.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentExtractor for PlainTextExtractor {
    async fn extract(&self, data: &[u8]) -> Result<String, ExtractError> {
        let text = std::str::from_utf8(data)
            .map_err(|err| ExtractError::Unsupported(err.to_string()))?;

        Ok(text.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn extracts_utf8() {
        let text = PlainTextExtractor::new().extract(b"meeting notes").await.unwrap();
        assert_eq!(text, "meeting notes");
    }

    #[tokio::test]
    async fn rejects_invalid_utf8() {
        let err = PlainTextExtractor::new()
            .extract(&[0xff, 0xfe, 0x00])
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractError::Unsupported(_)));
    }
}
