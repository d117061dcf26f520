//! Content Extractor — turns an uploaded PDF into the inline-data part the model expects.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

/// The only media type sent to the model.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// A file received from the upload form. Lives for one request only.
#[derive(Debug)]
pub struct UploadedDocument {
    pub content: Bytes,
    pub media_type: String,
    pub file_name: Option<String>,
}

impl UploadedDocument {
    /// Accepts a declared PDF content type or a `.pdf` file name.
    pub fn is_pdf(&self) -> bool {
        let declared = self
            .media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .eq_ignore_ascii_case(PDF_MIME_TYPE);
        let named = self
            .file_name
            .as_deref()
            .is_some_and(|n| n.to_ascii_lowercase().ends_with(".pdf"));
        declared || named
    }
}

/// Base64-encoded document, serialized as Gemini `inline_data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedDocumentPart {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Error)]
#[error("No file uploaded")]
pub struct MissingDocument;

/// Encodes the whole document with standard base64.
///
/// Takes the document by value: it cannot be read twice. The bytes are not
/// checked for PDF structure; unreadable or encrypted files are rejected by
/// the model.
pub fn extract(document: Option<UploadedDocument>) -> Result<EncodedDocumentPart, MissingDocument> {
    let document = document.ok_or(MissingDocument)?;
    Ok(EncodedDocumentPart {
        mime_type: PDF_MIME_TYPE.to_string(),
        data: STANDARD.encode(&document.content),
    })
}
