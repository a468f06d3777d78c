//! Content extraction: decode an upload to text and bound its length.
//!
//! Plain text is decoded as UTF-8 (lossy, so a stray Latin-1 byte does not
//! reject an otherwise readable paper). PDFs go through pdfium's text layer.
//! pdfium is not async-safe, so PDF decoding runs in `spawn_blocking`.
//!
//! Truncation keeps the prefix of the text and counts characters, not tokens
//! or bytes, so it never splits a multi-byte code point.

use crate::error::StudyPlanError;
use crate::pipeline::validate::{DocumentKind, UploadedDocument};
use pdfium_render::prelude::*;
use tracing::debug;

/// Decode the upload's bytes into text according to its kind.
pub async fn extract_text(
    doc: &UploadedDocument,
    kind: DocumentKind,
) -> Result<String, StudyPlanError> {
    match kind {
        DocumentKind::PlainText => Ok(String::from_utf8_lossy(&doc.raw_bytes).into_owned()),
        DocumentKind::Pdf => {
            let name = doc.name.clone();
            let bytes = doc.raw_bytes.clone();
            tokio::task::spawn_blocking(move || extract_pdf_text_blocking(&name, &bytes))
                .await
                .map_err(|e| StudyPlanError::Internal(format!("PDF text task panicked: {}", e)))?
        }
    }
}

/// Keep at most `max_chars` characters from the start of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Bind pdfium, preferring an explicit `PDFIUM_LIB_PATH` over the system
/// library search path.
fn bind_pdfium() -> Result<Pdfium, PdfiumError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(path) if !path.is_empty() => Pdfium::bind_to_library(path)?,
        _ => Pdfium::bind_to_system_library()?,
    };
    Ok(Pdfium::new(bindings))
}

/// Blocking implementation of PDF text extraction.
fn extract_pdf_text_blocking(name: &str, bytes: &[u8]) -> Result<String, StudyPlanError> {
    let pdfium = bind_pdfium().map_err(|e| {
        StudyPlanError::Internal(format!("Failed to bind to pdfium library: {:?}", e))
    })?;

    let document = pdfium.load_pdf_from_byte_slice(bytes, None).map_err(|e| {
        StudyPlanError::UnreadableDocument {
            name: name.to_string(),
            detail: format!("{:?}", e),
        }
    })?;

    let mut pages = Vec::new();
    for (idx, page) in document.pages().iter().enumerate() {
        let text = page
            .text()
            .map_err(|e| StudyPlanError::UnreadableDocument {
                name: name.to_string(),
                detail: format!("page {}: {:?}", idx + 1, e),
            })?
            .all();
        pages.push(text);
    }

    debug!("Extracted text from {} PDF pages of '{}'", pages.len(), name);
    Ok(pages.join("\n\n"))
}
