//! Input validation: presence, size ceiling and content type.
//!
//! Runs before any decoding so an oversized or unsupported upload never
//! costs more than a header inspection. The blank-content check needs the
//! decoded text and therefore lives in [`ensure_content`], called right after
//! extraction.

use crate::error::StudyPlanError;
use std::fmt;
use std::path::Path;

/// One uploaded file, owned by the request that received it.
#[derive(Clone)]
pub struct UploadedDocument {
    /// Client-supplied filename, e.g. `attention.pdf`.
    pub name: String,
    /// Content type declared by the client; may be empty.
    pub declared_mime_type: String,
    pub size_bytes: u64,
    pub raw_bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(
        name: impl Into<String>,
        declared_mime_type: impl Into<String>,
        raw_bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            declared_mime_type: declared_mime_type.into(),
            size_bytes: raw_bytes.len() as u64,
            raw_bytes,
        }
    }
}

impl fmt::Debug for UploadedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedDocument")
            .field("name", &self.name)
            .field("declared_mime_type", &self.declared_mime_type)
            .field("size_bytes", &self.size_bytes)
            .finish()
    }
}

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    /// Resolve the format from the declared content type, falling back to the
    /// file extension when the client sent no type or a generic binary one.
    pub fn detect(name: &str, declared_mime_type: &str) -> Option<Self> {
        let essence = declared_mime_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "application/pdf" => Some(DocumentKind::Pdf),
            "text/plain" => Some(DocumentKind::PlainText),
            "" | "application/octet-stream" => Self::from_extension(name),
            _ => None,
        }
    }

    fn from_extension(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "txt" => Some(DocumentKind::PlainText),
            _ => None,
        }
    }
}

/// Fail with `NoFile` when the request carried no upload.
pub fn require_upload(
    upload: Option<UploadedDocument>,
) -> Result<UploadedDocument, StudyPlanError> {
    upload.ok_or(StudyPlanError::NoFile)
}

/// Check the size ceiling and content type of an upload.
///
/// Size is checked first so an oversized file of any type gets `413`.
pub fn validate_upload(
    doc: &UploadedDocument,
    max_file_size: u64,
) -> Result<DocumentKind, StudyPlanError> {
    check_size(doc.size_bytes, max_file_size)?;
    DocumentKind::detect(&doc.name, &doc.declared_mime_type).ok_or_else(|| {
        StudyPlanError::InvalidMimeType {
            name: doc.name.clone(),
            mime: doc.declared_mime_type.clone(),
        }
    })
}

/// Fail with `FileTooLarge` when `size` exceeds `limit`.
pub fn check_size(size: u64, limit: u64) -> Result<(), StudyPlanError> {
    if size > limit {
        return Err(StudyPlanError::FileTooLarge { size, limit });
    }
    Ok(())
}

/// Fail with `EmptyContent` when the decoded text is blank.
pub fn ensure_content(name: &str, text: &str) -> Result<(), StudyPlanError> {
    if text.trim().is_empty() {
        return Err(StudyPlanError::EmptyContent {
            name: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: u64 = 10 * 1024 * 1024;

    #[test]
    fn missing_upload_is_no_file() {
        assert!(matches!(require_upload(None), Err(StudyPlanError::NoFile)));
    }

    #[test]
    fn size_ceiling_is_inclusive() {
        assert!(check_size(LIMIT, LIMIT).is_ok());
        assert!(matches!(
            check_size(LIMIT + 1, LIMIT),
            Err(StudyPlanError::FileTooLarge { size, limit }) if size == LIMIT + 1 && limit == LIMIT
        ));
    }

    #[test]
    fn oversized_file_wins_over_bad_type() {
        let mut doc = UploadedDocument::new("x.docx", "application/msword", vec![]);
        doc.size_bytes = LIMIT + 1;
        assert!(matches!(
            validate_upload(&doc, LIMIT),
            Err(StudyPlanError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn detect_from_declared_type() {
        assert_eq!(DocumentKind::detect("a", "application/pdf"), Some(DocumentKind::Pdf));
        assert_eq!(
            DocumentKind::detect("a", "text/plain; charset=utf-8"),
            Some(DocumentKind::PlainText)
        );
        assert_eq!(DocumentKind::detect("a", "TEXT/PLAIN"), Some(DocumentKind::PlainText));
        assert_eq!(DocumentKind::detect("a.pdf", "image/png"), None);
    }

    #[test]
    fn detect_falls_back_to_extension() {
        assert_eq!(DocumentKind::detect("paper.PDF", ""), Some(DocumentKind::Pdf));
        assert_eq!(
            DocumentKind::detect("notes.txt", "application/octet-stream"),
            Some(DocumentKind::PlainText)
        );
        assert_eq!(DocumentKind::detect("slides.pptx", ""), None);
        assert_eq!(DocumentKind::detect("noext", ""), None);
    }

    #[test]
    fn unsupported_type_is_rejected() {
        let doc = UploadedDocument::new("photo.png", "image/png", vec![1, 2, 3]);
        match validate_upload(&doc, LIMIT) {
            Err(StudyPlanError::InvalidMimeType { name, mime }) => {
                assert_eq!(name, "photo.png");
                assert_eq!(mime, "image/png");
            }
            other => panic!("expected InvalidMimeType, got {other:?}"),
        }
    }

    #[test]
    fn blank_content_is_rejected() {
        assert!(ensure_content("a.txt", "  \n\t ").is_err());
        assert!(ensure_content("a.txt", "").is_err());
        assert!(ensure_content("a.txt", " x ").is_ok());
    }

    #[test]
    fn debug_omits_raw_bytes() {
        let doc = UploadedDocument::new("a.txt", "text/plain", b"secret".to_vec());
        let s = format!("{doc:?}");
        assert!(s.contains("size_bytes: 6"));
        assert!(!s.contains("115")); // no byte dump
    }
}
