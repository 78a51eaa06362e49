//! Best-effort content extraction from stored CVs.
//!
//! Every extractor reports an [`Extraction`] instead of a `Result`: a document that
//! cannot be read degrades to `Failed` (logged here, at the boundary) and the upload
//! carries on without that piece of the profile.

pub mod pdf_text;
pub mod photo;
pub mod word;

use tracing::warn;

use crate::errors::ExtractError;
use crate::models::{DocumentKind, StoredDocument};

pub use photo::{harvest, PhotoHarvester};

/// Outcome of a best-effort extraction.
#[derive(Debug)]
pub enum Extraction<T> {
    /// The extractor produced a value.
    Found(T),
    /// The document was read cleanly but held nothing to extract.
    Empty,
    /// The document could not be opened or parsed.
    Failed(ExtractError),
}

impl<T> Extraction<T> {
    /// Collapses `Empty` and `Failed` into `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Extraction::Found(value) => Some(value),
            Extraction::Empty | Extraction::Failed(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Extraction::Found(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Extraction::Failed(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Extraction<U> {
        match self {
            Extraction::Found(value) => Extraction::Found(f(value)),
            Extraction::Empty => Extraction::Empty,
            Extraction::Failed(e) => Extraction::Failed(e),
        }
    }
}

/// Plain text of a stored CV.
///
/// PDF pages are concatenated in order with no separator; DOC/DOCX paragraphs are each
/// followed by a newline. Other kinds yield `Empty`.
pub fn extract_text(document: &StoredDocument) -> Extraction<String> {
    let result = match document.kind() {
        DocumentKind::Pdf => pdf_text::extract_pdf_text(document.path()),
        DocumentKind::Doc | DocumentKind::Docx => word::extract_paragraph_text(document.path()),
        DocumentKind::Other => return Extraction::Empty,
    };

    match result {
        Ok(text) if text.is_empty() => Extraction::Empty,
        Ok(text) => Extraction::Found(text),
        Err(e) => {
            warn!(
                "Text extraction failed for {}: {e}",
                document.path().display()
            );
            Extraction::Failed(e)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{docx, paragraph, pdf, PageFixture};
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> StoredDocument {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        StoredDocument::new(path)
    }

    #[test]
    fn test_docx_paragraphs_each_end_with_newline() {
        let tmp = tempfile::TempDir::new().unwrap();
        let body = format!("{}{}", paragraph("EDUCATION"), paragraph("BSc CS"));
        let doc = write(&tmp, "cv.docx", &docx(&body));
        let text = extract_text(&doc).into_option().unwrap();
        assert_eq!(text, "EDUCATION\nBSc CS\n");
    }

    #[test]
    fn test_pdf_text_is_found() {
        let tmp = tempfile::TempDir::new().unwrap();
        let doc = write(&tmp, "cv.pdf", &pdf(vec![PageFixture::text("Jane Doe")], false));
        let text = extract_text(&doc).into_option().unwrap();
        assert!(text.contains("Jane Doe"), "got {text:?}");
    }

    #[test]
    fn test_corrupt_pdf_is_failed_not_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let doc = write(&tmp, "cv.pdf", b"not a pdf at all");
        let outcome = extract_text(&doc);
        assert!(outcome.is_failed());
        assert!(outcome.into_option().is_none());
    }

    #[test]
    fn test_legacy_doc_binary_is_failed() {
        let tmp = tempfile::TempDir::new().unwrap();
        // OLE2 compound file signature, not a ZIP package
        let doc = write(&tmp, "cv.doc", &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]);
        assert!(extract_text(&doc).is_failed());
    }

    #[test]
    fn test_missing_file_is_failed() {
        let doc = StoredDocument::new("/definitely/not/here/cv.docx");
        assert!(matches!(
            extract_text(&doc),
            Extraction::Failed(ExtractError::Io(_))
        ));
    }

    #[test]
    fn test_other_kind_is_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        let doc = write(&tmp, "cv.txt", b"plain text");
        assert!(matches!(extract_text(&doc), Extraction::Empty));
    }

    #[test]
    fn test_docx_without_paragraphs_is_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        let doc = write(&tmp, "cv.docx", &docx(""));
        assert!(matches!(extract_text(&doc), Extraction::Empty));
    }

    #[test]
    fn test_map_keeps_variant() {
        let found: Extraction<u32> = Extraction::Found(2);
        assert_eq!(found.map(|n| n * 2).into_option(), Some(4));
        let empty: Extraction<u32> = Extraction::Empty;
        assert!(!empty.map(|n| n * 2).is_found());
    }
}
