use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File kind derived from the stored file's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Doc,
    Docx,
    /// Anything the extractors do not understand. Extraction yields nothing for it.
    Other,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());
        match ext.as_deref() {
            Some("pdf") => DocumentKind::Pdf,
            Some("doc") => DocumentKind::Doc,
            Some("docx") => DocumentKind::Docx,
            _ => DocumentKind::Other,
        }
    }
}

/// Read-only reference to a file that has already been persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDocument {
    path: PathBuf,
    kind: DocumentKind,
}

impl StoredDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let kind = DocumentKind::from_path(&path);
        Self { path, kind }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn is_pdf(&self) -> bool {
        self.kind == DocumentKind::Pdf
    }

    /// File name without its final extension, e.g. `jane.cv` for `uploads/jane.cv.pdf`.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(StoredDocument::new("a/cv.pdf").kind(), DocumentKind::Pdf);
        assert_eq!(StoredDocument::new("a/cv.doc").kind(), DocumentKind::Doc);
        assert_eq!(StoredDocument::new("a/cv.docx").kind(), DocumentKind::Docx);
    }

    #[test]
    fn test_kind_ignores_extension_case() {
        assert_eq!(StoredDocument::new("CV.PDF").kind(), DocumentKind::Pdf);
    }

    #[test]
    fn test_unknown_or_missing_extension_is_other() {
        assert_eq!(StoredDocument::new("cv.txt").kind(), DocumentKind::Other);
        assert_eq!(StoredDocument::new("cv").kind(), DocumentKind::Other);
    }

    #[test]
    fn test_stem_strips_only_last_extension() {
        assert_eq!(StoredDocument::new("uploads/jane.cv.pdf").stem(), "jane.cv");
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&DocumentKind::Docx).unwrap();
        assert_eq!(json, r#""docx""#);
    }
}
