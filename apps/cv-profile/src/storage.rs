//! Persistence seam for uploaded CVs.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::errors::StorageError;
use crate::models::StoredDocument;

/// Where uploaded documents are kept. Extractors read the stored file by path, so a
/// backend must hand back a `StoredDocument` that points at a readable local file.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persists `bytes` under `filename`, replacing any earlier file of the same name.
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<StoredDocument, StorageError>;

    /// Raw bytes of a previously stored document.
    async fn open(&self, document: &StoredDocument) -> Result<Vec<u8>, StorageError>;
}

/// Stores uploads as plain files in one directory.
#[derive(Debug, Clone)]
pub struct LocalDiskStore {
    root: PathBuf,
}

impl LocalDiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl DocumentStore for LocalDiskStore {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<StoredDocument, StorageError> {
        let name = sanitize_filename(filename)?;
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(name);
        tokio::fs::write(&path, bytes).await?;
        info!("Stored upload {} ({} bytes)", path.display(), bytes.len());
        Ok(StoredDocument::new(path))
    }

    async fn open(&self, document: &StoredDocument) -> Result<Vec<u8>, StorageError> {
        Ok(tokio::fs::read(document.path()).await?)
    }
}

/// Keeps only the final path component of a client-supplied filename.
pub fn sanitize_filename(filename: &str) -> Result<&str, StorageError> {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() || name == "." || name == ".." {
        return Err(StorageError::InvalidFilename(filename.to_string()));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_filename("../../etc/cv.pdf").unwrap(), "cv.pdf");
        assert_eq!(sanitize_filename("C:\\Users\\me\\cv.docx").unwrap(), "cv.docx");
        assert_eq!(sanitize_filename("cv.pdf").unwrap(), "cv.pdf");
    }

    #[test]
    fn test_sanitize_rejects_empty_names() {
        assert!(sanitize_filename("").is_err());
        assert!(sanitize_filename("uploads/").is_err());
        assert!(sanitize_filename("..").is_err());
    }

    #[tokio::test]
    async fn test_save_creates_root_and_round_trips() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = LocalDiskStore::new(tmp.path().join("uploads"));
        let doc = store.save("cv.pdf", b"%PDF-1.4").await.unwrap();
        assert_eq!(doc.path(), store.root().join("cv.pdf"));
        assert!(doc.is_pdf());
        assert_eq!(store.open(&doc).await.unwrap(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_save_overwrites_same_name() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = LocalDiskStore::new(tmp.path());
        store.save("cv.docx", b"first").await.unwrap();
        let doc = store.save("cv.docx", b"second").await.unwrap();
        assert_eq!(store.open(&doc).await.unwrap(), b"second");
    }
}
