use std::path::PathBuf;

use bytes::Bytes;
use tracing::{info, warn};

use crate::config::UploadConfig;
use crate::errors::UploadError;
use crate::extraction::{extract_text, Extraction, PhotoHarvester};
use crate::models::{PersistedPhoto, ProfileDraft, StoredDocument};
use crate::sections::{split_sections, SectionMap};
use crate::storage::DocumentStore;

pub const NOTICE_NO_PHOTO: &str = "We could not extract a profile photo from your CV.";
pub const NOTICE_NO_TEXT: &str = "We could not read any text from your CV.";

/// Turns an uploaded CV into a pre-filled profile draft.
pub struct UploadPipeline<S> {
    config: UploadConfig,
    store: S,
}

/// What the blocking extraction step hands back to the async side.
struct ExtractedProfile {
    sections: SectionMap,
    photo: Option<PersistedPhoto>,
    photo_attempted: bool,
    text_found: bool,
}

impl<S: DocumentStore> UploadPipeline<S> {
    pub fn new(config: UploadConfig, store: S) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Validates, stores and extracts one upload.
    ///
    /// Only an empty filename, a disallowed extension or a storage failure is an error.
    /// Unreadable content degrades to an emptier draft with a notice.
    pub async fn process(&self, filename: &str, bytes: Bytes) -> Result<ProfileDraft, UploadError> {
        if filename.trim().is_empty() {
            return Err(UploadError::NoSelectedFile);
        }
        if !self.config.is_allowed(filename) {
            let ext = filename
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_string())
                .unwrap_or_default();
            return Err(UploadError::InvalidFormat(ext));
        }

        let document = self.store.save(filename, &bytes).await?;
        info!("Processing uploaded CV {}", document.path().display());

        let harvester = PhotoHarvester::with_limit(self.config.photo_scan_limit);
        let photo_dir = self.config.photo_dir.clone();
        let doc = document.clone();
        let extracted =
            tokio::task::spawn_blocking(move || extract_profile(&doc, &harvester, photo_dir))
                .await?;

        let mut notices = Vec::new();
        if extracted.photo_attempted && extracted.photo.is_none() {
            notices.push(NOTICE_NO_PHOTO.to_string());
        }
        if !extracted.text_found {
            notices.push(NOTICE_NO_TEXT.to_string());
        }

        let source_filename = document
            .path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(ProfileDraft {
            source_filename,
            sections: extracted.sections,
            photo_filename: extracted.photo.map(|photo| photo.filename),
            notices,
        })
    }
}

/// CPU/IO-bound part of the upload. Runs on a blocking worker.
fn extract_profile(
    document: &StoredDocument,
    harvester: &PhotoHarvester,
    photo_dir: PathBuf,
) -> ExtractedProfile {
    let photo_attempted = document.is_pdf();
    let photo = if photo_attempted {
        if let Err(e) = std::fs::create_dir_all(&photo_dir) {
            warn!("Could not create photo directory {}: {e}", photo_dir.display());
        }
        harvester.harvest(document, &photo_dir).into_option()
    } else {
        None
    };

    let (sections, text_found) = match extract_text(document) {
        Extraction::Found(text) => (split_sections(&text), true),
        Extraction::Empty | Extraction::Failed(_) => (SectionMap::default(), false),
    };

    ExtractedProfile {
        sections,
        photo,
        photo_attempted,
        text_found,
    }
}
