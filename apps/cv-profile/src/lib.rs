//! # cv-profile
//!
//! Turns an uploaded CV (PDF, DOC, DOCX) into a pre-filled profile draft: the document's
//! plain text split into heading sections, plus a profile photo pulled out of PDF CVs.
//!
//! ```text
//! upload ──▶ allow-list ──▶ DocumentStore::save ──▶ spawn_blocking {
//!                                                      harvest (PDF only)
//!                                                      extract_text
//!                                                      split_sections
//!                                                   } ──▶ ProfileDraft
//! ```
//!
//! Extraction is best-effort. Unreadable documents and missing photos show up as
//! [`extraction::Extraction::Empty`] / [`extraction::Extraction::Failed`] and a user-facing
//! notice on the draft, never as an upload error.
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use cv_profile::{telemetry, LocalDiskStore, UploadConfig, UploadPipeline};
//!
//! let config = UploadConfig::from_env()?;
//! telemetry::init_tracing(&config)?;
//! config.ensure_dirs()?;
//! let store = LocalDiskStore::new(&config.upload_dir);
//! let _pipeline = UploadPipeline::new(config, store);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod extraction;
pub mod models;
pub mod sections;
pub mod storage;
pub mod telemetry;
pub mod upload;

pub use config::UploadConfig;
pub use errors::{ExtractError, StorageError, UploadError};
pub use extraction::{extract_text, harvest, Extraction, PhotoHarvester};
pub use models::{DocumentKind, PersistedPhoto, ProfileDraft, StoredDocument};
pub use sections::{split_sections, SectionMap};
pub use storage::{DocumentStore, LocalDiskStore};
pub use upload::UploadPipeline;
