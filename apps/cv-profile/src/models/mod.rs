pub mod document;
pub mod profile;

pub use document::{DocumentKind, StoredDocument};
pub use profile::{PersistedPhoto, ProfileDraft};
