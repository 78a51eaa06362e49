use thiserror::Error;

/// Why a document could not be read. Never crosses a component boundary as `Err`;
/// it is carried inside `Extraction::Failed` and logged where it is produced.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("OOXML error: {0}")]
    Ooxml(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),
}

/// Errors raised by a `DocumentStore` backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),
}

/// Errors that stop an upload before a profile draft can be built.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No selected file")]
    NoSelectedFile,

    #[error("Extension not allowed: {0}")]
    InvalidFormat(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Extraction worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl UploadError {
    /// Message suitable for showing to the visitor. Internal details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            UploadError::NoSelectedFile => "No selected file".to_string(),
            UploadError::InvalidFormat(_) => {
                "Invalid file format. Please upload a file in PDF, DOC, or DOCX format."
                    .to_string()
            }
            UploadError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                "Your CV could not be saved. Please try again.".to_string()
            }
            UploadError::Worker(e) => {
                tracing::error!("Extraction worker error: {e:?}");
                "An unexpected error occurred. Please try again.".to_string()
            }
        }
    }
}
