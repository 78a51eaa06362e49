use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const DEFAULT_UPLOAD_FOLDER: &str = "uploads/";
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];

/// Upload configuration, built once at start-up and passed to whatever needs it.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub upload_dir: PathBuf,
    /// Destination for harvested profile photos. Defaults to `upload_dir`.
    pub photo_dir: PathBuf,
    /// Lower-case extensions without the leading dot.
    pub allowed_extensions: Vec<String>,
    /// Max embedded images examined per PDF. `None` scans the whole document.
    pub photo_scan_limit: Option<usize>,
    /// `EnvFilter` directives handed to `telemetry::init_tracing`.
    pub rust_log: String,
}

impl UploadConfig {
    /// Config rooted at `upload_dir` with every other field at its default.
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        let upload_dir = upload_dir.into();
        Self {
            photo_dir: upload_dir.clone(),
            upload_dir,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            photo_scan_limit: None,
            rust_log: format!("{}=info", env!("CARGO_CRATE_NAME")),
        }
    }

    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let upload_dir = std::env::var("UPLOAD_FOLDER")
            .unwrap_or_else(|_| DEFAULT_UPLOAD_FOLDER.to_string());
        let mut config = Self::new(upload_dir);

        if let Ok(dir) = std::env::var("PROFILE_PHOTO_FOLDER") {
            config.photo_dir = PathBuf::from(dir);
        }
        if let Ok(list) = std::env::var("ALLOWED_EXTENSIONS") {
            config.allowed_extensions = parse_extension_list(&list);
        }
        if let Ok(limit) = std::env::var("PHOTO_SCAN_LIMIT") {
            config.photo_scan_limit = Some(
                limit
                    .trim()
                    .parse::<usize>()
                    .context("PHOTO_SCAN_LIMIT must be a non-negative integer")?,
            );
        }
        if let Ok(filter) = std::env::var("RUST_LOG") {
            config.rust_log = filter;
        }
        Ok(config)
    }

    /// True if `filename` has an extension and it is on the allow-list (case-insensitive).
    pub fn is_allowed(&self, filename: &str) -> bool {
        match filename.rsplit_once('.') {
            Some((_, ext)) => {
                let ext = ext.to_lowercase();
                self.allowed_extensions.iter().any(|allowed| *allowed == ext)
            }
            None => false,
        }
    }

    /// Creates the upload and photo directories if they do not exist yet.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        create_dir(&self.upload_dir)?;
        create_dir(&self.photo_dir)
    }
}

fn create_dir(dir: &Path) -> std::io::Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn parse_extension_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}
