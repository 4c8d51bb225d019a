#![warn(missing_docs)]
//! # feedback-files
//!
//! ## Purpose
//! Reads captured screenshots back as base64 text for the submission payload.
//!
//! ## Responsibilities
//! - Define the [`FileReader`] seam consumed by the form controller.
//! - Provide [`Base64FileReader`], which reads through `tokio::fs`.
//!
//! ## Error model
//! Missing, unreadable, or empty files return [`FileReadError`].

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use feedback_core::ScreenshotRef;
use thiserror::Error;
use tracing::debug;

/// Converts an image reference into an encoded payload string.
#[async_trait]
pub trait FileReader: Send + Sync {
    /// Reads the referenced file and returns its base64 encoding.
    async fn read_base64(&self, screenshot: &ScreenshotRef) -> Result<String, FileReadError>;
}

/// Standard-alphabet, padded base64 reader backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64FileReader;

impl Base64FileReader {
    /// Creates a reader.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileReader for Base64FileReader {
    async fn read_base64(&self, screenshot: &ScreenshotRef) -> Result<String, FileReadError> {
        let path = screenshot.path();
        let bytes = tokio::fs::read(path).await.map_err(|source| FileReadError::Io {
            path: path.display().to_string(),
            source,
        })?;

        if bytes.is_empty() {
            return Err(FileReadError::Empty(path.display().to_string()));
        }

        debug!(path = %path.display(), bytes = bytes.len(), "screenshot read");
        Ok(STANDARD.encode(bytes))
    }
}

/// Errors produced while reading a screenshot reference.
#[derive(Debug, Error)]
pub enum FileReadError {
    /// File could not be opened or read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
    /// File exists but holds no bytes.
    #[error("screenshot file is empty: {0}")]
    Empty(String),
}
