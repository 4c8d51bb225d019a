#![warn(missing_docs)]
//! # feedback-app
//!
//! ## Purpose
//! Orchestrates capture, file reading, submission, and display state for one
//! feedback form.
//!
//! ## Responsibilities
//! - Own form state and run the guarded submit sequence ([`FormController`]).
//! - Load configuration and install logging for the `feedback-form` binary.
//! - Wire concrete capture, reader, and HTTP adapters into a controller.
//!
//! ## Data flow
//! User input -> controller state -> capture/read/post through injected
//! services -> parent notified through [`FormEvents`].
//!
//! ## Ownership and lifetimes
//! The controller owns its state outright; services are shared `Arc<dyn _>`
//! handles so tests and the binary can substitute them.
//!
//! ## Error model
//! Capture and submission failures are logged and swallowed by the controller.
//! Only wiring problems (bad config, HTTP client setup) surface as [`AppError`].

pub mod config;
pub mod controller;
pub mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use feedback_capture::{ImageFileCapture, ScreenCapture, ScreenshotService};
use feedback_core::FeedbackType;
use feedback_files::Base64FileReader;
use feedback_upload::{UploadError, http_client};
use thiserror::Error;

pub use config::{AppConfig, ConfigError};
pub use controller::{CaptureOutcome, FormController, FormEvents, FormServices, SubmitOutcome};

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("FEEDBACK_FORM_VERSION");

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Picks the capture backend: import `source` when given, otherwise grab the
/// screen.
pub fn capture_backend(source: Option<PathBuf>, config: &AppConfig) -> Arc<dyn ScreenshotService> {
    match source {
        Some(source) => Arc::new(ImageFileCapture::new(source, config.capture_dir())),
        None => Arc::new(ScreenCapture::new(config.capture_dir())),
    }
}

/// Builds a controller posting over HTTP with the configured settings.
///
/// # Errors
/// Returns [`AppError`] when the capture config or HTTP client is invalid.
pub fn build_controller(
    config: &AppConfig,
    feedback_type: FeedbackType,
    capture: Arc<dyn ScreenshotService>,
    events: Arc<dyn FormEvents>,
) -> Result<FormController, AppError> {
    let client = http_client(&config.api.base_url, config.request_timeout())?;
    let services = FormServices {
        capture,
        reader: Arc::new(Base64FileReader::new()),
        client: Arc::new(client),
    };

    Ok(FormController::new(
        feedback_type,
        config.capture_config()?,
        services,
        events,
    ))
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// Submission client setup error.
    #[error("upload setup error: {0}")]
    Upload(#[from] UploadError),
}
