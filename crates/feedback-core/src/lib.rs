#![warn(missing_docs)]
//! # feedback-core
//!
//! ## Purpose
//! Defines the pure data model shared by the feedback form workspace.
//!
//! ## Responsibilities
//! - Enumerate feedback types and their static title/image table.
//! - Represent opaque screenshot references produced by capture backends.
//! - Build the `POST /feedbacks` request body, including the screenshot data URI.
//! - Provide a read-only snapshot of form state for display projection.
//!
//! ## Data flow
//! Capture code emits a [`ScreenshotRef`]. On submit the controller reads it into
//! base64, attaches it to a [`FeedbackPayload`] and hands the payload to the
//! submission client.
//!
//! ## Error model
//! Parsing failures and empty screenshot data return [`CoreError`] variants.
//!
//! ## Security and privacy notes
//! Comment text and screenshot bytes are user content. Nothing in this crate
//! logs them; callers should log lengths only.
//!
//! ## Example
//! ```rust
//! use feedback_core::{FeedbackPayload, FeedbackType};
//!
//! let payload = FeedbackPayload::new(FeedbackType::Bug, "App crashes on save");
//! let json = String::from_utf8(payload.to_json_bytes().unwrap()).unwrap();
//! assert_eq!(json, r#"{"type":"BUG","comment":"App crashes on save"}"#);
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Feedback category chosen by the user before the form is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FeedbackType {
    /// Something is broken.
    Bug,
    /// Feature suggestion.
    Idea,
    /// Anything else.
    Other,
}

impl FeedbackType {
    /// All feedback types in display order.
    pub const ALL: [FeedbackType; 3] = [FeedbackType::Bug, FeedbackType::Idea, FeedbackType::Other];

    /// Returns the wire tag sent in the `type` field.
    pub fn as_tag(&self) -> &'static str {
        match self {
            FeedbackType::Bug => "BUG",
            FeedbackType::Idea => "IDEA",
            FeedbackType::Other => "OTHER",
        }
    }
}

impl fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl FromStr for FeedbackType {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "BUG" => Ok(FeedbackType::Bug),
            "IDEA" => Ok(FeedbackType::Idea),
            "OTHER" => Ok(FeedbackType::Other),
            _ => Err(CoreError::UnknownFeedbackType(raw.to_string())),
        }
    }
}

/// Display metadata for one feedback type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackTypeInfo {
    /// Title shown in the form header.
    pub title: &'static str,
    /// Image asset shown next to the title.
    pub image: &'static str,
}

const BUG_INFO: FeedbackTypeInfo = FeedbackTypeInfo {
    title: "Problem",
    image: "bug.png",
};
const IDEA_INFO: FeedbackTypeInfo = FeedbackTypeInfo {
    title: "Idea",
    image: "idea.png",
};
const OTHER_INFO: FeedbackTypeInfo = FeedbackTypeInfo {
    title: "Other",
    image: "thought.png",
};

/// Looks up the static title/image entry for a feedback type.
pub fn feedback_type_info(kind: FeedbackType) -> &'static FeedbackTypeInfo {
    match kind {
        FeedbackType::Bug => &BUG_INFO,
        FeedbackType::Idea => &IDEA_INFO,
        FeedbackType::Other => &OTHER_INFO,
    }
}

/// Raster format a screenshot was encoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Lossy JPEG; honors the capture quality factor.
    #[serde(alias = "jpeg")]
    Jpg,
    /// Lossless PNG; quality factor is ignored.
    Png,
}

impl ImageFormat {
    /// MIME type used in the screenshot data URI.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }

    /// File extension used for captured files.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpg => "jpg",
            ImageFormat::Png => "png",
        }
    }
}

impl FromStr for ImageFormat {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(ImageFormat::Jpg),
            "png" => Ok(ImageFormat::Png),
            _ => Err(CoreError::UnknownImageFormat(raw.to_string())),
        }
    }
}

/// Opaque handle to a captured image.
///
/// Valid for reading only within the session that produced it; the backing
/// file lives in a temporary capture directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotRef {
    path: PathBuf,
    format: ImageFormat,
}

impl ScreenshotRef {
    /// Wraps a captured file location.
    pub fn new(path: impl Into<PathBuf>, format: ImageFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Location of the captured file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encoding of the captured file.
    pub fn format(&self) -> ImageFormat {
        self.format
    }
}

/// Builds the `data:` URI embedded in the payload `screenshot` field.
///
/// # Errors
/// Returns [`CoreError::EmptyScreenshotData`] when `base64` is blank, so a
/// payload never carries an empty placeholder image.
pub fn screenshot_data_uri(format: ImageFormat, base64: &str) -> Result<String, CoreError> {
    if base64.trim().is_empty() {
        return Err(CoreError::EmptyScreenshotData);
    }

    Ok(format!("data:{};base64,{}", format.mime_type(), base64))
}

/// JSON body of `POST /feedbacks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackPayload {
    /// Feedback type tag.
    #[serde(rename = "type")]
    pub kind: FeedbackType,
    /// Free-form comment; may be empty.
    pub comment: String,
    /// Screenshot data URI. The key is omitted entirely when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
}

impl FeedbackPayload {
    /// Creates a payload without a screenshot.
    pub fn new(kind: FeedbackType, comment: impl Into<String>) -> Self {
        Self {
            kind,
            comment: comment.into(),
            screenshot: None,
        }
    }

    /// Attaches base64 screenshot data as a data URI.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyScreenshotData`] when `base64` is blank.
    pub fn with_screenshot(mut self, format: ImageFormat, base64: &str) -> Result<Self, CoreError> {
        self.screenshot = Some(screenshot_data_uri(format, base64)?);
        Ok(self)
    }

    /// Serializes payload to compact JSON bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] when JSON serialization fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, CoreError> {
        serde_json::to_vec(self).map_err(CoreError::Codec)
    }

    /// Deserializes payload from JSON bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] when JSON decoding fails.
    pub fn from_json_bytes(raw: &[u8]) -> Result<Self, CoreError> {
        serde_json::from_slice(raw).map_err(CoreError::Codec)
    }
}

/// Read-only copy of form state used by the display surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSnapshot {
    /// Feedback type the form was opened with.
    pub feedback_type: FeedbackType,
    /// Current comment text.
    pub comment: String,
    /// Currently attached screenshot.
    pub screenshot: Option<ScreenshotRef>,
    /// Whether a submission is in flight.
    pub is_sending: bool,
}

/// Error type for data model parsing and payload construction.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Feedback type tag is not one of `BUG`, `IDEA`, `OTHER`.
    #[error("unknown feedback type: {0}")]
    UnknownFeedbackType(String),
    /// Image format is not `jpg` or `png`.
    #[error("unknown image format: {0}")]
    UnknownImageFormat(String),
    /// Screenshot was present but encoded to an empty string.
    #[error("screenshot data is empty")]
    EmptyScreenshotData,
    /// JSON encoding/decoding error.
    #[error("payload codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}
