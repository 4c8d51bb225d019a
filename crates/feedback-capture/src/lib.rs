#![warn(missing_docs)]
//! # feedback-capture
//!
//! ## Purpose
//! Provides the screenshot capture seam used by the feedback form.
//!
//! ## Responsibilities
//! - Define a backend-agnostic [`ScreenshotService`] trait.
//! - Validate capture configuration (format and quality factor).
//! - Encode captured pixels to JPEG/PNG files in a capture directory.
//! - Expose real screen capture on supported platforms, image-file import
//!   everywhere, and deterministic synthetic capture for CI and unit tests.
//!
//! ## Data flow
//! Controller requests a capture -> backend acquires pixels -> pixels are encoded
//! to a file -> a [`ScreenshotRef`] pointing at the file is returned.
//!
//! ## Ownership and lifetimes
//! Pixel buffers are owned by the backend for the duration of one call. Only
//! the file path escapes, wrapped in an owned [`ScreenshotRef`].
//!
//! ## Error model
//! Invalid quality, unreadable sources, encoder and platform failures are
//! reported as [`CaptureError`] values. Callers decide whether to swallow them.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use feedback_core::{ImageFormat, ScreenshotRef};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, Rgb, RgbImage};
use thiserror::Error;
use tracing::debug;

/// Default capture quality factor.
pub const DEFAULT_CAPTURE_QUALITY: f32 = 0.8;

/// Capture configuration passed with every capture request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureConfig {
    /// Output raster format.
    pub format: ImageFormat,
    /// Quality factor in `(0.0, 1.0]`; only JPEG honors it.
    pub quality: f32,
}

impl CaptureConfig {
    /// Creates validated capture configuration.
    ///
    /// # Errors
    /// Returns [`CaptureError::InvalidQuality`] when `quality` is not a finite
    /// value in `(0.0, 1.0]`.
    pub fn new(format: ImageFormat, quality: f32) -> Result<Self, CaptureError> {
        if !quality.is_finite() || quality <= 0.0 || quality > 1.0 {
            return Err(CaptureError::InvalidQuality(quality));
        }
        Ok(Self { format, quality })
    }

    /// Maps the quality factor onto the JPEG encoder's 1..=100 scale.
    pub fn jpeg_quality(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            format: ImageFormat::Jpg,
            quality: DEFAULT_CAPTURE_QUALITY,
        }
    }
}

/// Trait implemented by concrete capture providers.
#[async_trait]
pub trait ScreenshotService: Send + Sync {
    /// Captures one image and returns a handle to it.
    ///
    /// Each call produces a new file; earlier references stay readable.
    async fn capture(&self, config: &CaptureConfig) -> Result<ScreenshotRef, CaptureError>;
}

/// Returns the default directory captured files are written to.
pub fn default_capture_dir() -> PathBuf {
    std::env::temp_dir().join("feedback-captures")
}

/// Encodes `image` into a new file under `output_dir`.
///
/// # Errors
/// Returns [`CaptureError::Io`] when the directory or file cannot be created
/// and [`CaptureError::Encode`] when the encoder rejects the image. A file
/// left half-written by a failed encode is removed.
pub fn write_capture(
    image: &DynamicImage,
    config: &CaptureConfig,
    output_dir: &Path,
) -> Result<ScreenshotRef, CaptureError> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!(
        "capture-{}.{}",
        uuid::Uuid::new_v4(),
        config.format.extension()
    ));

    if let Err(error) = encode_to_file(image, config, &path) {
        // Never leave a partial capture behind.
        if let Err(cleanup) = fs::remove_file(&path) {
            debug!(path = %path.display(), %cleanup, "partial capture not removed");
        }
        return Err(error);
    }

    debug!(path = %path.display(), format = ?config.format, "capture written");
    Ok(ScreenshotRef::new(path, config.format))
}

fn encode_to_file(
    image: &DynamicImage,
    config: &CaptureConfig,
    path: &Path,
) -> Result<(), CaptureError> {
    let mut writer = BufWriter::new(File::create(path)?);
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    let encoded = match config.format {
        ImageFormat::Jpg => {
            let encoder = JpegEncoder::new_with_quality(&mut writer, config.jpeg_quality());
            rgb.write_with_encoder(encoder)
        }
        ImageFormat::Png => rgb.write_with_encoder(PngEncoder::new(&mut writer)),
    };
    encoded.map_err(|error| CaptureError::Encode(error.to_string()))?;
    writer.flush()?;
    Ok(())
}

async fn encode_off_thread(
    image: DynamicImage,
    config: CaptureConfig,
    output_dir: PathBuf,
) -> Result<ScreenshotRef, CaptureError> {
    tokio::task::spawn_blocking(move || write_capture(&image, &config, &output_dir))
        .await
        .map_err(|error| CaptureError::Backend(format!("encoder task failed: {error}")))?
}

/// Imports an existing image file as the screenshot.
///
/// The source is decoded and re-encoded with the requested format/quality so
/// the result is indistinguishable from a screen grab.
#[derive(Debug, Clone)]
pub struct ImageFileCapture {
    source: PathBuf,
    output_dir: PathBuf,
}

impl ImageFileCapture {
    /// Creates an importer for `source`, writing into `output_dir`.
    pub fn new(source: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl ScreenshotService for ImageFileCapture {
    async fn capture(&self, config: &CaptureConfig) -> Result<ScreenshotRef, CaptureError> {
        let source = self.source.clone();
        let image = tokio::task::spawn_blocking(move || image::open(&source))
            .await
            .map_err(|error| CaptureError::Backend(format!("decoder task failed: {error}")))?
            .map_err(|error| {
                CaptureError::Source(format!("{}: {error}", self.source.display()))
            })?;

        encode_off_thread(image, *config, self.output_dir.clone()).await
    }
}

/// Real display capture backend for supported desktop targets.
///
/// Grabs the primary display on every call.
#[derive(Debug, Clone)]
pub struct ScreenCapture {
    output_dir: PathBuf,
}

impl ScreenCapture {
    /// Creates a screen capture backend writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl ScreenshotService for ScreenCapture {
    async fn capture(&self, config: &CaptureConfig) -> Result<ScreenshotRef, CaptureError> {
        let image = tokio::task::spawn_blocking(grab_primary_display)
            .await
            .map_err(|error| CaptureError::Backend(format!("capture task failed: {error}")))??;

        encode_off_thread(image, *config, self.output_dir.clone()).await
    }
}

#[cfg(windows)]
fn grab_primary_display() -> Result<DynamicImage, CaptureError> {
    use screenshots::Screen;

    let screens = Screen::all()
        .map_err(|error| CaptureError::Backend(format!("screen enumeration failed: {error}")))?;
    let screen = screens
        .iter()
        .find(|screen| screen.display_info.is_primary)
        .or_else(|| screens.first())
        .ok_or_else(|| CaptureError::Backend("no displays were reported by the OS".to_string()))?;

    let captured = screen
        .capture()
        .map_err(|error| CaptureError::Backend(format!("screen capture failed: {error}")))?;
    let width = captured.width();
    let height = captured.height();
    let rgba = image::RgbaImage::from_raw(width, height, captured.into_raw())
        .ok_or_else(|| CaptureError::Backend("captured buffer has wrong length".to_string()))?;

    Ok(DynamicImage::ImageRgba8(rgba))
}

#[cfg(not(windows))]
fn grab_primary_display() -> Result<DynamicImage, CaptureError> {
    Err(CaptureError::Backend(
        "screen capture is currently implemented for Windows only".to_string(),
    ))
}

/// Deterministic synthetic backend for test and CI usage.
///
/// Each capture writes a small solid-color image whose shade advances with
/// every call.
#[derive(Debug)]
pub struct SyntheticCapture {
    output_dir: PathBuf,
    width: u32,
    height: u32,
    sequence: AtomicU64,
}

impl SyntheticCapture {
    /// Creates a synthetic backend producing 8x8 images in `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_size(output_dir, 8, 8)
    }

    /// Creates a synthetic backend with caller-provided image size.
    pub fn with_size(output_dir: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            output_dir: output_dir.into(),
            width: width.max(1),
            height: height.max(1),
            sequence: AtomicU64::new(0),
        }
    }

    /// Number of captures produced so far.
    pub fn captures(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScreenshotService for SyntheticCapture {
    async fn capture(&self, config: &CaptureConfig) -> Result<ScreenshotRef, CaptureError> {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let shade = (sequence % 255) as u8;
        let image = RgbImage::from_pixel(self.width, self.height, Rgb([shade, 0, 255 - shade]));

        encode_off_thread(
            DynamicImage::ImageRgb8(image),
            *config,
            self.output_dir.clone(),
        )
        .await
    }
}

/// Capture layer error type.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Quality factor outside `(0.0, 1.0]`.
    #[error("invalid capture quality {0}: must be in (0.0, 1.0]")]
    InvalidQuality(f32),
    /// Source image could not be opened or decoded.
    #[error("capture source unreadable: {0}")]
    Source(String),
    /// Encoder rejected the image.
    #[error("capture encoding failed: {0}")]
    Encode(String),
    /// Filesystem failure writing the capture.
    #[error("capture i/o failure: {0}")]
    Io(#[from] std::io::Error),
    /// Platform/backend runtime failure.
    #[error("capture backend failure: {0}")]
    Backend(String),
}
