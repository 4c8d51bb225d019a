//! Shared fakes for controller integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use feedback_app::{FormController, FormEvents, FormServices};
use feedback_capture::{CaptureConfig, CaptureError, ScreenshotService};
use feedback_core::{FeedbackPayload, FeedbackType, ImageFormat, ScreenshotRef};
use feedback_files::{FileReadError, FileReader};
use feedback_upload::{SubmissionClient, SubmitReport, UploadError};
use tokio::sync::Notify;

/// Counts parent notifications.
#[derive(Default)]
pub struct RecordingEvents {
    pub sent: AtomicUsize,
    pub canceled: AtomicUsize,
}

impl RecordingEvents {
    pub fn sent_count(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }

    pub fn canceled_count(&self) -> usize {
        self.canceled.load(Ordering::SeqCst)
    }
}

impl FormEvents for RecordingEvents {
    fn on_feedback_canceled(&self) {
        self.canceled.fetch_add(1, Ordering::SeqCst);
    }

    fn on_feedback_sent(&self) {
        self.sent.fetch_add(1, Ordering::SeqCst);
    }
}

/// Submission client that records payloads and replays scripted results.
///
/// With a gate installed, every call waits for `gate.notify_one()` first.
#[derive(Default)]
pub struct FakeClient {
    pub payloads: Mutex<Vec<FeedbackPayload>>,
    pub script: Mutex<VecDeque<Result<u16, UploadError>>>,
    pub gate: Option<Arc<Notify>>,
}

impl FakeClient {
    pub fn scripted(results: Vec<Result<u16, UploadError>>) -> Self {
        Self {
            script: Mutex::new(results.into()),
            ..Self::default()
        }
    }

    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.payloads.lock().expect("payload lock").len()
    }

    pub fn last_payload(&self) -> FeedbackPayload {
        self.payloads
            .lock()
            .expect("payload lock")
            .last()
            .cloned()
            .expect("at least one payload should be recorded")
    }
}

#[async_trait]
impl SubmissionClient for FakeClient {
    async fn submit(&self, payload: &FeedbackPayload) -> Result<SubmitReport, UploadError> {
        self.payloads.lock().expect("payload lock").push(payload.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let next = self.script.lock().expect("script lock").pop_front();
        next.unwrap_or(Ok(201)).map(|status| SubmitReport {
            status,
            idempotency_key: "test-key".to_string(),
        })
    }
}

/// Reader returning a fixed encoding, or failing when `fail` is set.
pub struct FakeReader {
    pub encoded: String,
    pub fail: bool,
}

impl Default for FakeReader {
    fn default() -> Self {
        Self {
            encoded: "/9j/4AAQSkZJRg==".to_string(),
            fail: false,
        }
    }
}

#[async_trait]
impl FileReader for FakeReader {
    async fn read_base64(&self, screenshot: &ScreenshotRef) -> Result<String, FileReadError> {
        if self.fail {
            return Err(FileReadError::Empty(screenshot.path().display().to_string()));
        }
        Ok(self.encoded.clone())
    }
}

/// One scripted capture call.
pub enum CaptureStep {
    Succeed,
    Fail,
    /// Waits for `notify_one()` on the handle, then succeeds.
    WaitThenSucceed(Arc<Notify>),
}

/// Capture service returning numbered references, optionally gated or failing.
///
/// Scripted steps are consumed first, one per call; once they run out the
/// `gate` and `fail` fields apply.
#[derive(Default)]
pub struct FakeCapture {
    pub gate: Option<Arc<Notify>>,
    pub fail: bool,
    pub steps: Mutex<VecDeque<CaptureStep>>,
    pub sequence: AtomicUsize,
}

impl FakeCapture {
    pub fn scripted(steps: Vec<CaptureStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            ..Self::default()
        }
    }
}

#[async_trait]
impl ScreenshotService for FakeCapture {
    async fn capture(&self, config: &CaptureConfig) -> Result<ScreenshotRef, CaptureError> {
        let step = self.steps.lock().expect("steps lock").pop_front();
        let fail = match step {
            Some(CaptureStep::Succeed) => false,
            Some(CaptureStep::Fail) => true,
            Some(CaptureStep::WaitThenSucceed(gate)) => {
                gate.notified().await;
                false
            }
            None => {
                if let Some(gate) = &self.gate {
                    gate.notified().await;
                }
                self.fail
            }
        };
        if fail {
            return Err(CaptureError::Backend("camera unavailable".to_string()));
        }

        let index = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ScreenshotRef::new(
            format!("/captures/shot-{index}.{}", config.format.extension()),
            config.format,
        ))
    }
}

/// Builds a controller over the given fakes.
pub fn controller(
    feedback_type: FeedbackType,
    capture: Arc<dyn ScreenshotService>,
    reader: Arc<dyn FileReader>,
    client: Arc<dyn SubmissionClient>,
    events: Arc<dyn FormEvents>,
) -> FormController {
    FormController::new(
        feedback_type,
        CaptureConfig::new(ImageFormat::Jpg, 0.8).expect("capture config should be valid"),
        FormServices {
            capture,
            reader,
            client,
        },
        events,
    )
}
