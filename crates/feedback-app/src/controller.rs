//! Feedback form controller.
//!
//! Owns the comment, the attached screenshot and the in-progress flag, and
//! runs the submit sequence against the injected services. All methods take
//! `&self`; state lives behind a mutex that is never held across an `.await`,
//! so overlapping calls (double taps) observe each other's state changes.
//!
//! Submission state machine:
//!
//! ```text
//! Idle --submit--> Submitting --failure--> Idle
//!                  Submitting --success--> (terminal, parent drops the form)
//!                  Submitting --submit--> Submitting (no-op)
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use feedback_capture::{CaptureConfig, ScreenshotService};
use feedback_core::{CoreError, FeedbackPayload, FeedbackType, FormSnapshot, ScreenshotRef};
use feedback_files::{FileReadError, FileReader};
use feedback_upload::{
    FailureClass, SubmissionClient, SubmitReport, UploadError, classify_upload_error,
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Notifications delivered to the screen that owns the form.
pub trait FormEvents: Send + Sync {
    /// The user backed out of the form.
    fn on_feedback_canceled(&self);

    /// The feedback was accepted by the server.
    fn on_feedback_sent(&self);
}

/// Collaborators the controller delegates to.
#[derive(Clone)]
pub struct FormServices {
    /// Screenshot capture service.
    pub capture: Arc<dyn ScreenshotService>,
    /// Reads captured files as base64.
    pub reader: Arc<dyn FileReader>,
    /// Posts the payload.
    pub client: Arc<dyn SubmissionClient>,
}

/// What happened to one capture request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The new screenshot replaced any previous one.
    Stored,
    /// The capture finished after the screenshot was removed; its result was
    /// dropped.
    Discarded,
    /// The capture service failed; the previous screenshot is untouched.
    Failed,
}

/// What happened to one submit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Server accepted the feedback and the parent was notified.
    Sent,
    /// Reading the screenshot or posting failed; the form may be resubmitted.
    Failed,
    /// Another submission was already in flight; nothing was done.
    AlreadySubmitting,
}

#[derive(Debug, Default)]
struct FormState {
    comment: String,
    screenshot: Option<ScreenshotRef>,
    is_sending: bool,
    // Bumped only by removal; a capture started before a removal is dropped.
    removal_generation: u64,
}

/// Failure inside one submit attempt. Logged, never returned to the parent.
#[derive(Debug, Error)]
enum SubmitError {
    #[error("screenshot read failed: {0}")]
    Read(#[from] FileReadError),
    #[error("payload build failed: {0}")]
    Payload(#[from] CoreError),
    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl SubmitError {
    fn failure_class(&self) -> FailureClass {
        match self {
            SubmitError::Upload(error) => classify_upload_error(error),
            SubmitError::Read(_) | SubmitError::Payload(_) => FailureClass::Permanent,
        }
    }
}

/// Controller for one feedback form instance.
pub struct FormController {
    feedback_type: FeedbackType,
    capture_config: CaptureConfig,
    services: FormServices,
    events: Arc<dyn FormEvents>,
    state: Mutex<FormState>,
}

impl FormController {
    /// Creates an empty form for `feedback_type`.
    pub fn new(
        feedback_type: FeedbackType,
        capture_config: CaptureConfig,
        services: FormServices,
        events: Arc<dyn FormEvents>,
    ) -> Self {
        Self {
            feedback_type,
            capture_config,
            services,
            events,
            state: Mutex::new(FormState::default()),
        }
    }

    /// Replaces the comment text.
    pub fn set_comment(&self, text: impl Into<String>) {
        self.state().comment = text.into();
    }

    /// Returns a copy of the current form state.
    pub fn snapshot(&self) -> FormSnapshot {
        let state = self.state();
        FormSnapshot {
            feedback_type: self.feedback_type,
            comment: state.comment.clone(),
            screenshot: state.screenshot.clone(),
            is_sending: state.is_sending,
        }
    }

    /// Whether a submission is in flight.
    pub fn is_sending(&self) -> bool {
        self.state().is_sending
    }

    /// Captures a screenshot and attaches it.
    ///
    /// Failures are logged and leave the current attachment as it was.
    /// Overlapping captures that both succeed overwrite each other in the order
    /// they resolve.
    pub async fn capture_screenshot(&self) -> CaptureOutcome {
        let generation = self.state().removal_generation;

        match self.services.capture.capture(&self.capture_config).await {
            Ok(screenshot) => {
                let mut state = self.state();
                if state.removal_generation != generation {
                    debug!(path = %screenshot.path().display(), "dropping capture after removal");
                    return CaptureOutcome::Discarded;
                }
                debug!(path = %screenshot.path().display(), "screenshot attached");
                state.screenshot = Some(screenshot);
                CaptureOutcome::Stored
            }
            Err(error) => {
                warn!(%error, "screenshot capture failed");
                CaptureOutcome::Failed
            }
        }
    }

    /// Detaches the screenshot. Captures still in flight are ignored when they
    /// resolve.
    pub fn remove_screenshot(&self) {
        let mut state = self.state();
        state.screenshot = None;
        state.removal_generation += 1;
    }

    /// Forwards the header back action to the parent.
    pub fn cancel(&self) {
        debug!(feedback_type = %self.feedback_type, "feedback canceled");
        self.events.on_feedback_canceled();
    }

    /// Submits the form.
    ///
    /// Calls made while a submission is in flight do nothing. On success the
    /// parent is notified and the in-progress flag stays set; on failure the
    /// error is logged and the flag is cleared so the user can retry with the
    /// same comment and screenshot.
    pub async fn submit(&self) -> SubmitOutcome {
        let (comment, screenshot) = {
            let mut state = self.state();
            if state.is_sending {
                debug!("submit ignored: already submitting");
                return SubmitOutcome::AlreadySubmitting;
            }
            state.is_sending = true;
            (state.comment.clone(), state.screenshot.clone())
        };

        match self.deliver(comment, screenshot).await {
            Ok(report) => {
                info!(
                    feedback_type = %self.feedback_type,
                    status = report.status,
                    "feedback sent"
                );
                self.events.on_feedback_sent();
                SubmitOutcome::Sent
            }
            Err(error) => {
                warn!(
                    %error,
                    retriable = error.failure_class() == FailureClass::Retriable,
                    "feedback submission failed"
                );
                self.state().is_sending = false;
                SubmitOutcome::Failed
            }
        }
    }

    async fn deliver(
        &self,
        comment: String,
        screenshot: Option<ScreenshotRef>,
    ) -> Result<SubmitReport, SubmitError> {
        let mut payload = FeedbackPayload::new(self.feedback_type, comment);
        if let Some(screenshot) = screenshot {
            let encoded = self.services.reader.read_base64(&screenshot).await?;
            payload = payload.with_screenshot(screenshot.format(), &encoded)?;
        }

        debug!(
            comment_len = payload.comment.len(),
            has_screenshot = payload.screenshot.is_some(),
            "submitting feedback"
        );
        Ok(self.services.client.submit(&payload).await?)
    }

    fn state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
