#![warn(missing_docs)]
//! # feedback-ui
//!
//! ## Purpose
//! Projects feedback form state into a display model and renders it as text.
//!
//! ## Responsibilities
//! - Map [`FormSnapshot`] plus the static feedback-type table into [`FormView`].
//! - Choose between a screenshot preview and a capture trigger.
//! - Reflect the in-progress flag on the submit button.
//!
//! ## Data flow
//! Controller snapshot -> [`FormView::project`] -> [`render_text`] -> terminal.
//!
//! ## Error model
//! Projection is total; there is nothing to fail.

use feedback_core::{FormSnapshot, feedback_type_info};

/// Placeholder shown while the comment is empty.
pub const COMMENT_PLACEHOLDER: &str =
    "Something not working right? We want to fix it. Tell us in detail what is happening...";

/// Label of the header back action.
pub const BACK_LABEL: &str = "< Back";

/// Submit button label while idle.
pub const SUBMIT_LABEL: &str = "Send feedback";

/// Submit button label while a submission is in flight.
pub const SUBMITTING_LABEL: &str = "Sending...";

/// Header with the cancel action and feedback-type identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderView {
    /// Cancel action label.
    pub back_label: &'static str,
    /// Feedback-type title.
    pub title: &'static str,
    /// Feedback-type image asset.
    pub image: &'static str,
}

/// Multiline comment input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentInputView {
    /// Current text.
    pub text: String,
    /// Placeholder displayed when `text` is empty.
    pub placeholder: &'static str,
}

/// Screenshot area of the footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenshotSlot {
    /// A screenshot is attached; shows its preview and a remove action.
    Preview {
        /// Display path of the captured file.
        path: String,
    },
    /// No screenshot; shows the capture action.
    CaptureTrigger,
}

/// Submit button state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitButtonView {
    /// Button label.
    pub label: &'static str,
    /// Whether the loading indicator is shown.
    pub is_loading: bool,
}

/// Complete display model of the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    /// Header row.
    pub header: HeaderView,
    /// Comment input.
    pub input: CommentInputView,
    /// Screenshot slot.
    pub screenshot: ScreenshotSlot,
    /// Submit button.
    pub submit: SubmitButtonView,
}

impl FormView {
    /// Projects a state snapshot into a display model.
    pub fn project(snapshot: &FormSnapshot) -> Self {
        let info = feedback_type_info(snapshot.feedback_type);
        let screenshot = match &snapshot.screenshot {
            Some(shot) => ScreenshotSlot::Preview {
                path: shot.path().display().to_string(),
            },
            None => ScreenshotSlot::CaptureTrigger,
        };

        Self {
            header: HeaderView {
                back_label: BACK_LABEL,
                title: info.title,
                image: info.image,
            },
            input: CommentInputView {
                text: snapshot.comment.clone(),
                placeholder: COMMENT_PLACEHOLDER,
            },
            screenshot,
            submit: SubmitButtonView {
                label: if snapshot.is_sending {
                    SUBMITTING_LABEL
                } else {
                    SUBMIT_LABEL
                },
                is_loading: snapshot.is_sending,
            },
        }
    }
}

/// Renders a view as plain terminal lines.
pub fn render_text(view: &FormView) -> Vec<String> {
    let rule = "-".repeat(48);
    let mut lines = vec![
        format!(
            "{}    [{}] {}",
            view.header.back_label, view.header.image, view.header.title
        ),
        rule.clone(),
    ];

    if view.input.text.is_empty() {
        lines.push(format!("  ({})", view.input.placeholder));
    } else {
        lines.extend(view.input.text.lines().map(|line| format!("  {line}")));
    }
    lines.push(rule);

    lines.push(match &view.screenshot {
        ScreenshotSlot::Preview { path } => format!("[screenshot] {path}  (:rm to remove)"),
        ScreenshotSlot::CaptureTrigger => "[camera] :shot to attach a screenshot".to_string(),
    });
    lines.push(format!("[ {} ]", view.submit.label));
    lines
}
