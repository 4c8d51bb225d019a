//! Integration tests for capture, removal, and the late-capture race.

mod common;

use std::sync::Arc;

use common::{CaptureStep, FakeCapture, FakeClient, FakeReader, RecordingEvents};
use feedback_app::CaptureOutcome;
use feedback_core::FeedbackType;
use tokio::sync::Notify;

fn controller_with(capture: FakeCapture) -> feedback_app::FormController {
    common::controller(
        FeedbackType::Bug,
        Arc::new(capture),
        Arc::new(FakeReader::default()),
        Arc::new(FakeClient::default()),
        Arc::new(RecordingEvents::default()),
    )
}

#[tokio::test]
async fn screenshot_lifecycle_tests_new_capture_overwrites_previous() {
    let controller = controller_with(FakeCapture::default());

    controller.capture_screenshot().await;
    controller.capture_screenshot().await;

    let shot = controller.snapshot().screenshot.expect("screenshot attached");
    assert!(shot.path().ends_with("shot-2.jpg"));
}

#[tokio::test]
async fn screenshot_lifecycle_tests_failed_capture_without_prior_leaves_none() {
    let controller = controller_with(FakeCapture {
        fail: true,
        ..FakeCapture::default()
    });

    assert_eq!(controller.capture_screenshot().await, CaptureOutcome::Failed);
    assert!(controller.snapshot().screenshot.is_none());
}

#[tokio::test]
async fn screenshot_lifecycle_tests_failed_capture_keeps_prior_reference() {
    let controller = controller_with(FakeCapture::scripted(vec![
        CaptureStep::Succeed,
        CaptureStep::Fail,
    ]));

    assert_eq!(controller.capture_screenshot().await, CaptureOutcome::Stored);
    assert_eq!(controller.capture_screenshot().await, CaptureOutcome::Failed);

    let shot = controller.snapshot().screenshot.expect("prior screenshot kept");
    assert!(shot.path().ends_with("shot-1.jpg"));
}

#[tokio::test]
async fn screenshot_lifecycle_tests_failing_later_capture_keeps_earlier_success() {
    let gate = Arc::new(Notify::new());
    let controller = controller_with(FakeCapture::scripted(vec![
        CaptureStep::WaitThenSucceed(gate.clone()),
        CaptureStep::Fail,
    ]));

    let (first, second) = tokio::join!(controller.capture_screenshot(), async {
        let outcome = controller.capture_screenshot().await;
        gate.notify_one();
        outcome
    });

    assert_eq!(first, CaptureOutcome::Stored);
    assert_eq!(second, CaptureOutcome::Failed);
    let shot = controller.snapshot().screenshot.expect("earlier capture kept");
    assert!(shot.path().ends_with("shot-1.jpg"));
}

#[tokio::test]
async fn screenshot_lifecycle_tests_overlapping_successes_keep_last_resolved() {
    let gate = Arc::new(Notify::new());
    let controller = controller_with(FakeCapture::scripted(vec![
        CaptureStep::WaitThenSucceed(gate.clone()),
        CaptureStep::Succeed,
    ]));

    let (first, second) = tokio::join!(controller.capture_screenshot(), async {
        let outcome = controller.capture_screenshot().await;
        gate.notify_one();
        outcome
    });

    assert_eq!(first, CaptureOutcome::Stored);
    assert_eq!(second, CaptureOutcome::Stored);
    // The gated capture resolves last and numbers its file second.
    let shot = controller.snapshot().screenshot.expect("screenshot attached");
    assert!(shot.path().ends_with("shot-2.jpg"));
}

#[tokio::test]
async fn screenshot_lifecycle_tests_remove_clears_reference() {
    let controller = controller_with(FakeCapture::default());
    controller.capture_screenshot().await;

    controller.remove_screenshot();
    assert!(controller.snapshot().screenshot.is_none());

    // Removing twice is harmless.
    controller.remove_screenshot();
    assert!(controller.snapshot().screenshot.is_none());
}

#[tokio::test]
async fn screenshot_lifecycle_tests_capture_resolving_after_remove_is_discarded() {
    let gate = Arc::new(Notify::new());
    let controller = controller_with(FakeCapture {
        gate: Some(gate.clone()),
        ..FakeCapture::default()
    });

    let (outcome, ()) = tokio::join!(controller.capture_screenshot(), async {
        controller.remove_screenshot();
        gate.notify_one();
    });

    assert_eq!(outcome, CaptureOutcome::Discarded);
    assert!(controller.snapshot().screenshot.is_none());
}

#[tokio::test]
async fn screenshot_lifecycle_tests_cancel_notifies_parent_once() {
    let events = Arc::new(RecordingEvents::default());
    let controller = common::controller(
        FeedbackType::Idea,
        Arc::new(FakeCapture::default()),
        Arc::new(FakeReader::default()),
        Arc::new(FakeClient::default()),
        events.clone(),
    );

    controller.cancel();
    assert_eq!(events.canceled_count(), 1);
    assert_eq!(events.sent_count(), 0);
}
