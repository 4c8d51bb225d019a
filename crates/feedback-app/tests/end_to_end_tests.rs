//! End-to-end tests: synthetic capture, real file reader, HTTP stub server.

mod common;

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use base64::Engine as _;
use common::RecordingEvents;
use feedback_app::{AppConfig, CaptureOutcome, SubmitOutcome, build_controller};
use feedback_capture::SyntheticCapture;
use feedback_core::FeedbackType;
use serde_json::Value;

type Bodies = Arc<Mutex<Vec<Value>>>;

async fn spawn_server(status: StatusCode) -> (String, Bodies) {
    let bodies: Bodies = Arc::default();
    let app = Router::new()
        .route(
            "/feedbacks",
            post(
                move |State(bodies): State<Bodies>, Json(body): Json<Value>| async move {
                    bodies.lock().expect("bodies lock").push(body);
                    status
                },
            ),
        )
        .with_state(bodies.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("listener should have address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), bodies)
}

fn config_for(base_url: String, capture_dir: &std::path::Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.api.base_url = base_url;
    config.capture.dir = Some(capture_dir.to_path_buf());
    config.validate().expect("test config should validate");
    config
}

#[tokio::test]
async fn end_to_end_tests_posts_captured_screenshot() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let (base_url, bodies) = spawn_server(StatusCode::CREATED).await;
    let config = config_for(base_url, dir.path());
    let events = Arc::new(RecordingEvents::default());

    let controller = build_controller(
        &config,
        FeedbackType::Bug,
        Arc::new(SyntheticCapture::new(config.capture_dir())),
        events.clone(),
    )
    .expect("controller should build");
    controller.set_comment("App crashes on save");

    assert_eq!(controller.capture_screenshot().await, CaptureOutcome::Stored);
    assert_eq!(controller.submit().await, SubmitOutcome::Sent);
    assert_eq!(events.sent_count(), 1);

    let bodies = bodies.lock().expect("bodies lock");
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["type"], "BUG");
    assert_eq!(bodies[0]["comment"], "App crashes on save");

    let uri = bodies[0]["screenshot"].as_str().expect("screenshot should be a string");
    let data = uri
        .strip_prefix("data:image/jpeg;base64,")
        .expect("data uri prefix");
    let jpeg = base64::engine::general_purpose::STANDARD
        .decode(data)
        .expect("screenshot should be valid base64");
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
}

#[tokio::test]
async fn end_to_end_tests_server_failure_allows_resubmit() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let (base_url, bodies) = spawn_server(StatusCode::INTERNAL_SERVER_ERROR).await;
    let config = config_for(base_url, dir.path());
    let events = Arc::new(RecordingEvents::default());

    let controller = build_controller(
        &config,
        FeedbackType::Idea,
        Arc::new(SyntheticCapture::new(config.capture_dir())),
        events.clone(),
    )
    .expect("controller should build");
    controller.set_comment("dark mode please");

    assert_eq!(controller.submit().await, SubmitOutcome::Failed);
    assert!(!controller.is_sending());
    assert_eq!(controller.submit().await, SubmitOutcome::Failed);

    assert_eq!(bodies.lock().expect("bodies lock").len(), 2);
    assert_eq!(events.sent_count(), 0);
    assert_eq!(controller.snapshot().comment, "dark mode please");
}
