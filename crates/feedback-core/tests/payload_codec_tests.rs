//! Tests the `POST /feedbacks` body shape.

use feedback_core::{FeedbackPayload, FeedbackType, ImageFormat};
use serde_json::{Value, json};

#[test]
fn payload_codec_tests_omit_screenshot_key_when_absent() {
    let payload = FeedbackPayload::new(FeedbackType::Bug, "App crashes on save");
    let encoded = payload.to_json_bytes().expect("encoding should succeed");
    let value: Value = serde_json::from_slice(&encoded).expect("body should be json");

    assert_eq!(value, json!({"type": "BUG", "comment": "App crashes on save"}));
    assert!(value.get("screenshot").is_none());
}

#[test]
fn payload_codec_tests_embed_screenshot_data_uri() {
    let payload = FeedbackPayload::new(FeedbackType::Idea, "")
        .with_screenshot(ImageFormat::Jpg, "/9j/4AAQ")
        .expect("screenshot should attach");
    let encoded = payload.to_json_bytes().expect("encoding should succeed");
    let value: Value = serde_json::from_slice(&encoded).expect("body should be json");

    assert_eq!(value["type"], "IDEA");
    assert_eq!(value["comment"], "");
    assert_eq!(value["screenshot"], "data:image/jpeg;base64,/9j/4AAQ");
}

#[test]
fn payload_codec_tests_decode_body_without_screenshot() {
    let decoded = FeedbackPayload::from_json_bytes(br#"{"type":"OTHER","comment":"hi"}"#)
        .expect("decoding should succeed");
    assert_eq!(decoded, FeedbackPayload::new(FeedbackType::Other, "hi"));
}
