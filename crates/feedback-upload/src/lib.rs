#![warn(missing_docs)]
//! # feedback-upload
//!
//! ## Purpose
//! Sends one feedback payload to `POST {api_base}/feedbacks`.
//!
//! ## Responsibilities
//! - Validate the API base URL (http/https only).
//! - Encode the payload once and derive a stable idempotency key from it.
//! - Hand the request to an injectable [`FeedbackTransport`]; the default
//!   [`HttpTransport`] uses `reqwest`.
//! - Classify failures so callers can log whether a retry is worthwhile.
//!
//! ## Data flow
//! [`FeedbackPayload`] -> JSON body + idempotency key -> [`SubmissionEnvelope`]
//! -> transport -> HTTP status -> [`SubmitReport`] or [`UploadError`].
//!
//! ## Error model
//! Exactly one attempt is made per call. Transport, timeout and non-2xx
//! responses surface as [`UploadError`]; retries are a caller decision.
//!
//! ## Security and privacy notes
//! Request bodies are never logged. Only the URL, body length and key are.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use feedback_core::{CoreError, FeedbackPayload};
use reqwest::header::CONTENT_TYPE;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Resource path feedback is posted to, relative to the API base.
pub const FEEDBACKS_PATH: &str = "feedbacks";

/// Header carrying the payload idempotency key.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// One encoded request ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionEnvelope {
    /// Absolute `/feedbacks` URL.
    pub url: Url,
    /// SHA-256 hex digest of `body`.
    pub idempotency_key: String,
    /// JSON request body.
    pub body: Vec<u8>,
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReport {
    /// HTTP status returned by the server.
    pub status: u16,
    /// Idempotency key sent with the request.
    pub idempotency_key: String,
}

/// High-level seam the form controller submits through.
#[async_trait]
pub trait SubmissionClient: Send + Sync {
    /// Submits one payload. The response body is not consumed.
    async fn submit(&self, payload: &FeedbackPayload) -> Result<SubmitReport, UploadError>;
}

/// Low-level transport that delivers an envelope and reports the status code.
#[async_trait]
pub trait FeedbackTransport: Send + Sync {
    /// Sends the envelope once.
    ///
    /// Implementations return `Ok` only for 2xx responses.
    async fn send(&self, envelope: &SubmissionEnvelope) -> Result<u16, UploadError>;
}

/// Validated feedback client bound to one API base URL.
#[derive(Clone)]
pub struct FeedbackClient {
    endpoint: Url,
    transport: Arc<dyn FeedbackTransport>,
}

impl FeedbackClient {
    /// Creates a client posting to `{api_base}/feedbacks`.
    ///
    /// # Errors
    /// Returns [`UploadError::InvalidEndpoint`] when `api_base` is not an
    /// absolute http/https URL.
    pub fn new(api_base: &str, transport: Arc<dyn FeedbackTransport>) -> Result<Self, UploadError> {
        let base = validate_api_base(api_base)?;
        Ok(Self {
            endpoint: feedbacks_url(&base),
            transport,
        })
    }

    /// Encodes `payload` into the envelope the transport will send.
    ///
    /// # Errors
    /// Returns [`UploadError::Encode`] when JSON encoding fails.
    pub fn envelope_for(&self, payload: &FeedbackPayload) -> Result<SubmissionEnvelope, UploadError> {
        let body = payload.to_json_bytes()?;
        Ok(SubmissionEnvelope {
            url: self.endpoint.clone(),
            idempotency_key: idempotency_key_for_body(&body),
            body,
        })
    }
}

#[async_trait]
impl SubmissionClient for FeedbackClient {
    async fn submit(&self, payload: &FeedbackPayload) -> Result<SubmitReport, UploadError> {
        let envelope = self.envelope_for(payload)?;
        debug!(
            url = %envelope.url,
            body_len = envelope.body.len(),
            key = %envelope.idempotency_key,
            "posting feedback"
        );

        let status = self.transport.send(&envelope).await?;
        Ok(SubmitReport {
            status,
            idempotency_key: envelope.idempotency_key,
        })
    }
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport. `timeout` of `None` waits indefinitely.
    ///
    /// # Errors
    /// Returns [`UploadError::Network`] when the HTTP client cannot be built.
    pub fn new(timeout: Option<Duration>) -> Result<Self, UploadError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|error| UploadError::Network(format!("http client setup failed: {error}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedbackTransport for HttpTransport {
    async fn send(&self, envelope: &SubmissionEnvelope) -> Result<u16, UploadError> {
        let response = self
            .client
            .post(envelope.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(IDEMPOTENCY_HEADER, envelope.idempotency_key.as_str())
            .body(envelope.body.clone())
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    UploadError::Timeout
                } else {
                    UploadError::Network(error.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(status.as_u16())
        } else if status.is_server_error() {
            Err(UploadError::Server(status.as_u16()))
        } else {
            Err(UploadError::Client(status.as_u16()))
        }
    }
}

/// Creates a [`FeedbackClient`] over [`HttpTransport`].
///
/// # Errors
/// Returns [`UploadError`] when the base URL or HTTP client setup is invalid.
pub fn http_client(api_base: &str, timeout: Option<Duration>) -> Result<FeedbackClient, UploadError> {
    FeedbackClient::new(api_base, Arc::new(HttpTransport::new(timeout)?))
}

/// Validates the API base URL.
///
/// # Errors
/// Returns [`UploadError::InvalidEndpoint`] for unparsable URLs, schemes other
/// than http/https, or URLs carrying a query or fragment.
pub fn validate_api_base(api_base: &str) -> Result<Url, UploadError> {
    let parsed = Url::parse(api_base)
        .map_err(|error| UploadError::InvalidEndpoint(format!("invalid api url: {error}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(UploadError::InvalidEndpoint(format!(
            "api url must use http or https, got {}",
            parsed.scheme()
        )));
    }

    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(UploadError::InvalidEndpoint(
            "api url must not carry a query or fragment".to_string(),
        ));
    }

    Ok(parsed)
}

/// Returns `true` when the API base URL uses TLS.
pub fn is_https_endpoint(api_base: &str) -> bool {
    Url::parse(api_base)
        .map(|url| url.scheme() == "https")
        .unwrap_or(false)
}

fn feedbacks_url(base: &Url) -> Url {
    let mut url = base.clone();
    let path = format!("{}/{FEEDBACKS_PATH}", base.path().trim_end_matches('/'));
    url.set_path(&path);
    url
}

/// Derives a stable idempotency key from the encoded request body.
pub fn idempotency_key_for_body(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

/// Coarse failure category used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// A later attempt may succeed.
    Retriable,
    /// Resubmitting the same payload will fail again.
    Permanent,
}

/// Classifies an upload error.
pub fn classify_upload_error(error: &UploadError) -> FailureClass {
    match error {
        UploadError::Network(_) | UploadError::Timeout | UploadError::Server(_) => {
            FailureClass::Retriable
        }
        UploadError::Client(429) => FailureClass::Retriable,
        UploadError::Client(_) | UploadError::InvalidEndpoint(_) | UploadError::Encode(_) => {
            FailureClass::Permanent
        }
    }
}

/// Errors produced by submission.
#[derive(Debug, Error)]
pub enum UploadError {
    /// API base URL violates the endpoint policy.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// Payload could not be encoded.
    #[error("payload encoding failed: {0}")]
    Encode(#[from] CoreError),
    /// Connection-level failure.
    #[error("network failure: {0}")]
    Network(String),
    /// Request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,
    /// Server rejected the request (4xx).
    #[error("server rejected feedback with status {0}")]
    Client(u16),
    /// Server failed to process the request (5xx).
    #[error("server error status {0}")]
    Server(u16),
}
