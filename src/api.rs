// API client module: wraps the two outbound calls of the submission flow
// (registration and final submission). Both are blocking JSON POSTs; every
// failure is converted into an `ApiError` here so callers only ever deal
// with values, never panics.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Failure of a single outbound call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, timeout, invalid header value...
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The service answered with a non-2xx status. The raw body is kept for
    /// diagnostics.
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// 2xx, but the body could not be parsed into the expected shape.
    #[error("malformed response body: {source} (body: {body})")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },
}

impl ApiError {
    /// HTTP status of the failed call, when the service answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Transport(e) => e.status(),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Decode { .. } => None,
        }
    }
}

/// Identity sent to the registration endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub name: String,
    #[serde(rename = "regNo")]
    pub reg_no: String,
    pub email: String,
}

/// Reply of the registration endpoint. Both fields are optional on the wire
/// and unknown fields are ignored.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationResponse {
    #[serde(rename = "webhook", default)]
    pub webhook_url: Option<String>,
    #[serde(rename = "accessToken", default)]
    pub access_token: Option<String>,
}

impl RegistrationResponse {
    /// The returned callback URL, or `fallback` when it is absent or blank.
    pub fn webhook_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        non_blank(self.webhook_url.as_deref()).unwrap_or(fallback)
    }

    /// The access token, if one with actual content was returned.
    pub fn token(&self) -> Option<&str> {
        non_blank(self.access_token.as_deref())
    }
}

/// Body of the final submission.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest<'a> {
    #[serde(rename = "finalQuery")]
    pub final_query: &'a str,
}

/// What the webhook answered to a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub status: StatusCode,
    pub body: String,
}

/// Blocking HTTP client shared by both calls so the connection pool is
/// reused between registration and submission.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    /// Build a client whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient { client })
    }

    /// POST the identity to `url` and parse the webhook/token reply.
    pub fn register(
        &self,
        url: &str,
        req: &RegistrationRequest,
    ) -> std::result::Result<RegistrationResponse, ApiError> {
        let res = self
            .client
            .post(url)
            .json(req)
            .send()
            .map_err(ApiError::Transport)?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().unwrap_or_else(|_| "".into());
            return Err(ApiError::Status { status, body });
        }

        // Read the text first so a malformed body can still be reported.
        let body = res.text().map_err(ApiError::Transport)?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode { source, body })
    }

    /// POST the final query to `url`, authenticated with the raw `token`
    /// (no `Bearer` prefix, the service expects the bare value).
    pub fn submit(
        &self,
        url: &str,
        token: &str,
        final_query: &str,
    ) -> std::result::Result<SubmissionReceipt, ApiError> {
        let res = self
            .client
            .post(url)
            .header(AUTHORIZATION, token)
            .json(&SubmissionRequest { final_query })
            .send()
            .map_err(ApiError::Transport)?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().unwrap_or_else(|_| "".into());
            return Err(ApiError::Status { status, body });
        }

        let body = res.text().map_err(ApiError::Transport)?;
        tracing::info!(%status, %body, "webhook response");
        Ok(SubmissionReceipt { status, body })
    }
}

/// Keep only the first four characters of a secret for log output.
pub fn mask_token(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    if prefix.len() == token.len() {
        "***".to_string()
    } else {
        format!("{prefix}***")
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
