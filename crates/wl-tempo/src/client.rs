//! Tempo REST client.

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use crate::request::WorklogRequest;
use crate::submit::{Confirmation, SubmitError, WorklogApi};

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Tempo Core API base URL.
pub const DEFAULT_API_URL: &str = "https://api.tempo.io/core/3";

/// Errors constructing a [`TempoClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The provided API token was invalid.
    #[error("invalid API token: {reason}")]
    InvalidToken { reason: &'static str },
    /// The base URL could not be parsed.
    #[error("invalid API URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

/// Tempo API client authenticated with a bearer token.
pub struct TempoClient {
    http: reqwest::Client,
    worklogs_url: String,
    token: String,
}

impl fmt::Debug for TempoClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TempoClient")
            .field("worklogs_url", &self.worklogs_url)
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl TempoClient {
    /// Creates a client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or whitespace-only, if the URL
    /// does not parse, or if the HTTP client fails to build.
    pub fn new(token: impl Into<String>, base_url: &str) -> Result<Self, ClientError> {
        let token = token.into();
        if token.is_empty() {
            return Err(ClientError::InvalidToken {
                reason: "API token cannot be empty",
            });
        }
        if token.trim().is_empty() {
            return Err(ClientError::InvalidToken {
                reason: "API token cannot be whitespace-only",
            });
        }

        let worklogs_url = format!("{}/worklogs", base_url.trim_end_matches('/'));
        reqwest::Url::parse(&worklogs_url).map_err(|err| ClientError::InvalidUrl {
            url: base_url.to_string(),
            reason: err.to_string(),
        })?;

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(ClientError::ClientBuild)?;

        Ok(Self {
            http,
            worklogs_url,
            token,
        })
    }

    pub fn worklogs_url(&self) -> &str {
        &self.worklogs_url
    }
}

impl WorklogApi for TempoClient {
    async fn create_worklog(&self, request: &WorklogRequest) -> Result<Confirmation, SubmitError> {
        let response = self
            .http
            .post(&self.worklogs_url)
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        classify_response(status, body)
    }
}

/// Maps a worklog-creation response to a confirmation or a failure.
fn classify_response(status: StatusCode, body: String) -> Result<Confirmation, SubmitError> {
    if status.is_success() {
        return Ok(Confirmation::from_body(body));
    }
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return Err(SubmitError::Unauthorized {
            status: status.as_u16(),
            body,
        });
    }
    Err(SubmitError::Rejected {
        status: status.as_u16(),
        body,
    })
}
