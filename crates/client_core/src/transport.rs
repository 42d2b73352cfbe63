//! Server synchronization: one POST per user action, no retry, no timeout
//! override.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::protocol::{MutationRequest, MutationResponse};
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("invalid server url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("server answered {status}")]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl SyncError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SyncError::Status { status, .. } => Some(*status),
            SyncError::Http(err) => err.status(),
            SyncError::InvalidUrl { .. } => None,
        }
    }

    /// Error string the server put in a non-OK answer, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            SyncError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

#[async_trait]
pub trait RecordSync: Send + Sync {
    /// Posts an update or delete body as JSON and returns the decoded answer.
    async fn post_mutation(
        &self,
        path: &str,
        body: &MutationRequest,
    ) -> Result<MutationResponse, SyncError>;

    /// Posts page form fields as `application/x-www-form-urlencoded`. The
    /// server answers with a redirect, so only the status is checked.
    async fn submit_entries(&self, path: &str, fields: &[(String, String)]) -> Result<(), SyncError>;
}

pub struct HttpRecordSync {
    http: Client,
    base_url: Url,
}

impl HttpRecordSync {
    pub fn new(server_url: &str) -> Result<Self, SyncError> {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: &str) -> Result<Self, SyncError> {
        let mut base_url = Url::parse(server_url).map_err(|source| SyncError::InvalidUrl {
            url: server_url.to_string(),
            source,
        })?;
        // Endpoints resolve relative to the base, so a path prefix survives.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, SyncError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|source| SyncError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                source,
            })
    }
}

#[async_trait]
impl RecordSync for HttpRecordSync {
    async fn post_mutation(
        &self,
        path: &str,
        body: &MutationRequest,
    ) -> Result<MutationResponse, SyncError> {
        let url = self.endpoint(path)?;
        debug!(%url, fields = body.len(), "posting mutation");

        let response = self.http.post(url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            // Non-OK answers may still carry the `{success, error}` envelope.
            let detail = response
                .json::<MutationResponse>()
                .await
                .ok()
                .and_then(|body| body.error);
            return Err(SyncError::Status { status, detail });
        }

        Ok(response.json::<MutationResponse>().await?)
    }

    async fn submit_entries(&self, path: &str, fields: &[(String, String)]) -> Result<(), SyncError> {
        let url = self.endpoint(path)?;
        debug!(%url, fields = fields.len(), "submitting entry form");

        self.http
            .post(url)
            .form(fields)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
