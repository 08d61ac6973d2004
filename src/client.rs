// Analysis client - single-attempt lookups against the analysis backend
use crate::models::{AnalysisRecord, HealthStatus};
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

const CLIENT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Every way a lookup can fail. Raw transport errors only appear as sources.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("No profile found for {0:?}")]
    NotFound(String),
    #[error("Backend responded with HTTP {status}")]
    RequestFailed { status: u16 },
    #[error("Could not reach the backend")]
    Network(#[source] reqwest::Error),
    #[error("Malformed analysis response")]
    Parse(#[source] serde_json::Error),
}

/// Payload-free discriminant of [`FetchError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    NotFound,
    RequestFailed,
    Network,
    Parse,
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::NotFound(_) => FetchErrorKind::NotFound,
            FetchError::RequestFailed { .. } => FetchErrorKind::RequestFailed,
            FetchError::Network(_) => FetchErrorKind::Network,
            FetchError::Parse(_) => FetchErrorKind::Parse,
        }
    }
}

/// HTTP client for `GET {base_url}/profile/{handle}`
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AnalysisClient {
    /// `base_url` must be able to take path segments (validated by `config`).
    pub fn new(base_url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// URL of the profile lookup, with the handle as one encoded segment.
    /// `None` for `.` and `..`: URL parsing folds those (even as `%2E`) into
    /// the path, so they can never reach the backend as a handle.
    pub fn profile_url(&self, identifier: &str) -> Option<Url> {
        if matches!(identifier, "." | "..") {
            return None;
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .push("profile")
            .push(identifier);
        Some(url)
    }

    /// The backend serves `/health` at its origin, outside the API prefix
    pub fn health_url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.set_path("/health");
        url.set_query(None);
        url
    }

    /// Fetch the analysis record for a normalized handle. Exactly one attempt.
    pub async fn fetch_analysis(&self, identifier: &str) -> Result<AnalysisRecord, FetchError> {
        let Some(url) = self.profile_url(identifier) else {
            warn!("{:?} cannot be sent as a profile path segment", identifier);
            return Err(FetchError::NotFound(identifier.to_string()));
        };
        debug!("GET {}", url);

        self.get_json(url, identifier).await.inspect_err(|e| {
            if e.kind() != FetchErrorKind::NotFound {
                warn!("Analysis fetch for {:?} failed: {}", identifier, e);
            }
        })
    }

    /// Probe the backend's health endpoint
    pub async fn check_health(&self) -> Result<HealthStatus, FetchError> {
        let url = self.health_url();
        debug!("GET {}", url);
        self.get_json(url, "/health").await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, subject: &str) -> Result<T, FetchError> {
        let response = self
            .http
            .get(url)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(FetchError::Network)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(subject.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::RequestFailed {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(FetchError::Network)?;
        serde_json::from_slice(&body).map_err(FetchError::Parse)
    }
}
