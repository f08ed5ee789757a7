use std::{future::Future, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Project, Update, UpdateId},
    error::{ApiError, ErrorCode},
};
use tracing::debug;
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Backend operations the view-models depend on.
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn fetch_project(&self, param: &str) -> ClientResult<Project>;
    async fn fetch_update(&self, project_param: &str, update_id: UpdateId) -> ClientResult<Update>;
    async fn star_project(&self, project: &Project) -> ClientResult<Project>;
    async fn toggle_project_star(&self, project: &Project) -> ClientResult<Project>;
}

/// Bounds an adapter call. Elapsed calls fail with [`ClientError::Timeout`].
pub async fn with_timeout<T>(
    timeout: Duration,
    call: impl Future<Output = ClientResult<T>>,
) -> ClientResult<T> {
    tokio::time::timeout(timeout, call)
        .await
        .unwrap_or(Err(ClientError::Timeout(timeout)))
}

pub struct HttpApiClient {
    http: Client,
    base_url: Url,
}

impl HttpApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let invalid = |reason: String| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let parsed = Url::parse(base_url).map_err(|err| invalid(err.to_string()))?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid("expected an absolute http(s) url".into()));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ClientError::Transport {
                url: base_url.to_string(),
                source,
            })?;
        Ok(Self {
            http,
            base_url: parsed,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "url cannot carry path segments".into(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send_json<T: DeserializeOwned>(&self, method: Method, url: Url) -> ClientResult<T> {
        debug!(%method, %url, "api request");
        let response = self
            .http
            .request(method, url.clone())
            .send()
            .await
            .map_err(|source| transport_error(&url, source))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| transport_error(&url, source))?;

        if !status.is_success() {
            return Err(ClientError::api(status.as_u16(), decode_api_error(status, &body)));
        }

        serde_json::from_slice(&body).map_err(|err| ClientError::Decode {
            url: url.to_string(),
            reason: err.to_string(),
        })
    }
}

fn transport_error(url: &Url, source: reqwest::Error) -> ClientError {
    ClientError::Transport {
        url: url.to_string(),
        source,
    }
}

fn decode_api_error(status: StatusCode, body: &[u8]) -> ApiError {
    serde_json::from_slice::<ApiError>(body).unwrap_or_else(|_| {
        let text = String::from_utf8_lossy(body);
        let message = if text.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        } else {
            text.into_owned()
        };
        ApiError::new(ErrorCode::from_status(status.as_u16()), message)
    })
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn fetch_project(&self, param: &str) -> ClientResult<Project> {
        let url = self.endpoint(&["v1", "projects", param])?;
        self.send_json(Method::GET, url).await
    }

    async fn fetch_update(&self, project_param: &str, update_id: UpdateId) -> ClientResult<Update> {
        let id = update_id.0.to_string();
        let url = self.endpoint(&["v1", "projects", project_param, "updates", id.as_str()])?;
        self.send_json(Method::GET, url).await
    }

    async fn star_project(&self, project: &Project) -> ClientResult<Project> {
        let param = project.param();
        let url = self.endpoint(&["v1", "projects", param.as_str(), "star"])?;
        self.send_json(Method::PUT, url).await
    }

    async fn toggle_project_star(&self, project: &Project) -> ClientResult<Project> {
        let param = project.param();
        let url = self.endpoint(&["v1", "projects", param.as_str(), "star", "toggle"])?;
        self.send_json(Method::POST, url).await
    }
}

#[cfg(test)]
#[path = "tests/api_client_tests.rs"]
mod tests;
