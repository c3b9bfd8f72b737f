use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{Candidate, FeedMode, SubjectId},
    error::ApiErrorBody,
    protocol::{EventCreateRequest, EventRecord, SwipeRequest},
};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::{
    forwarder::{DecisionRecorder, SwipeRecord},
    source::CandidateSource,
};

#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("invalid API base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        source: reqwest::Error,
    },
    #[error("{endpoint} returned {status}: {detail}")]
    Status {
        endpoint: String,
        status: u16,
        detail: String,
    },
}

/// REST client for the events backend.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiClientError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ApiClientError::Request {
                endpoint: base_url.to_string(),
                source,
            })?;
        Self::with_http_client(base_url, http)
    }

    pub fn with_http_client(base_url: &str, http: Client) -> Result<Self, ApiClientError> {
        let invalid = |reason: String| ApiClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let base_url = Url::parse(base_url.trim()).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", base_url.scheme())));
        }
        if base_url.cannot_be_a_base() {
            return Err(invalid("url cannot carry a path".to_string()));
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn fetch_events(
        &self,
        subject: SubjectId,
        mode: FeedMode,
        limit: usize,
    ) -> Result<Vec<EventRecord>, ApiClientError> {
        let url = self.endpoint(&["events"]);
        let endpoint = format!("GET {}", url.path());
        let response = self
            .http
            .get(url)
            .query(&[
                ("user_id", subject.0.to_string()),
                ("side", mode.as_str().to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await
            .map_err(|source| request_error(&endpoint, source))?;
        let events: Vec<EventRecord> = check_status(&endpoint, response)
            .await?
            .json()
            .await
            .map_err(|source| request_error(&endpoint, source))?;

        debug!(
            subject_id = subject.0,
            %mode,
            limit,
            received = events.len(),
            "api: fetched events"
        );
        Ok(events)
    }

    pub async fn record_swipe(&self, request: &SwipeRequest) -> Result<(), ApiClientError> {
        let event_id = request.event_id.to_string();
        let url = self.endpoint(&["events", &event_id, "swipe"]);
        let endpoint = format!("POST {}", url.path());
        let response = self
            .http
            .post(url)
            .query(&[("user_id", request.user_id.0)])
            .json(request)
            .send()
            .await
            .map_err(|source| request_error(&endpoint, source))?;
        check_status(&endpoint, response).await?;
        Ok(())
    }

    pub async fn create_event(
        &self,
        request: &EventCreateRequest,
    ) -> Result<EventRecord, ApiClientError> {
        let url = self.endpoint(&["events"]);
        let endpoint = format!("POST {}", url.path());
        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|source| request_error(&endpoint, source))?;
        let created: EventRecord = check_status(&endpoint, response)
            .await?
            .json()
            .await
            .map_err(|source| request_error(&endpoint, source))?;

        info!(
            event_id = %created.id,
            matcha_mode = request.matcha_mode,
            "api: event created"
        );
        Ok(created)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

fn request_error(endpoint: &str, source: reqwest::Error) -> ApiClientError {
    ApiClientError::Request {
        endpoint: endpoint.to_string(),
        source,
    }
}

async fn check_status(endpoint: &str, response: Response) -> Result<Response, ApiClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) => parsed.message(),
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
        Err(_) => body.trim().to_string(),
    };

    Err(ApiClientError::Status {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        detail,
    })
}

#[async_trait]
impl CandidateSource for ApiClient {
    async fn fetch(
        &self,
        subject: SubjectId,
        mode: FeedMode,
        limit: usize,
    ) -> anyhow::Result<Vec<Candidate>> {
        let events = self.fetch_events(subject, mode, limit).await?;
        Ok(events.into_iter().map(EventRecord::into_candidate).collect())
    }
}

#[async_trait]
impl DecisionRecorder for ApiClient {
    async fn record(&self, record: &SwipeRecord) -> anyhow::Result<()> {
        self.record_swipe(&record.to_request()).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
