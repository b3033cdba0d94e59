//! API client for the camp data service.
//!
//! This module provides the `ApiClient` struct for reading an event's board
//! records and issuing the board's writes.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client, Method, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::board::AssignmentStore;
use crate::models::{
    Assignment, AssignmentCreate, AssignmentMove, BoardSnapshot, Bunk, BunkCounselorUpdate, Cabin,
    Camper, Counselor,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// Writes and reads both fail after this; the board adds no timeout of its own.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// API client for the camp data service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<Url>,
    token: Option<Arc<String>>,
}

impl ApiClient {
    /// Create a new API client for the given base URL (no trailing slash needed)
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid API base URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("API base URL cannot carry a path: {}", base_url));
        }

        Ok(Self {
            client,
            base_url: Arc::new(base_url),
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: impl Into<Arc<String>>) {
        self.token = Some(token.into());
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Endpoint under the base URL. Each segment is percent-encoded, so ids
    /// containing `/` or `?` stay inside their own segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = Url::clone(&self.base_url);
        // Checked in `new`: the base URL can always take path segments
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(response: reqwest::Response) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            // Rate limited - signal to retry
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Send a request, backing off and retrying while the service rate limits us.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &Url,
        body: Option<&B>,
    ) -> Result<reqwest::Response> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let mut request = self
                .client
                .request(method.clone(), url.clone())
                .headers(self.auth_headers()?);
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request
                .send()
                .await
                .map_err(ApiError::NetworkError)
                .with_context(|| format!("Failed to send {} request to {}", method, url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Ok(response),
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = %url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &Url,
        body: Option<&B>,
    ) -> Result<T> {
        let response = self.send(method, url, body).await?;
        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        self.send_json::<T, ()>(Method::GET, &self.url(segments), None).await
    }

    // ===== Queries =====

    /// Bunks active for the event
    pub async fn fetch_bunks(&self, event_id: &str) -> Result<Vec<Bunk>> {
        self.get(&["events", event_id, "bunks"]).await
    }

    pub async fn fetch_cabins(&self) -> Result<Vec<Cabin>> {
        self.get(&["cabins"]).await
    }

    pub async fn fetch_assignments(&self, event_id: &str) -> Result<Vec<Assignment>> {
        self.get(&["events", event_id, "assignments"]).await
    }

    pub async fn fetch_unassigned_campers(&self, event_id: &str) -> Result<Vec<Camper>> {
        self.get(&["events", event_id, "unassigned-campers"]).await
    }

    pub async fn fetch_counselors(&self, event_id: &str) -> Result<Vec<Counselor>> {
        self.get(&["events", event_id, "counselors"]).await
    }

    /// Fetch the whole record set for an event in parallel.
    pub async fn fetch_snapshot(&self, event_id: &str) -> Result<BoardSnapshot> {
        let (bunks, cabins, assignments, unassigned_campers, counselors) = futures::join!(
            self.fetch_bunks(event_id),
            self.fetch_cabins(),
            self.fetch_assignments(event_id),
            self.fetch_unassigned_campers(event_id),
            self.fetch_counselors(event_id),
        );

        let snapshot = BoardSnapshot {
            event_id: event_id.to_string(),
            bunks: bunks.context("Failed to fetch bunks")?,
            cabins: cabins.context("Failed to fetch cabins")?,
            assignments: assignments.context("Failed to fetch assignments")?,
            unassigned_campers: unassigned_campers.context("Failed to fetch unassigned campers")?,
            counselors: counselors.context("Failed to fetch counselors")?,
        };

        debug!(
            event_id,
            bunks = snapshot.bunks.len(),
            cabins = snapshot.cabins.len(),
            assignments = snapshot.assignments.len(),
            pool = snapshot.unassigned_campers.len(),
            counselors = snapshot.counselors.len(),
            "Snapshot fetched"
        );
        Ok(snapshot)
    }
}

#[async_trait]
impl AssignmentStore for ApiClient {
    async fn create_assignment(&self, body: &AssignmentCreate) -> Result<Assignment> {
        self.send_json(Method::POST, &self.url(&["assignments"]), Some(body))
            .await
    }

    async fn delete_assignment(&self, assignment_id: &str) -> Result<()> {
        self.send::<()>(
            Method::DELETE,
            &self.url(&["assignments", assignment_id]),
            None,
        )
        .await?;
        Ok(())
    }

    async fn move_assignment(&self, assignment_id: &str, new_bunk_id: &str) -> Result<Assignment> {
        let body = AssignmentMove {
            bunk_id: new_bunk_id.to_string(),
        };
        self.send_json(
            Method::PATCH,
            &self.url(&["assignments", assignment_id]),
            Some(&body),
        )
        .await
    }

    async fn set_bunk_counselor(&self, bunk_id: &str, counselor_user_id: Option<&str>) -> Result<Bunk> {
        let body = BunkCounselorUpdate {
            counselor_user_id: counselor_user_id.map(str::to_string),
        };
        self.send_json(
            Method::PATCH,
            &self.url(&["bunks", bunk_id]),
            Some(&body),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let api = ApiClient::new("https://camp.example.org/api/").expect("client");
        assert_eq!(api.base_url(), "https://camp.example.org/api");
        assert_eq!(api.url(&["cabins"]).as_str(), "https://camp.example.org/api/cabins");

        let bare = ApiClient::new("http://localhost:9").expect("client");
        assert_eq!(bare.url(&["cabins"]).as_str(), "http://localhost:9/cabins");
    }

    #[test]
    fn test_ids_are_escaped_into_one_segment() {
        let api = ApiClient::new("https://camp.example.org/api").expect("client");
        assert_eq!(
            api.url(&["assignments", "a/7?x=1"]).as_str(),
            "https://camp.example.org/api/assignments/a%2F7%3Fx=1"
        );
        assert_eq!(
            api.url(&["events", "summer 1", "bunks"]).as_str(),
            "https://camp.example.org/api/events/summer%201/bunks"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(ApiClient::new("not a url").is_err());
        assert!(ApiClient::new("mailto:camp@example.org").is_err());
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        // Nothing listens on the discard port
        let api = ApiClient::new("http://127.0.0.1:9").expect("client");
        let err = api.fetch_cabins().await.expect_err("refused");
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::NetworkError(_))
        ));
    }

    #[test]
    fn test_auth_headers_with_token() {
        let api = ApiClient::new("http://localhost").expect("client");
        assert!(api.auth_headers().expect("headers").get(header::AUTHORIZATION).is_none());

        let mut api = api;
        api.set_token("abc".to_string());
        let headers = api.auth_headers().expect("headers");
        assert_eq!(
            headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()),
            Some("Bearer abc")
        );
    }

    #[test]
    fn test_parse_assignments_response() {
        let json = r#"[{"id":"a7","camper_id":"c42","bunk_id":"B1","event_id":"e1",
            "camper":{"id":"c42","first_name":"Sam","last_name":"Reed","age":12,"gender":"male"}},
            {"id":"a8","camper_id":"c43","bunk_id":"B1","event_id":"e1"}]"#;

        let parsed: Vec<Assignment> = serde_json::from_str(json).expect("assignments json");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].camper_name(), "Sam Reed");
        assert_eq!(parsed[1].camper, None);
    }
}
