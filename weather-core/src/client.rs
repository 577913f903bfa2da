use async_trait::async_trait;
use reqwest::{Client, header};
use serde::de::DeserializeOwned;
use std::{
    fmt::Debug,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    error::{ApiError, ErrorResponse},
    model::{HEALTH_PATH, HealthResponse, SearchRequest, WeatherResponse},
};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Anything that can answer a weather search.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_weather(
        &self,
        request: &SearchRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<WeatherResponse, ApiError>;
}

/// Liveness probe used by the heartbeat.
#[async_trait]
pub trait HealthProbe: Send + Sync + Debug {
    async fn check(&self, cancel: &CancellationToken) -> Result<HealthResponse, ApiError>;
}

/// JSON-over-HTTP client for the weather API.
///
/// Every request runs under its own cancellation token, cancelled by a
/// deadline timer and by the caller's token when one is supplied. All
/// failures come back as [`ApiError`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    timeout: Duration,
    http: Client,
    live_timers: Arc<AtomicUsize>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            base_url,
            timeout,
            http: Client::new(),
            live_timers: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Number of deadline timers currently armed by in-flight requests.
    pub fn live_timers(&self) -> usize {
        self.live_timers.load(Ordering::SeqCst)
    }

    /// GET `path` and decode the JSON body as `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, ApiError> {
        let token = match cancel {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };
        let _deadline = Deadline::arm(token.clone(), self.timeout, &self.live_timers);

        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "GET");

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => Err(ApiError::timed_out()),
            result = self.send::<T>(&url) => result,
        };

        match &result {
            Ok(_) => tracing::debug!(%url, "request succeeded"),
            Err(err) => tracing::debug!(
                %url,
                code = err.code(),
                status = ?err.status(),
                "request failed: {err}"
            ),
        }

        result
    }

    async fn send<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let res = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::normalize(None, None, Some(&e.to_string())))?;

        let status = res.status();
        let body = res
            .bytes()
            .await
            .map_err(|e| ApiError::normalize(None, None, Some(&e.to_string())))?;

        if !status.is_success() {
            let detail = serde_json::from_slice::<ErrorResponse>(&body)
                .ok()
                .map(|payload| payload.error);
            return Err(ApiError::normalize(detail, Some(status.as_u16()), None));
        }

        serde_json::from_slice(&body)
            .map_err(|e| ApiError::normalize(None, None, Some(&e.to_string())))
    }

    pub async fn fetch_health(
        &self,
        cancel: Option<&CancellationToken>,
    ) -> Result<HealthResponse, ApiError> {
        self.request(HEALTH_PATH, cancel).await
    }
}

#[async_trait]
impl WeatherSource for ApiClient {
    async fn fetch_weather(
        &self,
        request: &SearchRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<WeatherResponse, ApiError> {
        self.request(&request.path(), cancel).await
    }
}

#[async_trait]
impl HealthProbe for ApiClient {
    async fn check(&self, cancel: &CancellationToken) -> Result<HealthResponse, ApiError> {
        self.fetch_health(Some(cancel)).await
    }
}

/// Deadline timer for one request. Dropping it disarms the timer, so it is
/// released on every exit path of [`ApiClient::request`].
struct Deadline {
    task: JoinHandle<()>,
    live: Arc<AtomicUsize>,
}

impl Deadline {
    fn arm(token: CancellationToken, timeout: Duration, live: &Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);

        let task = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            tracing::debug!(?timeout, "request deadline reached");
            token.cancel();
        });

        Self {
            task,
            live: Arc::clone(live),
        }
    }
}

impl Drop for Deadline {
    fn drop(&mut self) {
        self.task.abort();
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.timeout(), DEFAULT_REQUEST_TIMEOUT);
    }

    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let port = listener.local_addr().expect("local addr").port();
        drop(listener);
        format!("http://127.0.0.1:{port}")
    }

    #[tokio::test]
    async fn cancelled_parent_aborts_before_sending() {
        let client = ApiClient::new(closed_port_url());
        let parent = CancellationToken::new();
        parent.cancel();

        let err = client
            .fetch_health(Some(&parent))
            .await
            .expect_err("request should be aborted");

        assert!(err.is_timeout());
        assert_eq!(client.live_timers(), 0);
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let client = ApiClient::with_timeout(closed_port_url(), Duration::from_secs(5));

        let err = client
            .fetch_health(None)
            .await
            .expect_err("nothing listens on a closed port");

        assert_eq!(err.code(), "NETWORK_ERROR");
        assert_eq!(err.status(), None);
        assert_eq!(client.live_timers(), 0);
    }
}
