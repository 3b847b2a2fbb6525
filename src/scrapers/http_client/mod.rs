//! HTTP client with a fixed politeness delay and bounded timeouts.
//!
//! The timeout bounds connecting and each stall while reading, not the whole
//! transfer, so large documents on a slow link still complete.

mod response;
mod user_agent;

pub use response::HttpResponse;
pub use user_agent::{resolve_user_agent, USER_AGENT};

use std::time::{Duration, Instant};

use reqwest::Client;

use crate::error::SyncError;

/// Thin wrapper over `reqwest::Client` used for every remote call.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    request_delay: Duration,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(timeout: Duration, request_delay: Duration) -> Result<Self, SyncError> {
        Self::with_user_agent(timeout, request_delay, None)
    }

    /// Create a new HTTP client with custom user agent configuration.
    /// - None: Use default user agent
    /// - Some("impersonate"): Use random real browser user agent
    /// - Some(custom): Use custom user agent string
    pub fn with_user_agent(
        timeout: Duration,
        request_delay: Duration,
        user_agent_config: Option<&str>,
    ) -> Result<Self, SyncError> {
        let user_agent = resolve_user_agent(user_agent_config);
        let client = Client::builder()
            .user_agent(&user_agent)
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| SyncError::RemoteUnavailable(format!("failed to build client: {}", e)))?;

        Ok(Self {
            client,
            request_delay,
        })
    }

    pub fn request_delay(&self) -> Duration {
        self.request_delay
    }

    /// Make a GET request.
    ///
    /// Transport failures and timeouts map to `RemoteUnavailable`; the status
    /// code is left for the caller to inspect. The politeness delay is applied
    /// after the response headers arrive.
    pub async fn get(&self, url: &str) -> Result<HttpResponse, SyncError> {
        let start = Instant::now();
        let result = self.client.get(url).send().await;
        let duration = start.elapsed();

        let response = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("GET {} failed after {:?}: {}", url, duration, e);
                tokio::time::sleep(self.request_delay).await;
                return Err(e.into());
            }
        };

        tracing::debug!("GET {} -> {} in {:?}", url, response.status(), duration);

        tokio::time::sleep(self.request_delay).await;

        Ok(HttpResponse::new(url, response))
    }

    /// GET a URL and require a success status.
    pub async fn get_success(&self, url: &str) -> Result<HttpResponse, SyncError> {
        let response = self.get(url).await?;
        if !response.is_success() {
            return Err(SyncError::RemoteUnavailable(format!(
                "HTTP {} for {}",
                response.status, url
            )));
        }
        Ok(response)
    }

    /// GET a URL and return the full body of a successful response.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, SyncError> {
        self.get_success(url).await?.bytes().await
    }
}
