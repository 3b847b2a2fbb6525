//! HTTP response wrapper.

use std::collections::HashMap;

use futures::stream::{self, StreamExt};
use reqwest::{Response, StatusCode};

use crate::error::SyncError;
use crate::scrapers::DocumentStream;

/// HTTP response wrapper.
pub struct HttpResponse {
    pub url: String,
    pub status: StatusCode,
    pub headers: HashMap<String, String>,
    pub(crate) response: Response,
}

impl HttpResponse {
    pub(crate) fn new(url: &str, response: Response) -> Self {
        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(name.to_string(), v.to_string());
            }
        }

        Self {
            url: url.to_string(),
            status: response.status(),
            headers,
            response,
        }
    }

    /// Check if the response is successful.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(|s| s.as_str())
    }

    /// Get the Content-Length header.
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get("content-length")
            .and_then(|s| s.parse().ok())
    }

    /// Get response body as bytes.
    pub async fn bytes(self) -> Result<Vec<u8>, SyncError> {
        self.response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(SyncError::from)
    }

    /// Stream the body chunk by chunk. A transport error mid-body surfaces as
    /// an `Err` item and ends the stream.
    pub fn into_stream(self) -> DocumentStream {
        stream::try_unfold(self.response, |mut response| async move {
            let next = response.chunk().await.map_err(SyncError::from)?;
            Ok::<_, SyncError>(next.map(|chunk| (chunk.to_vec(), response)))
        })
        .boxed()
    }
}
