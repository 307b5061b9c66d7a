//! HTTP client for Twitter API requests.
//!
//! This module provides a low-level HTTP client wrapper for making requests
//! to the Twitter API, handling authentication headers, status mapping, and
//! JSON decoding. It never retries; every failure comes back as a
//! [`FetchError`].

use super::error::FetchError;
use super::session::Session;
use log::*;
use reqwest::{Method, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

/// Makes requests to Twitter and returns decoded JSON or a typed error.
///
pub struct Client {
    pub(crate) base_url: String,
    pub(crate) http_client: reqwest::Client,
}

impl Client {
    /// Returns a new instance for the given base URL and request timeout.
    ///
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("twitter-preview/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Unreachable(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Client {
            base_url: base_url.trim_end_matches('/').to_owned(),
            http_client,
        })
    }

    /// Prepare a request against a path relative to the base URL.
    ///
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request_url = format!("{}/{}", &self.base_url, path.trim_start_matches('/'));
        self.http_client.request(method, request_url)
    }

    /// Make an authenticated GET request and return the decoded body.
    ///
    pub async fn get(
        &self,
        path: &str,
        params: &[(&str, &str)],
        session: &Session,
    ) -> Result<Value, FetchError> {
        let mut request = self
            .request(Method::GET, path)
            .query(params)
            .bearer_auth(&session.token);
        if let Some(csrf) = &session.csrf_token {
            request = request.header("x-csrf-token", csrf);
        }
        self.send(request).await
    }

    /// Send a prepared request and decode its body, mapping failures.
    ///
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Value, FetchError> {
        let response = request.send().await?;
        let status = response.status();
        let response_bytes = response.bytes().await?;

        if !status.is_success() {
            let payload = serde_json::from_slice::<Value>(&response_bytes).ok();
            debug!(
                "API request failed with status {}: {}",
                status,
                String::from_utf8_lossy(&response_bytes)
            );
            return Err(FetchError::from_status(status, payload.as_ref()));
        }

        match serde_json::from_slice::<Value>(&response_bytes) {
            Ok(value) => Ok(value),
            Err(e) => {
                debug!(
                    "Failed to deserialize API response: {}. Response body: {}",
                    e,
                    String::from_utf8_lossy(&response_bytes)
                );
                Err(e.into())
            }
        }
    }
}
