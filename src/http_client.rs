//! HTTP client abstraction for the chat-completions API.
//!
//! A thin trait over the POST-with-JSON call the generator makes, so tests
//! can substitute canned responses without touching the network.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

/// Trait for posting JSON to a bearer-authenticated endpoint.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends a POST request with a JSON body and returns the response body
    /// as text. Transport and HTTP-level failures surface as errors; the
    /// caller interprets the body.
    async fn post_json(
        &self,
        url: &str,
        bearer_token: &str,
        body: &serde_json::Value,
    ) -> Result<String>;
}

/// Production client backed by reqwest.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn post_json(
        &self,
        url: &str,
        bearer_token: &str,
        body: &serde_json::Value,
    ) -> Result<String> {
        let response = self
            .client
            .post(url)
            .bearer_auth(bearer_token)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        Ok(response.text().await?)
    }
}
