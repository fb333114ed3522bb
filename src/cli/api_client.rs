use reqwest::Client;
use std::env;

/// Default API server address
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// API client for the docsnap REST API
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// Priority for base URL:
    /// 1. Explicit `api_url` parameter
    /// 2. DOCSNAP_API_URL environment variable
    /// 3. Default: http://localhost:3000
    ///
    /// The token falls back to DOCSNAP_API_TOKEN; empty values send no header.
    pub fn new(api_url: Option<String>, token: Option<String>) -> Self {
        let base_url = api_url
            .or_else(|| env::var("DOCSNAP_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let token = token
            .or_else(|| env::var("DOCSNAP_API_TOKEN").ok())
            .filter(|t| !t.is_empty());

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client: Client::new(),
        }
    }

    /// Get the base URL being used
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Create a POST request builder, with bearer auth when a token is set
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.post(&url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

#[cfg(test)]
#[path = "api_client_test.rs"]
mod api_client_test;
