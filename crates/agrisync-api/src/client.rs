//! Calendar service HTTP client
//!
//! Provides a typed HTTP client for the calendar REST service. Handles
//! authentication headers, request timeouts, and endpoint construction.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use agrisync_api::client::ApiClient;
//!
//! # fn example() -> anyhow::Result<()> {
//! let client = ApiClient::new("https://api.agrisync.dev/v1")?
//!     .with_token("bearer-token-here");
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder};
use tracing::debug;

/// Default per-request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for calendar service calls
///
/// Wraps `reqwest::Client` with bearer authentication and base URL
/// construction. The base URL is injectable so tests can point the client
/// at a mock server.
pub struct ApiClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for API requests
    base_url: String,
    /// Bearer token, if the user is signed in
    token: Option<String>,
}

impl ApiClient {
    /// Creates a new ApiClient against the given base URL
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the calendar service (no trailing slash)
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a new ApiClient with a custom request timeout
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the calendar service
    /// * `timeout` - Per-request timeout; expiry surfaces as a network failure
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            token: None,
        })
    }

    /// Sets the bearer token (builder style)
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Updates the bearer token (e.g. after a re-login)
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
        debug!("Updated ApiClient bearer token");
    }

    /// Returns the current bearer token, if any
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the base URL for API requests
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates an authenticated request builder for the given method and path
    ///
    /// Automatically prepends the base URL and adds the Authorization header
    /// when a token is set.
    ///
    /// # Arguments
    /// * `method` - HTTP method (GET, POST, PUT, DELETE)
    /// * `path` - API path relative to the base URL (e.g. "/calendars")
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, &url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}
