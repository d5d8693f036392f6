// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Authenticated HTTP transport for the Insteon cloud API.

use std::time::Duration;

use reqwest::{Client, Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::auth::{Credentials, Token, TokenStore};
use crate::error::{AuthError, Error, ParseError, ProtocolError};

// ============================================================================
// HttpConfig - Connection parameters for the cloud API
// ============================================================================

/// Configuration for the cloud API transport.
///
/// # Examples
///
/// ```
/// use insteon_cloud::protocol::HttpConfig;
/// use std::time::Duration;
///
/// // Defaults: public endpoint, 10 s timeout, one refresh-and-retry
/// let config = HttpConfig::new("my-client-id");
///
/// // With all options
/// let config = HttpConfig::new("my-client-id")
///     .with_base_url("http://127.0.0.1:8080")
///     .with_timeout(Duration::from_secs(5))
///     .with_connect_timeout(Duration::from_secs(2))
///     .with_max_auth_retries(2);
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    base_url: String,
    client_id: String,
    timeout: Duration,
    connect_timeout: Duration,
    max_auth_retries: u32,
}

impl HttpConfig {
    /// Public API endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://connect.insteon.com/api/v2";
    /// Default timeout for ordinary requests.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
    /// Default TCP/TLS connect timeout.
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
    /// Default number of refresh-and-retry rounds after a transport failure.
    pub const DEFAULT_MAX_AUTH_RETRIES: u32 = 1;

    /// Creates a configuration using the given OAuth client id, which also
    /// serves as the API key.
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            client_id: client_id.into(),
            timeout: Self::DEFAULT_TIMEOUT,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            max_auth_retries: Self::DEFAULT_MAX_AUTH_RETRIES,
        }
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the timeout for ordinary requests.
    ///
    /// The event stream is exempt; see
    /// [`SessionConfig::with_stream_idle_timeout`](crate::SessionConfig::with_stream_idle_timeout).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connect timeout, applied to every request.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets how many times a request is retried after a transport failure,
    /// each retry preceded by a token refresh. Zero disables the retry.
    #[must_use]
    pub fn with_max_auth_retries(mut self, retries: u32) -> Self {
        self.max_auth_retries = retries;
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the client id.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the connect timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the retry bound.
    #[must_use]
    pub fn max_auth_retries(&self) -> u32 {
        self.max_auth_retries
    }

    /// Creates an `HttpClient` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is not an `http(s)` URL or the HTTP
    /// client cannot be created.
    pub fn into_client(self) -> Result<HttpClient, ProtocolError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ProtocolError::InvalidAddress(self.base_url));
        }

        let client = Client::builder()
            .connect_timeout(self.connect_timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(HttpClient {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            client_id: self.client_id,
            timeout: self.timeout,
            max_auth_retries: self.max_auth_retries,
            client,
            tokens: TokenStore::new(),
        })
    }
}

// ============================================================================
// HttpClient - Authenticated requests with refresh-and-retry
// ============================================================================

/// Path of the OAuth token endpoint.
const TOKEN_PATH: &str = "/oauth2/token";

/// HTTP client for the cloud API.
///
/// Every request carries the API key and the current bearer token. When a
/// request fails at the transport level the token is refreshed and the
/// request retried, up to [`HttpConfig::max_auth_retries`] times. HTTP error
/// statuses are never retried.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    client_id: String,
    timeout: Duration,
    max_auth_retries: u32,
    client: Client,
    tokens: TokenStore,
}

impl HttpClient {
    /// Returns the base URL of the API.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    // ========== OAuth ==========

    /// Logs in with the password grant and stores the resulting token.
    pub(crate) async fn login(&self, credentials: &Credentials) -> Result<(), AuthError> {
        let token = self
            .request_token(&[
                ("grant_type", "password"),
                ("client_id", self.client_id.as_str()),
                ("username", credentials.username()),
                ("password", credentials.password()),
            ])
            .await?;
        self.tokens.replace(token);

        tracing::info!(username = %credentials.username(), "Logged in");
        Ok(())
    }

    /// Refreshes the token unless it already changed since `seen_generation`.
    ///
    /// Concurrent callers that observed the same stale token wait for the
    /// first refresh and then skip their own.
    pub(crate) async fn refresh(&self, seen_generation: u64) -> Result<(), AuthError> {
        let _guard = self.tokens.lock_refresh().await;

        if self.tokens.generation() != seen_generation {
            tracing::debug!("Token already refreshed by another request");
            return Ok(());
        }

        let refresh_token = self
            .tokens
            .refresh_token()
            .ok_or(AuthError::NotAuthenticated)?;

        tracing::debug!("Refreshing token");

        let mut token = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("refresh_token", refresh_token.as_str()),
            ])
            .await?;
        // The server may omit the refresh token, keeping the previous one valid
        if token.refresh_token.is_empty() {
            token.refresh_token = refresh_token;
        }
        self.tokens.replace(token);
        Ok(())
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<Token, AuthError> {
        let response = self
            .client
            .post(self.url(TOKEN_PATH))
            .timeout(self.timeout)
            .form(form)
            .send()
            .await
            .map_err(AuthError::Http)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Token request rejected");
            return Err(AuthError::Rejected {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(AuthError::Http)?;
        serde_json::from_slice(&body).map_err(AuthError::InvalidResponse)
    }

    // ========== Authenticated requests ==========

    /// Sends an authenticated request, refreshing and retrying on transport
    /// failure.
    ///
    /// `streaming` requests have no overall timeout; the caller bounds reads
    /// of the body instead.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        streaming: bool,
    ) -> Result<Response, Error> {
        let url = self.url(path);
        let mut attempt = 0;

        loop {
            let (access_token, generation) = self.tokens.access();

            let mut request = self
                .client
                .request(method.clone(), &url)
                .header("Authentication", format!("APIKey {}", self.client_id))
                .bearer_auth(access_token);
            if !streaming {
                request = request.timeout(self.timeout);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            tracing::debug!(method = %method, url = %url, attempt, "Sending HTTP request");

            match request.send().await {
                Ok(response) => {
                    tracing::debug!(
                        method = %method,
                        url = %url,
                        status = response.status().as_u16(),
                        "Received HTTP response"
                    );
                    return Ok(response);
                }
                Err(err) => {
                    tracing::warn!(method = %method, url = %url, error = %err, "HTTP request failed");

                    if attempt >= self.max_auth_retries {
                        return Err(ProtocolError::Http(err).into());
                    }
                    attempt += 1;
                    self.refresh(generation).await?;
                }
            }
        }
    }

    /// Sends a GET and decodes the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let response = self.send(Method::GET, path, None, false).await?;
        Self::decode(response).await
    }

    /// Sends a POST with a JSON body and decodes the JSON response.
    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body).map_err(ParseError::Json)?;
        let response = self.send(Method::POST, path, Some(&body), false).await?;
        Self::decode(response).await
    }

    /// Opens a long-lived GET whose body is read incrementally.
    pub(crate) async fn open_stream(&self, path: &str) -> Result<Response, Error> {
        self.send(Method::GET, path, None, true).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProtocolError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let body = response.bytes().await.map_err(ProtocolError::Http)?;
        serde_json::from_slice(&body).map_err(|e| ParseError::Json(e).into())
    }
}
