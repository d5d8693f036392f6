// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session configuration.

use std::time::Duration;

use crate::auth::Credentials;
use crate::protocol::HttpConfig;

/// What the event stream does with an event for a device missing from the
/// cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownDevicePolicy {
    /// End the subscription with [`Error::UnknownDevice`](crate::Error::UnknownDevice).
    #[default]
    Fail,
    /// Log the event and keep streaming.
    Skip,
}

/// Configuration for a [`Session`](crate::Session).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use insteon_cloud::{SessionConfig, UnknownDevicePolicy};
///
/// let config = SessionConfig::new("user@example.com", "secret", "client-id")
///     .with_poll_interval(Duration::from_millis(500))
///     .with_command_timeout(Some(Duration::from_secs(20)))
///     .with_stream_idle_timeout(Some(Duration::from_secs(300)))
///     .with_unknown_device_policy(UnknownDevicePolicy::Skip);
///
/// assert_eq!(config.poll_interval(), Duration::from_millis(500));
/// assert_eq!(config.credentials().username(), "user@example.com");
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    credentials: Credentials,
    http: HttpConfig,
    poll_interval: Duration,
    command_timeout: Option<Duration>,
    stream_idle_timeout: Option<Duration>,
    unknown_device_policy: UnknownDevicePolicy,
}

impl SessionConfig {
    /// Default delay between command status polls.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
    /// Default bound on submitting and polling one command.
    pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

    /// Creates a configuration for the given account and OAuth client id.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            credentials: Credentials::new(username, password),
            http: HttpConfig::new(client_id),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            command_timeout: Some(Self::DEFAULT_COMMAND_TIMEOUT),
            stream_idle_timeout: None,
            unknown_device_policy: UnknownDevicePolicy::default(),
        }
    }

    /// Replaces the transport configuration, client id included.
    #[must_use]
    pub fn with_http_config(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    /// Sets the delay between command status polls.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Bounds how long one command may stay pending. `None` waits forever.
    #[must_use]
    pub fn with_command_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Bounds the silence between two reads of the event stream. `None`
    /// waits forever.
    #[must_use]
    pub fn with_stream_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stream_idle_timeout = timeout;
        self
    }

    /// Sets how the event stream treats events for unknown devices.
    #[must_use]
    pub fn with_unknown_device_policy(mut self, policy: UnknownDevicePolicy) -> Self {
        self.unknown_device_policy = policy;
        self
    }

    /// Returns the account credentials.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns the transport configuration.
    #[must_use]
    pub fn http(&self) -> &HttpConfig {
        &self.http
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    #[must_use]
    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout
    }

    #[must_use]
    pub fn stream_idle_timeout(&self) -> Option<Duration> {
        self.stream_idle_timeout
    }

    #[must_use]
    pub fn unknown_device_policy(&self) -> UnknownDevicePolicy {
        self.unknown_device_policy
    }
}
