// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bearer token storage.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::Deserialize;

/// OAuth2 token pair returned by `POST /oauth2/token`.
#[derive(Clone, Default, Deserialize)]
pub(crate) struct Token {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: u64,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Shared, versioned token cell.
///
/// Every replacement bumps a generation counter. Requests remember the
/// generation of the token they were sent with so that a refresh triggered by
/// a stale request can be skipped once another caller already replaced it.
#[derive(Debug, Clone, Default)]
pub(crate) struct TokenStore {
    token: Arc<RwLock<Token>>,
    generation: Arc<AtomicU64>,
    refresh_lock: Arc<tokio::sync::Mutex<()>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current access token and its generation.
    pub fn access(&self) -> (String, u64) {
        let token = self.token.read();
        (
            token.access_token.clone(),
            self.generation.load(Ordering::Acquire),
        )
    }

    /// Returns the current refresh token, if a login has happened.
    pub fn refresh_token(&self) -> Option<String> {
        let token = self.token.read();
        (!token.refresh_token.is_empty()).then(|| token.refresh_token.clone())
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Replaces the stored token and advances the generation.
    pub fn replace(&self, token: Token) {
        let mut guard = self.token.write();
        *guard = token;
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Serializes refreshes. Held across the token request.
    pub async fn lock_refresh(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.refresh_lock.lock().await
    }
}
