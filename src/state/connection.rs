// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session connection state.

use std::fmt;

/// Lifecycle state of a session.
///
/// A session starts `Disconnected`, moves to `Connecting` while it logs in
/// and loads the house, and becomes `Connected` only once all of that
/// succeeded. A failed connect returns it to `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Not connected. Initial state.
    #[default]
    Disconnected,
    /// `connect` is in progress.
    Connecting,
    /// Logged in with the house and caches loaded.
    Connected,
}

impl ConnectionState {
    /// Returns true if the session is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("disconnected"),
            Self::Connecting => f.write_str("connecting"),
            Self::Connected => f.write_str("connected"),
        }
    }
}
