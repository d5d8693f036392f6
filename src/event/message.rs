// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event payloads carried by the house stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Device;

/// A device state change as sent in a `data:` frame of the house stream.
///
/// # Examples
///
/// ```
/// use insteon_cloud::event::EventMessage;
///
/// let json = r#"{
///     "hub_insteon_id": "4A5B6C",
///     "device_insteon_id": "1A2B3C",
///     "device_group": 1,
///     "status": "on",
///     "received_at": "2024-03-01T18:22:05Z"
/// }"#;
///
/// let message: EventMessage = serde_json::from_str(json).unwrap();
/// assert_eq!(message.device_insteon_id, "1A2B3C");
/// assert_eq!(message.status, "on");
/// assert!(message.received_at.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMessage {
    /// Insteon id of the hub that relayed the event.
    #[serde(default)]
    pub hub_insteon_id: String,
    /// Insteon id of the device whose state changed.
    pub device_insteon_id: String,
    #[serde(default)]
    pub device_group: i64,
    /// New status, e.g. `"on"` or `"off"`.
    pub status: String,
    /// When the cloud received the event.
    #[serde(default)]
    pub received_at: Option<DateTime<Utc>>,
}

/// An event resolved against the device cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEvent {
    /// Cached descriptor of the device the event refers to.
    pub device: Device,
    /// The raw event.
    pub message: EventMessage,
}

impl DeviceEvent {
    /// Returns the reported status.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.message.status
    }
}
