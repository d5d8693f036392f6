// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cloud command definitions.
//!
//! Commands are submitted with `POST /commands` and complete asynchronously:
//! the server answers with a command id and a status, and the client polls
//! `GET /commands/{id}` while the status is `pending`. Run them with
//! [`Session::execute`](crate::Session::execute).
//!
//! # Examples
//!
//! ```
//! use insteon_cloud::command::{CommandKind, CommandRequest};
//!
//! let on = CommandRequest::device(CommandKind::On, 55, 80);
//! assert_eq!(
//!     serde_json::to_value(&on).unwrap(),
//!     serde_json::json!({"command": "on", "device_id": 55, "level": 80})
//! );
//!
//! let scene_off = CommandRequest::scene(CommandKind::Off, 9);
//! assert_eq!(
//!     serde_json::to_value(&scene_off).unwrap(),
//!     serde_json::json!({"command": "off", "scene_id": 9})
//! );
//! ```

mod executor;

pub(crate) use executor::CommandExecutor;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Level;

/// The action a command performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// Turn on, to the given level for devices.
    On,
    /// Turn off.
    Off,
    /// Query the current level of a device.
    GetStatus,
}

impl CommandKind {
    /// Returns the wire name of the command.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::GetStatus => "get_status",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a `POST /commands` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CommandRequest {
    /// A command addressed to a single device.
    Device {
        command: CommandKind,
        /// Cloud device id (not the insteon id).
        device_id: i64,
        level: u8,
    },
    /// A command addressed to a scene.
    Scene { command: CommandKind, scene_id: i64 },
}

impl CommandRequest {
    /// Creates a device command.
    #[must_use]
    pub fn device(command: CommandKind, device_id: i64, level: u8) -> Self {
        Self::Device {
            command,
            device_id,
            level,
        }
    }

    /// Creates a scene command.
    #[must_use]
    pub fn scene(command: CommandKind, scene_id: i64) -> Self {
        Self::Scene { command, scene_id }
    }

    /// Returns the command kind.
    #[must_use]
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Device { command, .. } | Self::Scene { command, .. } => *command,
        }
    }
}

/// Server-reported state of a command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum CommandStatus {
    /// Still executing; poll again.
    Pending,
    Succeeded,
    Failed,
    /// Any other terminal status reported by the server.
    Other(String),
}

impl CommandStatus {
    /// Returns true while the command is still executing.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl From<String> for CommandStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "pending" => Self::Pending,
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            _ => Self::Other(status),
        }
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Succeeded => f.write_str("succeeded"),
            Self::Failed => f.write_str("failed"),
            Self::Other(status) => f.write_str(status),
        }
    }
}

/// Envelope returned by `POST /commands` and `GET /commands/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CommandResponse {
    pub id: i64,
    pub status: CommandStatus,
    #[serde(default)]
    pub link: String,
    /// Command-specific result, present once the command completed.
    #[serde(default)]
    pub response: Option<serde_json::Value>,
}

/// Payload of a completed `get_status` command.
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct StatusPayload {
    pub level: Level,
}
