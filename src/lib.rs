// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `insteon_cloud` - A Rust client for the Insteon cloud API.
//!
//! This library provides an async API to control Insteon devices through the
//! Insteon cloud service.
//!
//! # Supported Features
//!
//! - **Authentication**: OAuth2 password login with silent token refresh
//! - **Discovery**: the account's house, its devices and scenes, cached locally
//! - **Control**: set device levels, switch scenes, query device status
//! - **Events**: live device state changes over the house event stream
//!
//! # Quick Start
//!
//! ```no_run
//! use insteon_cloud::{Session, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> insteon_cloud::Result<()> {
//!     let config = SessionConfig::new("user@example.com", "secret", "my-client-id");
//!     let session = Session::new(config)?;
//!     session.connect().await?;
//!
//!     // Dim a device to 40%
//!     session.set_device_level("1A2B3C", 40).await?;
//!
//!     // Turn a scene on
//!     session.set_scene_state(12, true).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Event Stream
//!
//! ```no_run
//! use insteon_cloud::{Session, SessionConfig};
//!
//! # async fn example(session: Session) -> insteon_cloud::Result<()> {
//! // Callback style: runs until the stream ends or fails
//! session
//!     .subscribe(|device, status| {
//!         println!("{} is now {status}", device.device_name);
//!     })
//!     .await?;
//!
//! // Channel style: read on a background task
//! let mut events = session.spawn_event_stream(64)?;
//! while let Some(event) = events.recv().await {
//!     println!("{} is now {}", event.device.device_name, event.status());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Logging
//!
//! The library emits [`tracing`](https://docs.rs/tracing) events for every
//! request, command transition and stream event. Install a subscriber to see
//! them; without one logging costs nothing.

pub mod auth;
pub mod command;
pub mod error;
pub mod event;
pub mod protocol;
mod session;
pub mod state;
pub mod types;

pub use auth::Credentials;
pub use command::{CommandKind, CommandRequest, CommandStatus};
pub use error::{AuthError, Error, ParseError, ProtocolError, Result, StreamError, ValueError};
pub use event::{DeviceEvent, EventMessage, EventStream};
pub use protocol::{HttpClient, HttpConfig};
pub use session::{Session, SessionConfig, UnknownDevicePolicy};
pub use state::{ConnectionState, DeviceCache};
pub use types::{Device, House, Level, Scene, SceneMember};
