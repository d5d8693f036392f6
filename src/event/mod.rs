// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Live device events from the house stream.
//!
//! The cloud pushes device state changes over a long-lived
//! `GET /houses/{id}/stream` response framed as server-sent events. Each
//! `data:` frame holds an [`EventMessage`]; the session resolves its device id
//! against the cache and delivers a [`DeviceEvent`], either to a callback
//! ([`Session::subscribe`](crate::Session::subscribe)) or through an
//! [`EventStream`] channel
//! ([`Session::spawn_event_stream`](crate::Session::spawn_event_stream)).

mod frame;
mod message;
mod stream;

pub(crate) use frame::{LineBuffer, parse_frame};

pub use message::{DeviceEvent, EventMessage};
pub use stream::{DEFAULT_EVENT_CAPACITY, EventStream};
