// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session state tracking.
//!
//! - [`ConnectionState`] - where the session is in its connect lifecycle
//! - [`DeviceCache`] - last-known devices and scenes of the house

mod cache;
mod connection;

pub use cache::DeviceCache;
pub use connection::ConnectionState;
