// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP transport for the Insteon cloud REST API.
//!
//! [`HttpConfig`] holds the connection parameters and builds an
//! [`HttpClient`], which attaches the API key and bearer token to every
//! request and recovers from transport failures by refreshing the token and
//! retrying.

mod http;

pub use http::{HttpClient, HttpConfig};
