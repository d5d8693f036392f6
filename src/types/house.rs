// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! House descriptors as returned by `GET /houses`.

use serde::{Deserialize, Serialize};

/// The top-level location grouping devices and scenes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct House {
    #[serde(rename = "HouseID")]
    pub house_id: i64,
    #[serde(rename = "HouseName", default)]
    pub house_name: String,
    #[serde(rename = "IconID", default)]
    pub icon_id: i64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HouseList {
    #[serde(rename = "HouseList", default)]
    pub houses: Vec<House>,
}
