// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device descriptors as returned by `GET /devices?properties=all`.

use serde::{Deserialize, Serialize};

/// A device registered in the house.
///
/// Only the identifying fields are decoded; the cloud API returns many more
/// properties which are ignored. A `Device` is an immutable snapshot that is
/// replaced as a whole on each cache refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// House the device belongs to.
    #[serde(rename = "HouseID")]
    pub house_id: i64,
    /// Cloud-assigned numeric id, used when issuing commands.
    #[serde(rename = "DeviceID")]
    pub device_id: i64,
    /// User-facing name.
    #[serde(rename = "DeviceName", default)]
    pub device_name: String,
    /// Insteon device category.
    #[serde(rename = "DevCat", default)]
    pub device_category: i64,
    /// Insteon device subcategory.
    #[serde(rename = "SubCat", default)]
    pub device_subcategory: i64,
    #[serde(rename = "DeviceType", default)]
    pub device_type: i64,
    #[serde(rename = "FirmwareVersion", default)]
    pub firmware_version: i64,
    /// Stable hardware address, used to key the cache and to match events.
    #[serde(rename = "InsteonID")]
    pub insteon_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DeviceList {
    #[serde(rename = "DeviceList", default)]
    pub devices: Vec<Device>,
}
