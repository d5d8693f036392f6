// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene descriptors as returned by `GET /scenes?properties=all`.

use serde::{Deserialize, Serialize};

/// A scene: a named group action over several devices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    /// Cloud-assigned scene id, used to key the cache and to issue commands.
    #[serde(rename = "SceneID")]
    pub scene_id: i64,
    #[serde(rename = "HouseID")]
    pub house_id: i64,
    /// Insteon group number.
    #[serde(rename = "Group", default)]
    pub group: i64,
    #[serde(rename = "SceneName", default)]
    pub scene_name: String,
    /// Insteon id of the device reporting the scene status.
    #[serde(rename = "StatusDevice", default)]
    pub status_device: String,
    /// Devices taking part in the scene.
    #[serde(rename = "DeviceList", default)]
    pub device_list: Vec<SceneMember>,
}

/// Membership of one device in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneMember {
    #[serde(rename = "DeviceID")]
    pub device_id: i64,
    /// Level the device goes to when the scene is turned on.
    #[serde(rename = "OnLevel", default)]
    pub on_level: i64,
    /// Controller/responder role bits.
    #[serde(rename = "DeviceRoleMask", default)]
    pub role_mask: i64,
    #[serde(rename = "DeviceGroupDetailID", default)]
    pub group_detail_id: i64,
    #[serde(rename = "RampRate", default)]
    pub ramp_rate: i64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SceneList {
    #[serde(rename = "SceneList", default)]
    pub scenes: Vec<Scene>,
}
