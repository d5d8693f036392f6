// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory device and scene tables.

use std::collections::HashMap;

use crate::types::{Device, Scene};

/// Last-known devices and scenes of the house.
///
/// Devices are keyed by insteon id, scenes by scene id. Merging a refresh
/// result inserts or replaces the listed entries and leaves every other entry
/// in place, so a device removed from the account stays cached until the
/// session is reconnected.
///
/// # Examples
///
/// ```
/// use insteon_cloud::state::DeviceCache;
/// use insteon_cloud::types::Device;
///
/// let mut cache = DeviceCache::new();
/// let device: Device = serde_json::from_str(
///     r#"{"HouseID": 1, "DeviceID": 7, "InsteonID": "1A2B3C"}"#,
/// ).unwrap();
///
/// cache.merge_devices(vec![device]);
/// assert_eq!(cache.device("1A2B3C").map(|d| d.device_id), Some(7));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DeviceCache {
    devices: HashMap<String, Device>,
    scenes: HashMap<i64, Scene>,
}

impl DeviceCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces devices by insteon id.
    pub fn merge_devices(&mut self, devices: impl IntoIterator<Item = Device>) {
        for device in devices {
            self.devices.insert(device.insteon_id.clone(), device);
        }
    }

    /// Inserts or replaces scenes by scene id.
    pub fn merge_scenes(&mut self, scenes: impl IntoIterator<Item = Scene>) {
        for scene in scenes {
            self.scenes.insert(scene.scene_id, scene);
        }
    }

    /// Looks up a device by insteon id.
    #[must_use]
    pub fn device(&self, insteon_id: &str) -> Option<&Device> {
        self.devices.get(insteon_id)
    }

    /// Looks up a scene by id.
    #[must_use]
    pub fn scene(&self, scene_id: i64) -> Option<&Scene> {
        self.scenes.get(&scene_id)
    }

    /// Returns all devices ordered by insteon id.
    #[must_use]
    pub fn devices(&self) -> Vec<Device> {
        let mut devices: Vec<Device> = self.devices.values().cloned().collect();
        devices.sort_by(|a, b| a.insteon_id.cmp(&b.insteon_id));
        devices
    }

    /// Returns all scenes ordered by scene id.
    #[must_use]
    pub fn scenes(&self) -> Vec<Scene> {
        let mut scenes: Vec<Scene> = self.scenes.values().cloned().collect();
        scenes.sort_by_key(|s| s.scene_id);
        scenes
    }

    #[must_use]
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Returns true if neither devices nor scenes are cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty() && self.scenes.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.devices.clear();
        self.scenes.clear();
    }
}
