// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data types exchanged with the Insteon cloud API.
//!
//! [`Device`], [`Scene`] and [`House`] mirror the JSON descriptors returned by
//! the list endpoints. [`Level`] is the validated 0-100 on-level used by
//! device commands and status queries.

mod device;
mod house;
mod level;
mod scene;

pub(crate) use device::DeviceList;
pub(crate) use house::HouseList;
pub(crate) use scene::SceneList;

pub use device::Device;
pub use house::House;
pub use level::Level;
pub use scene::{Scene, SceneMember};
