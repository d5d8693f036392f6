// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connected session with the Insteon cloud.
//!
//! A [`Session`] logs in, discovers the single house of the account, caches
//! its devices and scenes, and then serves lookups, control commands and the
//! live event stream.
//!
//! ```no_run
//! use insteon_cloud::{Session, SessionConfig};
//!
//! # async fn example() -> insteon_cloud::Result<()> {
//! let session = Session::new(SessionConfig::new("user@example.com", "secret", "client-id"))?;
//! session.connect().await?;
//!
//! for device in session.devices()? {
//!     println!("{} ({})", device.device_name, device.insteon_id);
//! }
//!
//! session.set_device_level("1A2B3C", 60).await?;
//! let level = session.status("1A2B3C").await?;
//! println!("now at {level}");
//! # Ok(())
//! # }
//! ```

mod config;

pub use config::{SessionConfig, UnknownDevicePolicy};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::StatusCode;
use serde::de::{DeserializeOwned, IgnoredAny};
use tokio::sync::mpsc;

use crate::auth::Credentials;
use crate::command::{CommandExecutor, CommandKind, CommandRequest, StatusPayload};
use crate::error::{Error, ParseError, Result, StreamError};
use crate::event::{DeviceEvent, EventStream, LineBuffer, parse_frame};
use crate::protocol::HttpClient;
use crate::state::{ConnectionState, DeviceCache};
use crate::types::{Device, DeviceList, HouseList, Level, Scene, SceneList};

const HOUSES_PATH: &str = "/houses";
const DEVICES_PATH: &str = "/devices?properties=all";
const SCENES_PATH: &str = "/scenes?properties=all";

/// State shared by all clones of a session, guarded by one lock.
#[derive(Debug, Default)]
struct SharedState {
    connection: ConnectionState,
    house_id: Option<i64>,
    cache: DeviceCache,
}

#[derive(Debug)]
struct Inner {
    client: HttpClient,
    credentials: Credentials,
    poll_interval: Duration,
    command_timeout: Option<Duration>,
    stream_idle_timeout: Option<Duration>,
    unknown_device_policy: UnknownDevicePolicy,
    state: Mutex<SharedState>,
}

/// A session with the Insteon cloud.
///
/// Cloning is cheap; clones share the token, the cache and the connection
/// state, so a session can be handed to several tasks at once.
///
/// Every operation except [`connect`](Self::connect) requires a connected
/// session and fails with [`Error::NotConnected`] otherwise, without touching
/// the network.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl Session {
    /// Creates a disconnected session.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created from the
    /// configuration.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let client = config.http().clone().into_client()?;

        Ok(Self {
            inner: Arc::new(Inner {
                client,
                credentials: config.credentials().clone(),
                poll_interval: config.poll_interval(),
                command_timeout: config.command_timeout(),
                stream_idle_timeout: config.stream_idle_timeout(),
                unknown_device_policy: config.unknown_device_policy(),
                state: Mutex::new(SharedState::default()),
            }),
        })
    }

    // ========== Lifecycle ==========

    /// Returns the current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.inner.state.lock().connection
    }

    /// Returns true once [`connect`](Self::connect) has succeeded.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Returns the id of the house, once connected.
    #[must_use]
    pub fn house_id(&self) -> Option<i64> {
        let state = self.inner.state.lock();
        state.connection.is_connected().then_some(state.house_id).flatten()
    }

    /// Logs in, discovers the house and loads its devices and scenes.
    ///
    /// The session becomes connected only if every step succeeds. On failure
    /// it goes back to disconnected with an empty cache, so `connect` can be
    /// called again.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyConnected`] if the session is connected or connecting
    /// - [`Error::Auth`] if login fails
    /// - [`Error::HouseCount`] if the account does not have exactly one house
    /// - transport or parse errors from the list endpoints
    pub async fn connect(&self) -> Result<()> {
        let guard = ConnectGuard::begin(&self.inner.state)?;

        self.inner.client.login(&self.inner.credentials).await?;
        tracing::info!("Login succeeded");

        let house_id = self.find_house_id().await?;
        tracing::info!(house_id, "Found house");

        let devices = self.fetch_devices().await?;
        let scenes = self.fetch_scenes().await?;

        guard.commit(house_id, devices, scenes);
        Ok(())
    }

    async fn find_house_id(&self) -> Result<i64> {
        let list: HouseList = self.inner.client.get_json(HOUSES_PATH).await?;
        match list.houses.as_slice() {
            [house] => Ok(house.house_id),
            houses => {
                tracing::warn!(count = houses.len(), "Expected exactly one house");
                Err(Error::HouseCount(houses.len()))
            }
        }
    }

    async fn fetch_devices(&self) -> Result<Vec<Device>> {
        let list: DeviceList = self.inner.client.get_json(DEVICES_PATH).await?;
        Ok(list.devices)
    }

    async fn fetch_scenes(&self) -> Result<Vec<Scene>> {
        let list: SceneList = self.inner.client.get_json(SCENES_PATH).await?;
        Ok(list.scenes)
    }

    // ========== Cache ==========

    /// Reloads devices and scenes into the cache.
    ///
    /// Listed entries are inserted or replaced. Entries the server no longer
    /// lists are kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] before a successful connect, or the
    /// transport error of either list request.
    pub async fn refresh_devices_and_scenes(&self) -> Result<()> {
        self.ensure_connected()?;

        let devices = self.fetch_devices().await?;
        self.inner.state.lock().cache.merge_devices(devices);

        let scenes = self.fetch_scenes().await?;
        let mut state = self.inner.state.lock();
        state.cache.merge_scenes(scenes);
        tracing::info!(
            devices = state.cache.device_count(),
            scenes = state.cache.scene_count(),
            "Refreshed devices and scenes"
        );
        Ok(())
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(Error::NotConnected)
        }
    }

    /// Returns the cached device with the given insteon id.
    ///
    /// # Errors
    ///
    /// [`Error::NotConnected`] or [`Error::UnknownDevice`].
    pub fn device(&self, insteon_id: &str) -> Result<Device> {
        let state = self.inner.state.lock();
        if !state.connection.is_connected() {
            return Err(Error::NotConnected);
        }
        state
            .cache
            .device(insteon_id)
            .cloned()
            .ok_or_else(|| Error::UnknownDevice(insteon_id.to_string()))
    }

    /// Returns all cached devices, ordered by insteon id.
    ///
    /// # Errors
    ///
    /// [`Error::NotConnected`].
    pub fn devices(&self) -> Result<Vec<Device>> {
        let state = self.inner.state.lock();
        if !state.connection.is_connected() {
            return Err(Error::NotConnected);
        }
        Ok(state.cache.devices())
    }

    /// Returns the cached scene with the given id.
    ///
    /// # Errors
    ///
    /// [`Error::NotConnected`] or [`Error::UnknownScene`].
    pub fn scene(&self, scene_id: i64) -> Result<Scene> {
        let state = self.inner.state.lock();
        if !state.connection.is_connected() {
            return Err(Error::NotConnected);
        }
        state
            .cache
            .scene(scene_id)
            .cloned()
            .ok_or(Error::UnknownScene(scene_id))
    }

    /// Returns all cached scenes, ordered by scene id.
    ///
    /// # Errors
    ///
    /// [`Error::NotConnected`].
    pub fn scenes(&self) -> Result<Vec<Scene>> {
        let state = self.inner.state.lock();
        if !state.connection.is_connected() {
            return Err(Error::NotConnected);
        }
        Ok(state.cache.scenes())
    }

    // ========== Commands ==========

    /// Runs a raw command and decodes its result payload, if any.
    ///
    /// # Errors
    ///
    /// [`Error::NotConnected`], [`Error::CommandFailed`], [`Error::Timeout`],
    /// or transport and parse errors.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: &CommandRequest,
    ) -> Result<Option<T>> {
        self.ensure_connected()?;
        CommandExecutor::new(&self.inner.client, self.inner.poll_interval)
            .with_deadline(self.inner.command_timeout)
            .execute(request)
            .await
    }

    /// Sets a device to `level` percent. Level 0 turns it off.
    ///
    /// # Errors
    ///
    /// - [`Error::Value`] if `level` exceeds 100, before anything else is checked
    /// - [`Error::NotConnected`] or [`Error::UnknownDevice`]
    /// - command errors, see [`execute`](Self::execute)
    pub async fn set_device_level(&self, insteon_id: &str, level: u8) -> Result<()> {
        let level = Level::new(level)?;
        let device = self.device(insteon_id)?;

        let request = if level.is_off() {
            CommandRequest::device(CommandKind::Off, device.device_id, 0)
        } else {
            CommandRequest::device(CommandKind::On, device.device_id, level.value())
        };

        self.execute::<IgnoredAny>(&request).await?;
        Ok(())
    }

    /// Turns a scene on or off.
    ///
    /// # Errors
    ///
    /// [`Error::NotConnected`], [`Error::UnknownScene`], or command errors.
    pub async fn set_scene_state(&self, scene_id: i64, on: bool) -> Result<()> {
        let scene = self.scene(scene_id)?;
        let kind = if on { CommandKind::On } else { CommandKind::Off };

        self.execute::<IgnoredAny>(&CommandRequest::scene(kind, scene.scene_id))
            .await?;
        Ok(())
    }

    /// Queries the current level of a device.
    ///
    /// # Errors
    ///
    /// [`Error::NotConnected`], [`Error::UnknownDevice`], command errors, or
    /// [`ParseError::MissingField`] if the command completed without a payload.
    pub async fn status(&self, insteon_id: &str) -> Result<Level> {
        let device = self.device(insteon_id)?;
        let request = CommandRequest::device(CommandKind::GetStatus, device.device_id, 0);

        let payload: StatusPayload = self
            .execute(&request)
            .await?
            .ok_or_else(|| ParseError::MissingField("response".to_string()))?;
        Ok(payload.level)
    }

    // ========== Events ==========

    /// Streams device events to `on_event` until the server closes the
    /// stream or an error occurs.
    ///
    /// The callback receives the cached device and the reported status. It
    /// runs on the calling task, so a slow callback delays reading. Drop the
    /// returned future to stop the subscription.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`]
    /// - [`StreamError::UnexpectedStatus`] if the stream request is not answered with 200
    /// - [`StreamError::MalformedEvent`] for an undecodable `data:` frame
    /// - [`Error::UnknownDevice`] for an uncached device under
    ///   [`UnknownDevicePolicy::Fail`]
    /// - [`Error::Timeout`] if the stream idle timeout elapses
    pub async fn subscribe<F>(&self, mut on_event: F) -> Result<()>
    where
        F: FnMut(Device, String),
    {
        self.run_stream(|event: DeviceEvent| {
            on_event(event.device, event.message.status);
            std::future::ready(true)
        })
        .await
    }

    /// Reads the event stream on a background task and delivers events
    /// through a channel holding up to `capacity` events.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] immediately; stream errors are reported
    /// by [`EventStream::join`].
    pub fn spawn_event_stream(&self, capacity: usize) -> Result<EventStream> {
        self.ensure_connected()?;

        let (tx, rx) = mpsc::channel(capacity.max(1));
        let session = self.clone();
        let task = tokio::spawn(async move {
            session
                .run_stream(move |event| {
                    let tx = tx.clone();
                    async move { tx.send(event).await.is_ok() }
                })
                .await
        });

        Ok(EventStream::new(rx, task))
    }

    /// Reads the house stream, handing each resolved event to `dispatch`.
    /// Stops early with `Ok` when `dispatch` returns false.
    async fn run_stream<F, Fut>(&self, mut dispatch: F) -> Result<()>
    where
        F: FnMut(DeviceEvent) -> Fut,
        Fut: Future<Output = bool>,
    {
        let house_id = self.house_id().ok_or(Error::NotConnected)?;
        let path = format!("{HOUSES_PATH}/{house_id}/stream");
        tracing::info!(path = %path, "Subscribing to event stream");

        let mut response = self.inner.client.open_stream(&path).await?;
        if response.status() != StatusCode::OK {
            return Err(StreamError::UnexpectedStatus(response.status().as_u16()).into());
        }

        let mut lines = LineBuffer::new();
        loop {
            let read = response.chunk();
            let chunk = match self.inner.stream_idle_timeout {
                Some(idle) => tokio::time::timeout(idle, read)
                    .await
                    .map_err(|_| Error::Timeout(idle))?,
                None => read.await,
            }
            .map_err(StreamError::Read)?;

            let Some(chunk) = chunk else {
                break;
            };
            for line in lines.push(&chunk)? {
                if !self.handle_line(&line, &mut dispatch).await? {
                    return Ok(());
                }
            }
        }

        if let Some(line) = lines.finish() {
            self.handle_line(&line, &mut dispatch).await?;
        }
        tracing::info!("Event stream closed by server");
        Ok(())
    }

    async fn handle_line<F, Fut>(&self, line: &str, dispatch: &mut F) -> Result<bool>
    where
        F: FnMut(DeviceEvent) -> Fut,
        Fut: Future<Output = bool>,
    {
        tracing::trace!(line, "Stream line");

        let Some(message) = parse_frame(line)? else {
            return Ok(true);
        };

        let device = match self.device(&message.device_insteon_id) {
            Ok(device) => device,
            Err(Error::UnknownDevice(id))
                if self.inner.unknown_device_policy == UnknownDevicePolicy::Skip =>
            {
                tracing::warn!(insteon_id = %id, "Skipping event for unknown device");
                return Ok(true);
            }
            Err(e) => return Err(e),
        };

        tracing::debug!(
            insteon_id = %device.insteon_id,
            status = %message.status,
            "Device event"
        );
        Ok(dispatch(DeviceEvent { device, message }).await)
    }
}

/// Tracks an in-progress connect.
///
/// Resets the session to disconnected unless committed, including when the
/// connect future is dropped midway.
struct ConnectGuard<'a> {
    state: &'a Mutex<SharedState>,
    committed: bool,
}

impl<'a> ConnectGuard<'a> {
    fn begin(state: &'a Mutex<SharedState>) -> Result<Self> {
        let mut shared = state.lock();
        if shared.connection != ConnectionState::Disconnected {
            return Err(Error::AlreadyConnected);
        }
        shared.connection = ConnectionState::Connecting;
        shared.house_id = None;
        shared.cache.clear();
        drop(shared);

        Ok(Self {
            state,
            committed: false,
        })
    }

    fn commit(mut self, house_id: i64, devices: Vec<Device>, scenes: Vec<Scene>) {
        let mut shared = self.state.lock();
        shared.house_id = Some(house_id);
        shared.cache.merge_devices(devices);
        shared.cache.merge_scenes(scenes);
        shared.connection = ConnectionState::Connected;
        tracing::info!(
            house_id,
            devices = shared.cache.device_count(),
            scenes = shared.cache.scene_count(),
            "Connected"
        );
        self.committed = true;
    }
}

impl Drop for ConnectGuard<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        let mut shared = self.state.lock();
        shared.connection = ConnectionState::Disconnected;
        shared.house_id = None;
        shared.cache.clear();
        tracing::warn!("Connect failed, session is disconnected");
    }
}
