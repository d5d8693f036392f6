// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Channel-backed event stream handle.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::DeviceEvent;
use crate::error::{Error, StreamError};

/// Default capacity of the event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Events of a house stream read on a background task.
///
/// Created by [`Session::spawn_event_stream`](crate::Session::spawn_event_stream).
/// The reader task pushes into a bounded channel, so a consumer that falls
/// behind pauses reading instead of losing events. Dropping the handle aborts
/// the task.
///
/// # Examples
///
/// ```no_run
/// # async fn example(session: insteon_cloud::Session) -> insteon_cloud::Result<()> {
/// let mut events = session.spawn_event_stream(32)?;
/// while let Some(event) = events.recv().await {
///     println!("{} is now {}", event.device.device_name, event.status());
/// }
/// // The channel closed: find out why the stream ended
/// events.join().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct EventStream {
    events: mpsc::Receiver<DeviceEvent>,
    task: Option<JoinHandle<Result<(), Error>>>,
}

impl EventStream {
    pub(crate) fn new(
        events: mpsc::Receiver<DeviceEvent>,
        task: JoinHandle<Result<(), Error>>,
    ) -> Self {
        Self {
            events,
            task: Some(task),
        }
    }

    /// Receives the next event.
    ///
    /// Returns `None` once the stream has ended; call [`join`](Self::join)
    /// to get the reason.
    pub async fn recv(&mut self) -> Option<DeviceEvent> {
        self.events.recv().await
    }

    /// Waits for the reader task and returns how the stream ended.
    ///
    /// Undelivered events are discarded. If the stream is still open the task
    /// stops when it next tries to deliver an event.
    ///
    /// # Errors
    ///
    /// Returns the error that terminated the stream, or
    /// [`StreamError::TaskFailed`] if the task panicked.
    pub async fn join(mut self) -> Result<(), Error> {
        self.events.close();
        let Some(task) = self.task.take() else {
            return Ok(());
        };
        match task.await {
            Ok(result) => result,
            Err(e) => Err(StreamError::TaskFailed(e.to_string()).into()),
        }
    }

    /// Stops the reader task immediately.
    pub fn close(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
