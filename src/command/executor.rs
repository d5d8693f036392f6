// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Submit-and-poll execution of cloud commands.

use std::time::Duration;

use serde::de::DeserializeOwned;

use super::{CommandRequest, CommandResponse, CommandStatus};
use crate::error::{Error, ParseError};
use crate::protocol::HttpClient;

/// Path of the command submission endpoint.
const COMMANDS_PATH: &str = "/commands";

/// Runs a command to completion.
///
/// The command is posted once; while the server reports it as `pending` the
/// executor sleeps for the poll interval and fetches its status again. The
/// whole exchange is bounded by an optional deadline.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CommandExecutor<'a> {
    client: &'a HttpClient,
    poll_interval: Duration,
    deadline: Option<Duration>,
}

impl<'a> CommandExecutor<'a> {
    /// Creates an executor polling every `poll_interval`.
    #[must_use]
    pub fn new(client: &'a HttpClient, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
            deadline: None,
        }
    }

    /// Bounds the total time spent submitting and polling.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Executes `request` and decodes its result payload, if any.
    ///
    /// # Errors
    ///
    /// - [`Error::CommandFailed`] if the server reports the command as failed
    /// - [`Error::Timeout`] if the deadline elapses while polling
    /// - [`Error::Parse`] if the payload does not match `T`
    /// - transport errors from submission or polling
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: &CommandRequest,
    ) -> Result<Option<T>, Error> {
        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.run(request))
                .await
                .map_err(|_| {
                    tracing::warn!(command = %request.kind(), ?deadline, "Command timed out");
                    Error::Timeout(deadline)
                })?,
            None => self.run(request).await,
        }
    }

    async fn run<T: DeserializeOwned>(
        &self,
        request: &CommandRequest,
    ) -> Result<Option<T>, Error> {
        tracing::debug!(?request, "Submitting command");

        let mut response: CommandResponse = self
            .client
            .post_json(COMMANDS_PATH, request)
            .await
            .inspect_err(|e| tracing::warn!(?request, error = %e, "Command submission failed"))?;

        tracing::debug!(
            id = response.id,
            status = %response.status,
            link = %response.link,
            "Command accepted"
        );

        while response.status.is_pending() {
            tokio::time::sleep(self.poll_interval).await;
            let status_path = format!("{COMMANDS_PATH}/{}", response.id);
            tracing::debug!(id = response.id, path = %status_path, "Polling command status");
            response = self.client.get_json(&status_path).await?;
        }

        match response.status {
            CommandStatus::Failed => {
                tracing::warn!(id = response.id, "Command failed");
                Err(Error::CommandFailed { id: response.id })
            }
            status => {
                tracing::debug!(id = response.id, %status, "Command completed");
                response
                    .response
                    .map(|payload| {
                        serde_json::from_value(payload).map_err(|e| Error::Parse(ParseError::Json(e)))
                    })
                    .transpose()
            }
        }
    }
}
