// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Incremental server-sent-event framing.
//!
//! The stream body arrives in arbitrary chunks. [`LineBuffer`] reassembles
//! them into lines, and [`parse_frame`] turns `data:` lines into
//! [`EventMessage`]s. Every other line (`event:`, `id:`, comments, the blank
//! frame separator) is ignored.

use super::EventMessage;
use crate::error::StreamError;

/// Prefix of the lines carrying an event payload.
pub(crate) const DATA_PREFIX: &str = "data: ";

/// Longest unterminated line kept while waiting for its newline.
pub(crate) const MAX_LINE_LEN: usize = 64 * 1024;

/// Splits a byte stream into lines across chunk boundaries.
#[derive(Debug)]
pub(crate) struct LineBuffer {
    pending: Vec<u8>,
    /// Bytes of `pending` already known to hold no newline.
    scanned: usize,
    max_line_len: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::with_max_line_len(MAX_LINE_LEN)
    }

    pub fn with_max_line_len(max_line_len: usize) -> Self {
        Self {
            pending: Vec::new(),
            scanned: 0,
            max_line_len,
        }
    }

    /// Appends a chunk and returns every line it completed.
    ///
    /// Lines end with `\n`; a trailing `\r` is stripped.
    ///
    /// # Errors
    ///
    /// [`StreamError::LineTooLong`] once the unterminated remainder exceeds
    /// the maximum line length.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, StreamError> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.pending[self.scanned..].iter().position(|&b| b == b'\n') {
            let end = self.scanned + offset;
            let line = &self.pending[start..end];
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            lines.push(String::from_utf8_lossy(line).into_owned());
            start = end + 1;
            self.scanned = start;
        }

        self.pending.drain(..start);
        self.scanned = self.pending.len();

        if self.pending.len() > self.max_line_len {
            return Err(StreamError::LineTooLong(self.max_line_len));
        }
        Ok(lines)
    }

    /// Returns the unterminated remainder once the stream has ended.
    pub fn finish(self) -> Option<String> {
        (!self.pending.is_empty()).then(|| String::from_utf8_lossy(&self.pending).into_owned())
    }
}

/// Decodes a stream line.
///
/// Returns `Ok(None)` for lines that do not carry data.
pub(crate) fn parse_frame(line: &str) -> Result<Option<EventMessage>, StreamError> {
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Ok(None);
    };
    serde_json::from_str(payload)
        .map(Some)
        .map_err(StreamError::MalformedEvent)
}
