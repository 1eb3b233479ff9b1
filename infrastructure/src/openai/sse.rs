//! Server-sent events line buffering.
//!
//! Network chunks do not respect event boundaries, or even character
//! boundaries, so raw bytes are buffered until a full line is available and
//! only complete lines are decoded. Only `data:` fields are surfaced.

use std::string::FromUtf8Error;

/// A complete `data:` field from the event stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseData {
    /// JSON payload of one event
    Payload(String),
    /// The `[DONE]` sentinel ending the stream
    Done,
}

/// Accumulates raw bytes and yields complete `data:` lines
#[derive(Debug, Default)]
pub struct SseBuffer {
    pending: Vec<u8>,
}

impl SseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a network chunk and return every data field it completes.
    ///
    /// Fails when a completed line is not valid UTF-8.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<SseData>, FromUtf8Error> {
        self.pending.extend_from_slice(chunk);

        let mut out = Vec::new();
        while let Some(newline) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            if let Some(data) = parse_line(&String::from_utf8(line)?) {
                out.push(data);
            }
        }
        Ok(out)
    }

    /// Flush a trailing line that was not newline-terminated
    pub fn finish(&mut self) -> Result<Option<SseData>, FromUtf8Error> {
        let line = String::from_utf8(std::mem::take(&mut self.pending))?;
        Ok(parse_line(&line))
    }
}

fn parse_line(line: &str) -> Option<SseData> {
    let line = line.trim_end_matches(['\r', '\n']);
    let data = line.strip_prefix("data:")?.trim_start();
    if data == "[DONE]" {
        Some(SseData::Done)
    } else if data.is_empty() {
        None
    } else {
        Some(SseData::Payload(data.to_string()))
    }
}
