//! Incremental Server-Sent Events decoder

use tracing::warn;

/// Longest line kept; longer lines are dropped whole
pub const MAX_LINE_BYTES: usize = 1 << 20;

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// One dispatched server-push message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseMessage {
    /// `event:` field, if the server named the event
    pub event: Option<String>,
    /// `data:` lines joined with `\n`
    pub data: String,
    /// Last event id seen on the stream
    pub id: Option<String>,
}

impl SseMessage {
    pub fn data(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }
}

/// Turns arbitrary byte chunks into complete messages
///
/// Lines may end in `\n`, `\r\n` or `\r`, and chunk boundaries may fall
/// anywhere, including between `\r` and `\n` or inside a UTF-8 sequence.
/// A leading byte order mark is ignored.
#[derive(Debug)]
pub struct SseDecoder {
    line: Vec<u8>,
    max_line: usize,
    oversized: bool,
    started: bool,
    skip_lf: bool,
    event: Option<String>,
    data: Vec<String>,
    last_id: Option<String>,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_max_line(MAX_LINE_BYTES)
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            line: Vec::new(),
            max_line,
            oversized: false,
            started: false,
            skip_lf: false,
            event: None,
            data: Vec::new(),
            last_id: None,
        }
    }

    /// Feed a chunk; returns every message it completed
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseMessage> {
        let mut messages = Vec::new();
        for &byte in chunk {
            if self.skip_lf {
                self.skip_lf = false;
                if byte == b'\n' {
                    continue;
                }
            }
            match byte {
                b'\r' | b'\n' => {
                    self.skip_lf = byte == b'\r';
                    let mut line = std::mem::take(&mut self.line);
                    if std::mem::take(&mut self.oversized) {
                        continue;
                    }
                    if !self.started {
                        self.started = true;
                        if line.starts_with(BOM) {
                            line.drain(..BOM.len());
                        }
                    }
                    let line = String::from_utf8_lossy(&line);
                    if let Some(message) = self.process_line(&line) {
                        messages.push(message);
                    }
                }
                _ if self.oversized => {}
                _ if self.line.len() >= self.max_line => {
                    warn!(max_line = self.max_line, "Dropping oversized event stream line");
                    self.line.clear();
                    self.oversized = true;
                    self.started = true;
                }
                _ => self.line.push(byte),
            }
        }
        messages
    }

    fn process_line(&mut self, line: &str) -> Option<SseMessage> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            "id" if !value.contains('\0') => self.last_id = Some(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseMessage> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseMessage {
            event,
            data,
            id: self.last_id.clone(),
        })
    }
}
