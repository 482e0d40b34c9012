//! # Server-Sent Event Decoder
//!
//! Incremental decoder for `text/event-stream` bodies. Chunks may split lines
//! (and UTF-8 sequences) anywhere; only complete lines are interpreted.
//!
//! A frame is dispatched on a blank line. Lines starting with `:` are
//! keep-alive comments. Multiple `data:` lines are joined with `\n`.
//!
//! A line or frame longer than [`MAX_FRAME_BYTES`] is dropped whole and
//! reported as [`SseItem::Oversized`]; decoding resumes at the next frame.

use shared_types::{HeadEvent, StreamEvent, HEAD_TOPIC};

/// One dispatched event frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    /// Value of the `event:` field, if present.
    pub event: Option<String>,
    /// Joined `data:` lines.
    pub data: String,
}

/// Upper bound on a buffered line or an accumulated frame.
pub const MAX_FRAME_BYTES: usize = 64 * 1024;

/// Output of [`SseDecoder::feed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseItem {
    /// A complete frame.
    Frame(SseFrame),
    /// A line or frame went past [`MAX_FRAME_BYTES`] and was discarded.
    Oversized {
        /// Bytes buffered when the limit was hit.
        bytes: usize,
    },
}

/// Incremental frame decoder.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
    /// Bytes held by `event` and `data`.
    frame_bytes: usize,
    /// Dropping the rest of an oversized line.
    skip_line: bool,
    /// Dropping lines until the oversized frame ends.
    skip_frame: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a body chunk and return every frame it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseItem> {
        let mut items = Vec::new();
        let mut chunk = chunk;

        if self.skip_line {
            match chunk.iter().position(|b| *b == b'\n') {
                Some(pos) => {
                    self.skip_line = false;
                    chunk = &chunk[pos + 1..];
                }
                None => return items,
            }
        }
        self.pending.extend_from_slice(chunk);

        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line[..line.len() - 1]);
            let line = line.strip_suffix('\r').unwrap_or(&line);

            if let Some(item) = self.process_line(line) {
                items.push(item);
            }
        }

        if self.pending.len() > MAX_FRAME_BYTES {
            let bytes = self.pending.len() + self.frame_bytes;
            self.pending.clear();
            self.reset_frame();
            self.skip_line = true;
            self.skip_frame = true;
            items.push(SseItem::Oversized { bytes });
        }
        items
    }

    fn process_line(&mut self, line: &str) -> Option<SseItem> {
        if line.is_empty() {
            if std::mem::take(&mut self.skip_frame) {
                return None;
            }
            return self.dispatch().map(SseItem::Frame);
        }
        if self.skip_frame || line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            // id / retry carry nothing the monitor needs
            _ => return None,
        }

        self.frame_bytes += value.len();
        if self.frame_bytes > MAX_FRAME_BYTES {
            let bytes = self.frame_bytes;
            self.reset_frame();
            self.skip_frame = true;
            return Some(SseItem::Oversized { bytes });
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        if self.event.is_none() && self.data.is_empty() {
            return None;
        }
        self.frame_bytes = 0;
        Some(SseFrame {
            event: self.event.take(),
            data: std::mem::take(&mut self.data).join("\n"),
        })
    }

    fn reset_frame(&mut self) {
        self.event = None;
        self.data.clear();
        self.frame_bytes = 0;
    }
}

/// Interpret a frame as a beacon stream event.
pub fn decode_frame(frame: &SseFrame) -> StreamEvent {
    let Some(topic) = frame.event.as_deref().map(str::trim) else {
        return StreamEvent::Malformed("frame without event name".to_string());
    };

    if frame.data.trim().is_empty() {
        return StreamEvent::Malformed(format!("{} frame without data", topic));
    }

    if topic != HEAD_TOPIC {
        return StreamEvent::Unsupported {
            topic: topic.to_string(),
        };
    }

    match serde_json::from_str::<HeadEvent>(frame.data.trim()) {
        Ok(head) => StreamEvent::Head(head),
        Err(e) => StreamEvent::Malformed(format!("error decoding head event data: {}", e)),
    }
}
