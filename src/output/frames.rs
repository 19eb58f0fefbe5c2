//! Consumer-side splitter for the framed event stream.

use crate::constants::stream::{FRAME_END, FRAME_START};
use crate::output::MonitorEvent;

/// One frame pulled out of the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// A well-formed event.
    Event(MonitorEvent),
    /// Text between markers that did not parse as an event.
    Malformed {
        /// Frame body as received.
        raw: String,
        /// Parser message.
        error: String,
    },
}

/// Incremental decoder for `JSON_START<json>JSON_END` frames.
///
/// Input may arrive in arbitrary chunks. Text outside frames is discarded.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: String,
}

impl FrameDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every frame it completes.
    pub fn push(&mut self, chunk: &str) -> Vec<Frame> {
        self.buffer.push_str(chunk);
        let mut frames = Vec::new();

        loop {
            let Some(start) = self.buffer.find(FRAME_START) else {
                self.keep_marker_prefix();
                break;
            };
            let body_start = start + FRAME_START.len();
            let Some(body_len) = self.buffer[body_start..].find(FRAME_END) else {
                self.buffer.drain(..start);
                break;
            };

            let body = &self.buffer[body_start..body_start + body_len];
            frames.push(match serde_json::from_str::<MonitorEvent>(body) {
                Ok(event) => Frame::Event(event),
                Err(e) => Frame::Malformed {
                    raw: body.to_string(),
                    error: e.to_string(),
                },
            });
            self.buffer.drain(..body_start + body_len + FRAME_END.len());
        }

        frames
    }

    /// Bytes held back waiting for more input.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Drop everything except a tail that could begin a start marker.
    fn keep_marker_prefix(&mut self) {
        let keep = FRAME_START.len() - 1;
        if self.buffer.len() <= keep {
            return;
        }
        let mut cut = self.buffer.len() - keep;
        while !self.buffer.is_char_boundary(cut) {
            cut += 1;
        }
        self.buffer.drain(..cut);
    }
}
