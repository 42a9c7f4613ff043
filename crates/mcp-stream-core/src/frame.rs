// ABOUTME: SSE frame encoding plus a line-buffering parser for the event stream
// ABOUTME: Handles partial lines across TCP chunk boundaries and several frames per chunk
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # SSE Framing
//!
//! The subscription stream is line oriented:
//!
//! ```text
//! : connected\n\n              sent once when the stream opens
//! data: <json-envelope>\n\n    one event
//! : keepalive\n\n              heartbeat
//! ```
//!
//! TCP does not align network chunks with frame boundaries, so
//! [`SseLineBuffer`] accumulates raw bytes and only emits frames once a
//! complete line (and, for data, the terminating blank line) has arrived.
//! Bytes are kept undecoded until a newline is seen, which keeps multi-byte
//! UTF-8 sequences split across chunks intact.

use std::mem;

/// Comment text of the sentinel written when a stream opens
pub const CONNECTED_COMMENT: &str = "connected";

/// Comment text of the heartbeat line
pub const KEEPALIVE_COMMENT: &str = "keepalive";

/// One frame of the event stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    /// A comment line (`: text`), used for the sentinel and heartbeats
    Comment(String),
    /// The payload of a `data:` field
    Data(String),
}

impl SseFrame {
    /// The "stream established" sentinel
    #[must_use]
    pub fn connected() -> Self {
        Self::Comment(CONNECTED_COMMENT.to_owned())
    }

    /// The heartbeat frame
    #[must_use]
    pub fn keepalive() -> Self {
        Self::Comment(KEEPALIVE_COMMENT.to_owned())
    }

    /// Whether this frame is the "stream established" sentinel
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Comment(text) if text == CONNECTED_COMMENT)
    }

    /// Whether this frame is a heartbeat
    #[must_use]
    pub fn is_keepalive(&self) -> bool {
        matches!(self, Self::Comment(text) if text == KEEPALIVE_COMMENT)
    }

    /// Render the frame exactly as it appears on the wire
    #[must_use]
    pub fn to_wire(&self) -> String {
        match self {
            Self::Comment(text) => format!(": {text}\n\n"),
            Self::Data(data) => {
                let mut out = String::with_capacity(data.len() + 8);
                for line in data.split('\n') {
                    out.push_str("data: ");
                    out.push_str(line);
                    out.push('\n');
                }
                out.push('\n');
                out
            }
        }
    }
}

/// Incremental parser turning raw stream bytes into [`SseFrame`]s
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    /// Bytes not yet terminated by a newline
    pending: Vec<u8>,
    /// `data:` lines of the event currently being assembled
    data_lines: Vec<String>,
}

impl SseLineBuffer {
    /// Create an empty buffer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network chunk, returning every frame it completes
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<SseFrame> {
        self.pending.extend_from_slice(bytes);

        let mut frames = Vec::new();
        while let Some(newline) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line[..line.len() - 1]);
            self.process_line(line.trim_end_matches('\r'), &mut frames);
        }
        frames
    }

    /// Flush whatever is buffered when the byte stream ends
    ///
    /// A trailing line without newline is processed, and an event whose
    /// terminating blank line never arrived is still emitted.
    pub fn finish(&mut self) -> Vec<SseFrame> {
        let mut frames = Vec::new();
        let rest = mem::take(&mut self.pending);
        if !rest.is_empty() {
            let line = String::from_utf8_lossy(&rest);
            self.process_line(line.trim_end_matches('\r'), &mut frames);
        }
        self.dispatch(&mut frames);
        frames
    }

    fn process_line(&mut self, line: &str, frames: &mut Vec<SseFrame>) {
        if line.is_empty() {
            self.dispatch(frames);
            return;
        }

        if let Some(comment) = line.strip_prefix(':') {
            frames.push(SseFrame::Comment(strip_one_space(comment).to_owned()));
            return;
        }

        if let Some(value) = line.strip_prefix("data:") {
            self.data_lines.push(strip_one_space(value).to_owned());
        }
        // event:, id: and retry: are not used by this protocol
    }

    fn dispatch(&mut self, frames: &mut Vec<SseFrame>) {
        if !self.data_lines.is_empty() {
            let data = mem::take(&mut self.data_lines).join("\n");
            frames.push(SseFrame::Data(data));
        }
    }
}

fn strip_one_space(value: &str) -> &str {
    value.strip_prefix(' ').unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_rendering() {
        assert_eq!(SseFrame::connected().to_wire(), ": connected\n\n");
        assert_eq!(SseFrame::keepalive().to_wire(), ": keepalive\n\n");
        assert_eq!(
            SseFrame::Data(r#"{"success":true}"#.to_owned()).to_wire(),
            "data: {\"success\":true}\n\n"
        );
    }

    #[test]
    fn test_multiple_frames_in_one_chunk() {
        let mut buffer = SseLineBuffer::new();
        let frames = buffer.feed(b": connected\n\ndata: {\"a\":1}\n\n: keepalive\n\n");
        assert_eq!(
            frames,
            vec![
                SseFrame::connected(),
                SseFrame::Data("{\"a\":1}".to_owned()),
                SseFrame::keepalive(),
            ]
        );
    }

    #[test]
    fn test_frame_split_across_chunks() {
        let mut buffer = SseLineBuffer::new();
        assert!(buffer.feed(b"data: {\"mess").is_empty());
        assert!(buffer.feed(b"age\":\"hi\"}\n").is_empty());
        let frames = buffer.feed(b"\n");
        assert_eq!(frames, vec![SseFrame::Data("{\"message\":\"hi\"}".to_owned())]);
    }

    #[test]
    fn test_crlf_and_multibyte_split() {
        let text = "data: {\"m\":\"héllo\"}\r\n\r\n".as_bytes();
        // split inside the two-byte 'é'
        let split = text.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let mut buffer = SseLineBuffer::new();
        let mut frames = buffer.feed(&text[..split]);
        frames.extend(buffer.feed(&text[split..]));
        assert_eq!(frames, vec![SseFrame::Data("{\"m\":\"héllo\"}".to_owned())]);
    }

    #[test]
    fn test_finish_flushes_unterminated_event() {
        let mut buffer = SseLineBuffer::new();
        assert!(buffer.feed(b"data: {\"x\":true}").is_empty());
        assert_eq!(
            buffer.finish(),
            vec![SseFrame::Data("{\"x\":true}".to_owned())]
        );
        assert!(buffer.finish().is_empty());
    }

    #[test]
    fn test_multiline_data_is_joined() {
        let frame = SseFrame::Data("line one\nline two".to_owned());
        let mut buffer = SseLineBuffer::new();
        assert_eq!(buffer.feed(frame.to_wire().as_bytes()), vec![frame]);
    }

    #[test]
    fn test_unused_fields_are_ignored() {
        let mut buffer = SseLineBuffer::new();
        let frames = buffer.feed(b"event: message\nid: 7\nretry: 100\ndata: x\n\n");
        assert_eq!(frames, vec![SseFrame::Data("x".to_owned())]);
    }
}
