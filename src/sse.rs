//! `text/event-stream` framing.
//!
//! Outbound frames are written exactly as `data: <text>\n\n`, with the
//! fragment copied verbatim. Inbound, [`SseDecoder`] reassembles the
//! provider's SSE stream across arbitrary chunk boundaries.

pub const CONTENT_TYPE: &str = "text/event-stream";

const ERROR_MARKER: &str = "[ERROR]";

/// Encode one fragment as an event frame.
pub fn data_frame(text: &str) -> String {
    format!("data: {}\n\n", text)
}

/// Encode the terminal error frame.
pub fn error_frame(message: &str) -> String {
    data_frame(&format!("{} {}", ERROR_MARKER, message))
}

/// Stateful decoder for SSE input. Yields the `data` payload of every
/// complete event; comments, `event:`/`id:` fields and empty events are
/// dropped.
///
/// Lines may end in LF, CRLF or a bare CR, and every input byte is looked at
/// once. Partial lines stay as bytes until their terminator arrives, so
/// multi-byte UTF-8 sequences split across reads are decoded intact.
#[derive(Debug, Default)]
pub struct SseDecoder {
    line: Vec<u8>,
    data: Vec<String>,
    /// Last byte seen was a CR; a following LF belongs to the same terminator.
    after_cr: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes and return the payloads of all events completed by them.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut payloads = Vec::new();

        for &byte in chunk {
            if std::mem::take(&mut self.after_cr) && byte == b'\n' {
                continue;
            }
            match byte {
                b'\r' | b'\n' => {
                    self.after_cr = byte == b'\r';
                    let line = std::mem::take(&mut self.line);
                    if let Some(payload) = self.end_line(&line) {
                        payloads.push(payload);
                    }
                }
                _ => self.line.push(byte),
            }
        }

        payloads
    }

    /// Flush a trailing event that was never closed by a blank line.
    pub fn finish(&mut self) -> Option<String> {
        self.after_cr = false;
        let line = std::mem::take(&mut self.line);
        if !line.is_empty() {
            self.end_line(&line);
        }
        self.dispatch()
    }

    /// Handle one complete line; a blank line closes the current event.
    fn end_line(&mut self, line: &[u8]) -> Option<String> {
        if line.is_empty() {
            return self.dispatch();
        }
        if let Some(value) = line.strip_prefix(b"data:") {
            let value = value.strip_prefix(b" ").unwrap_or(value);
            self.data.push(String::from_utf8_lossy(value).into_owned());
        }
        None
    }

    fn dispatch(&mut self) -> Option<String> {
        if self.data.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.data).join("\n"))
    }
}
