use crate::encoder::FRAME_TERMINATOR;

/// Incremental UTF-8 decoder.
///
/// A multi-byte character split across two chunks is held back until the
/// rest of it arrives. Invalid sequences decode to U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `chunk` (plus any held-back bytes) as is complete.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let mut out = String::with_capacity(bytes.len());
        let mut start = 0;
        loop {
            match std::str::from_utf8(&bytes[start..]) {
                Ok(valid) => {
                    out.push_str(valid);
                    start = bytes.len();
                    break;
                }
                Err(err) => {
                    let end = start + err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&bytes[start..end]));
                    match err.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            start = end + len;
                        }
                        // Incomplete sequence at the end: wait for more bytes.
                        None => {
                            start = end;
                            break;
                        }
                    }
                }
            }
        }

        self.pending = bytes.split_off(start);
        out
    }

    /// Flush at end of input. A truncated trailing character becomes U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            char::REPLACEMENT_CHARACTER.to_string()
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Buffer that turns arbitrarily chunked bytes into complete frame payloads.
///
/// Complete frames are drained as soon as their terminator arrives; the
/// trailing partial frame stays in the buffer for the next read.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    decoder: Utf8Decoder,
    buffer: String,
    /// Bytes of `buffer` already searched for a terminator.
    scanned: usize,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return the data payload of every frame it completed.
    ///
    /// Frames without any `data:` line (comments, keep-alives) are dropped.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut text = self.decoder.decode(chunk);

        // A CR at the end of the previous chunk pairs with an LF here.
        if text.starts_with('\n') && self.buffer.ends_with('\r') {
            self.buffer.pop();
            self.scanned = self.scanned.min(self.buffer.len());
        }
        if text.contains("\r\n") {
            text = text.replace("\r\n", "\n");
        }
        self.buffer.push_str(&text);

        // Only new text needs searching, plus one LF that may open a terminator.
        let mut start = if self.buffer[..self.scanned].ends_with('\n') {
            self.scanned - 1
        } else {
            self.scanned
        };

        let mut payloads = Vec::new();
        while let Some(offset) = self.buffer[start..].find(FRAME_TERMINATOR) {
            let pos = start + offset;
            let frame: String = self.buffer.drain(..pos + FRAME_TERMINATOR.len()).collect();
            if let Some(data) = frame_data(&frame[..pos]) {
                payloads.push(data);
            }
            start = 0;
        }
        self.scanned = self.buffer.len();
        payloads
    }

    /// Give whatever is left one final attempt, as if it had been terminated.
    pub fn finish(&mut self) -> Option<String> {
        let tail = self.decoder.finish();
        self.buffer.push_str(&tail);
        let rest = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        if rest.trim().is_empty() {
            return None;
        }
        frame_data(&rest.replace("\r\n", "\n"))
    }

    /// Text received but not yet part of a complete frame.
    pub fn pending(&self) -> &str {
        &self.buffer
    }
}

/// Extract the payload of a single frame: its `data:` lines with the marker
/// stripped, joined by newlines. Returns `None` if the frame has no data line.
pub fn frame_data(frame: &str) -> Option<String> {
    let mut data: Option<String> = None;
    for line in frame.lines() {
        let Some(rest) = line.strip_prefix("data:") else {
            continue;
        };
        let rest = rest.strip_prefix(' ').unwrap_or(rest);
        match data.as_mut() {
            Some(existing) => {
                existing.push('\n');
                existing.push_str(rest);
            }
            None => data = Some(rest.to_string()),
        }
    }
    data
}
