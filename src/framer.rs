//! Command framing on top of the streaming transport
//!
//! TCP (and RFCOMM) are byte streams: a single read may carry zero, one, or
//! several `;`-terminated commands, and a command may be split across reads.
//! The framer buffers incoming bytes and emits only tokens that were
//! terminated by `;`, carrying any unterminated remainder forward to the
//! next read.

/// Splits the control byte stream into `;`-terminated command tokens.
#[derive(Debug, Default)]
pub struct Framer {
    residual: Vec<u8>,
}

impl Framer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes from the transport, returning every complete token.
    ///
    /// Empty fragments (`";;"` or a trailing `;`) are discarded. Tokens that
    /// are not valid UTF-8 are dropped; the grammar is ASCII.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.residual.extend_from_slice(bytes);

        let mut tokens = Vec::new();
        while let Some(pos) = self.residual.iter().position(|&b| b == b';') {
            let mut frame: Vec<u8> = self.residual.drain(..=pos).collect();
            frame.pop(); // the delimiter
            if frame.is_empty() {
                continue;
            }
            match String::from_utf8(frame) {
                Ok(token) => tokens.push(token),
                Err(_) => log::warn!("Dropping non-UTF-8 command frame"),
            }
        }
        tokens
    }

    /// Number of buffered bytes awaiting their terminator
    pub fn pending(&self) -> usize {
        self.residual.len()
    }
}
