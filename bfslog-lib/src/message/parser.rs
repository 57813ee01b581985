use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{checksum, Checksum, Message};

/// Marker bytes starting every frame.
pub const HEADER: [u8; 2] = [0x42, 0x46];
/// Bytes preceding the payload: header, type tag, and 2 byte length.
pub const HEADER_LEN: usize = 5;

/// Reason a byte or in-progress frame was thrown away while parsing.
///
/// Neither is an error; the parser recovers by scanning for the next header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discard {
    /// Byte did not match the expected header byte.
    FrameSync,
    /// Checksum trailer did not match the frame contents.
    ChecksumMismatch,
}

/// Tracks stats on message parsing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Total bytes fed to the parser
    pub bytes: usize,
    /// Valid messages produced
    pub messages: usize,
    /// Bytes thrown away while searching for a header
    pub sync_discarded: usize,
    /// Complete frames dropped due to a bad checksum
    pub checksum_failures: usize,
}

/// Byte-at-a-time frame decoder.
///
/// The parser state counts the bytes of the current frame: 0-1 header, 2 type tag,
/// 3-4 length, then the payload and finally the two checksum bytes. Any mismatch
/// silently resets the state and the parser resumes looking for a header, so a
/// corrupt or partial log never produces an error, only fewer messages. A `0x42`
/// where the second header byte was expected is kept as the start of a new header.
///
/// # Example
/// ```
/// use bfslog::message::{encode, MessageParser};
///
/// let frame = encode(3, b"alt").unwrap();
/// let mut parser = MessageParser::new();
/// let messages: Vec<_> = frame.iter().filter_map(|b| parser.feed_byte(*b)).collect();
///
/// assert_eq!(messages.len(), 1);
/// assert_eq!(messages[0].payload, b"alt");
/// ```
#[derive(Debug, Default, Clone)]
pub struct MessageParser {
    state: usize,
    // Payload length, valid once the length bytes have been read
    length: usize,
    // Frame bytes read so far, excluding the checksum
    buffer: Vec<u8>,
    checksum: [u8; Checksum::LEN],
    stats: ParseStats,
}

impl MessageParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next byte of the stream, returning a [Message] if `byte` completes a
    /// valid frame.
    pub fn feed_byte(&mut self, byte: u8) -> Option<Message> {
        self.stats.bytes += 1;
        match self.state {
            0 | 1 => {
                if byte == HEADER[self.state] {
                    self.advance(byte);
                } else if byte == HEADER[0] {
                    // repeated first header byte may start the next frame
                    self.stats.sync_discarded += self.buffer.len();
                    self.reset();
                    self.advance(byte);
                } else {
                    self.discard(Discard::FrameSync);
                }
            }
            2 | 3 => self.advance(byte),
            4 => {
                self.advance(byte);
                self.length = usize::from(u16::from_le_bytes([self.buffer[3], self.buffer[4]]));
            }
            s if s < self.length + HEADER_LEN => self.advance(byte),
            s if s == self.length + HEADER_LEN => {
                self.checksum = checksum(&self.buffer);
                if byte == self.checksum[0] {
                    self.state += 1;
                } else {
                    self.discard(Discard::ChecksumMismatch);
                }
            }
            s if s == self.length + HEADER_LEN + 1 => {
                if byte == self.checksum[1] {
                    let mut frame = std::mem::take(&mut self.buffer);
                    self.reset();
                    self.stats.messages += 1;
                    let payload = frame.split_off(HEADER_LEN);
                    return Some(Message {
                        tag: frame[2],
                        payload,
                    });
                }
                self.discard(Discard::ChecksumMismatch);
            }
            s => {
                trace!(state = s, length = self.length, "parser in unexpected state; resetting");
                self.reset();
            }
        }
        None
    }

    /// Feed all of `dat`, returning any messages completed along the way.
    pub fn feed(&mut self, dat: &[u8]) -> Vec<Message> {
        dat.iter().filter_map(|b| self.feed_byte(*b)).collect()
    }

    #[must_use]
    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// True when no partial frame is buffered.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state == 0
    }

    fn advance(&mut self, byte: u8) {
        self.buffer.push(byte);
        self.state += 1;
    }

    fn discard(&mut self, reason: Discard) {
        match reason {
            Discard::FrameSync => {
                // the mismatched byte plus any partial header
                self.stats.sync_discarded += self.buffer.len() + 1;
            }
            Discard::ChecksumMismatch => {
                trace!(
                    tag = ?self.buffer.get(2),
                    length = self.length,
                    "dropping frame with bad checksum"
                );
                self.stats.checksum_failures += 1;
            }
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.state = 0;
        self.length = 0;
        self.buffer.clear();
        self.checksum = [0, 0];
    }
}
