//! Message framing for the flight-data log.
//!
//! A log is a sequence of frames:
//!
//! | bytes | field                                   |
//! |-------|-----------------------------------------|
//! | 2     | header `0x42 0x46`                      |
//! | 1     | type tag, see [Kind]                    |
//! | 2     | payload length, little-endian           |
//! | N     | payload                                 |
//! | 2     | checksum over all preceding frame bytes |
//!
//! Use [decode_messages] to read messages from a reader or a [MessageParser] to
//! feed bytes as they become available.
mod checksum;
mod encode;
mod kind;
mod parser;
mod scalar;

use std::io::{BufReader, Bytes, Read};

use tracing::debug;

pub use checksum::{checksum, Checksum};
pub use encode::{encode, DataRecord, LogWriter};
pub use kind::Kind;
pub use parser::{Discard, MessageParser, ParseStats, HEADER, HEADER_LEN};
pub use scalar::{Scalar, ScalarType};

use crate::{Error, Result};

/// A checksum-validated message.
///
/// The tag is kept as read; it is only interpreted by [Message::kind] so a message
/// with an unknown tag can still be reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub tag: u8,
    pub payload: Vec<u8>,
}

impl Message {
    /// # Errors
    /// [Error::MalformedTag] if the tag is not a known [Kind].
    pub fn kind(&self) -> Result<Kind> {
        Kind::try_from(self.tag)
    }
}

/// Iterates over [Message]s decoded from a reader. Created using [decode_messages].
pub struct MessageIter<R>
where
    R: Read,
{
    bytes: Bytes<BufReader<R>>,
    parser: MessageParser,
    done: bool,
}

impl<R> MessageIter<R>
where
    R: Read,
{
    /// Parse stats for the bytes read so far.
    #[must_use]
    pub fn stats(&self) -> &ParseStats {
        self.parser.stats()
    }
}

impl<R> Iterator for MessageIter<R>
where
    R: Read,
{
    type Item = Result<Message>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        for zult in self.bytes.by_ref() {
            match zult {
                Ok(b) => {
                    if let Some(message) = self.parser.feed_byte(b) {
                        return Some(Ok(message));
                    }
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(Error::Io(err)));
                }
            }
        }
        self.done = true;
        if !self.parser.is_idle() {
            debug!("stream ended with a partial frame");
        }
        None
    }
}

/// Return an iterator providing [Message]s decoded from the bytes of `reader`.
///
/// Bytes that are not part of a valid frame are skipped; see [MessageParser]. An IO
/// error ends the iteration after being provided.
///
/// # Example
/// ```
/// use bfslog::message::{decode_messages, encode, Kind, ScalarType};
///
/// let mut dat = vec![0x00, 0x01];  // noise
/// dat.extend(encode(3, b"alt").unwrap());
///
/// let messages: Vec<_> = decode_messages(dat.as_slice())
///     .filter_map(Result::ok)
///     .collect();
/// assert_eq!(messages.len(), 1);
/// assert_eq!(messages[0].kind().unwrap(), Kind::Key(ScalarType::Uint8));
/// ```
pub fn decode_messages<R>(reader: R) -> MessageIter<R>
where
    R: Read,
{
    MessageIter {
        bytes: BufReader::new(reader).bytes(),
        parser: MessageParser::new(),
        done: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, ErrorKind};

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::Other, "boom"))
        }
    }

    #[test]
    fn iter_over_reader() {
        let mut dat = Vec::new();
        dat.extend(encode(3, b"alt").unwrap());
        dat.extend(encode(13, b"altitude").unwrap());
        dat.extend(encode(20, &[7]).unwrap());

        let mut iter = decode_messages(dat.as_slice());
        let kinds: Vec<Kind> = iter
            .by_ref()
            .map(|zult| zult.unwrap().kind().unwrap())
            .collect();

        assert_eq!(
            kinds,
            vec![
                Kind::Key(ScalarType::Uint8),
                Kind::Desc(ScalarType::Uint8),
                Kind::Data
            ]
        );
        assert_eq!(iter.stats().messages, 3);
        assert_eq!(iter.stats().bytes, dat.len());
    }

    #[test]
    fn empty_reader() {
        let dat: &[u8] = &[];
        assert_eq!(decode_messages(dat).count(), 0);
    }

    #[test]
    fn io_error_is_provided_once() {
        let zults: Vec<Result<Message>> = decode_messages(FailingReader).collect();
        assert_eq!(zults.len(), 1);
        assert!(matches!(zults[0], Err(Error::Io(_))));
    }

    #[test]
    fn unknown_tag_is_still_a_message() {
        let dat = encode(42, b"?").unwrap();
        let messages: Vec<Message> = decode_messages(dat.as_slice())
            .filter_map(Result::ok)
            .collect();
        assert_eq!(messages.len(), 1);
        assert!(matches!(messages[0].kind(), Err(Error::MalformedTag(42))));
    }
}
