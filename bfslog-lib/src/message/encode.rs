use std::io::Write;

use super::{parser::HEADER, parser::HEADER_LEN, Checksum, Kind, Scalar, ScalarType};
use crate::{Error, Result};

/// Encode a single frame for `tag` and `payload`.
///
/// # Errors
/// [Error::PayloadTooLarge] if `payload` does not fit the 16-bit length field.
pub fn encode(tag: u8, payload: &[u8]) -> Result<Vec<u8>> {
    let len = u16::try_from(payload.len()).map_err(|_| Error::PayloadTooLarge(payload.len()))?;
    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len() + Checksum::LEN);
    frame.extend_from_slice(&HEADER);
    frame.push(tag);
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(payload);

    let mut ck = Checksum::new();
    ck.update(&frame);
    frame.extend_from_slice(&ck.value());

    Ok(frame)
}

/// One row of samples, packed in wire order.
///
/// Values may be pushed in any order; they are grouped by [ScalarType] when the
/// payload is built, keeping push order within each type.
///
/// # Example
/// ```
/// use bfslog::message::DataRecord;
///
/// let mut record = DataRecord::new();
/// record.push(-3i16).push(1.5f32);
/// // int16 samples precede float samples on the wire
/// assert_eq!(record.payload(), [0xfd, 0xff, 0x00, 0x00, 0xc0, 0x3f]);
/// ```
#[derive(Debug, Default, Clone)]
pub struct DataRecord {
    groups: [Vec<u8>; ScalarType::COUNT],
}

impl DataRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<T: Scalar>(&mut self, value: T) -> &mut Self {
        value.extend_le(&mut self.groups[T::TYPE.index()]);
        self
    }

    #[must_use]
    pub fn payload(&self) -> Vec<u8> {
        self.groups.concat()
    }
}

/// Writes messages to a log, the way the flight datalogger does.
///
/// The writer is flushed after every message so a log cut short still contains
/// every complete frame.
pub struct LogWriter<W>
where
    W: Write,
{
    writer: W,
    messages: usize,
}

impl<W> LogWriter<W>
where
    W: Write,
{
    pub fn new(writer: W) -> Self {
        LogWriter {
            writer,
            messages: 0,
        }
    }

    /// Write a single message.
    ///
    /// # Errors
    /// [Error::PayloadTooLarge] for oversize payloads or any IO error writing.
    pub fn write_message(&mut self, kind: Kind, payload: &[u8]) -> Result<()> {
        let frame = encode(kind.tag(), payload)?;
        self.writer.write_all(&frame)?;
        self.writer.flush()?;
        self.messages += 1;
        Ok(())
    }

    /// Declare a new column.
    ///
    /// # Errors
    /// See [LogWriter::write_message].
    pub fn write_key(&mut self, ty: ScalarType, name: &str) -> Result<()> {
        self.write_message(Kind::Key(ty), name.as_bytes())
    }

    /// Describe the next undescribed column of type `ty`.
    ///
    /// # Errors
    /// See [LogWriter::write_message].
    pub fn write_desc(&mut self, ty: ScalarType, desc: &str) -> Result<()> {
        self.write_message(Kind::Desc(ty), desc.as_bytes())
    }

    /// # Errors
    /// See [LogWriter::write_message].
    pub fn write_data(&mut self, record: &DataRecord) -> Result<()> {
        self.write_message(Kind::Data, &record.payload())
    }

    /// Number of messages written so far.
    #[must_use]
    pub fn messages(&self) -> usize {
        self.messages
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
