use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

use super::{Column, Columns, Samples};
use crate::message::{Kind, Message, ScalarType};
use crate::{Error, Result};

/// Configuration for an [Accumulator].
#[derive(Debug, Clone, Default, TypedBuilder)]
pub struct AccumulatorConfig {
    /// Stop accumulating once this many data frames have been collected. By default
    /// there is no limit.
    #[builder(default, setter(strip_option))]
    pub max_data_frames: Option<usize>,
}

/// Result of handing a message to an [Accumulator].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Continue,
    /// The data frame limit has been reached and further messages are ignored.
    LimitReached,
}

// Keys, descriptions and samples declared for one scalar type. Descriptions are
// matched to keys by position.
#[derive(Debug, Default)]
struct TypeGroup {
    keys: Vec<String>,
    descriptions: Vec<String>,
    samples: Vec<Samples>,
}

/// Builds typed columns from a sequence of decoded messages.
///
/// `Key` messages declare a column for their type and `Desc` messages describe the
/// columns of their type in declaration order, i.e., the Nth description of a type
/// belongs to the Nth key of that type. Every `Data` message appends one sample to
/// every declared column.
///
/// # Example
/// ```
/// use bfslog::columns::{Accumulator, Samples};
/// use bfslog::message::{DataRecord, Kind, Message, ScalarType};
///
/// let mut acc = Accumulator::default();
/// acc.on_event(&Message { tag: Kind::Key(ScalarType::Uint8).tag(), payload: b"alt".to_vec() })?;
/// acc.on_event(&Message { tag: Kind::Data.tag(), payload: DataRecord::new().push(9u8).payload() })?;
///
/// let columns = acc.finish();
/// assert_eq!(columns.get("alt").unwrap().samples, Samples::Uint8(vec![9]));
/// # Ok::<(), bfslog::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct Accumulator {
    config: AccumulatorConfig,
    groups: [TypeGroup; ScalarType::COUNT],
    data_frames: usize,
}

impl Accumulator {
    #[must_use]
    pub fn new(config: AccumulatorConfig) -> Self {
        Accumulator {
            config,
            ..Default::default()
        }
    }

    /// Handle the next decoded message.
    ///
    /// # Errors
    /// - [Error::MalformedTag] if the message kind is unknown
    /// - [Error::InvalidEncoding] if a key or description is not ASCII
    /// - [Error::LateKey] if a key is declared after data frames were accumulated
    /// - [Error::TruncatedDataFrame] if a data payload does not cover all columns
    ///
    /// A failed message leaves the accumulated columns unchanged.
    pub fn on_event(&mut self, message: &Message) -> Result<Progress> {
        if self.is_full() {
            return Ok(Progress::LimitReached);
        }

        match message.kind()? {
            Kind::Key(ty) => {
                let key = decode_text(&message.payload)?;
                if self.data_frames > 0 {
                    return Err(Error::LateKey {
                        key,
                        data_frames: self.data_frames,
                    });
                }
                debug!(%ty, key = key.as_str(), "declared column");
                let group = &mut self.groups[ty.index()];
                group.keys.push(key);
                group.samples.push(Samples::new(ty));
            }
            Kind::Desc(ty) => {
                let desc = decode_text(&message.payload)?;
                let group = &mut self.groups[ty.index()];
                if group.descriptions.len() >= group.keys.len() {
                    debug!(%ty, desc = desc.as_str(), "description received before its key");
                }
                group.descriptions.push(desc);
            }
            Kind::Data => {
                self.decode_data(&message.payload)?;
                self.data_frames += 1;
                if self.data_frames % 500 == 0 {
                    trace!(data_frames = self.data_frames, "scanning");
                }
                if self.is_full() {
                    debug!(data_frames = self.data_frames, "data frame limit reached");
                    return Ok(Progress::LimitReached);
                }
            }
        }

        Ok(Progress::Continue)
    }

    /// True once the configured data frame limit has been reached.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.config
            .max_data_frames
            .is_some_and(|max| self.data_frames >= max)
    }

    #[must_use]
    pub fn data_frames(&self) -> usize {
        self.data_frames
    }

    /// Number of payload bytes a data frame must have to cover the declared columns.
    #[must_use]
    pub fn record_len(&self) -> usize {
        ScalarType::ALL
            .iter()
            .map(|ty| ty.width() * self.groups[ty.index()].keys.len())
            .sum()
    }

    fn decode_data(&mut self, payload: &[u8]) -> Result<()> {
        let minimum = self.record_len();
        if payload.len() < minimum {
            return Err(Error::TruncatedDataFrame {
                actual: payload.len(),
                minimum,
            });
        }
        if payload.len() > minimum {
            trace!(
                extra = payload.len() - minimum,
                "ignoring trailing data frame bytes"
            );
        }

        let mut offset = 0;
        for ty in ScalarType::ALL {
            let width = ty.width();
            for samples in &mut self.groups[ty.index()].samples {
                samples.push_le(&payload[offset..offset + width]);
                offset += width;
            }
        }
        Ok(())
    }

    /// Finish accumulating, pairing keys with descriptions by position.
    ///
    /// Columns without a description get an empty one. Descriptions without a
    /// matching key are dropped.
    #[must_use]
    pub fn finish(self) -> Columns {
        let data_frames = self.data_frames;
        let mut groups: [Vec<Column>; ScalarType::COUNT] = Default::default();

        for (ty, group) in ScalarType::ALL.into_iter().zip(self.groups) {
            if group.descriptions.len() > group.keys.len() {
                warn!(
                    %ty,
                    unmatched = ?&group.descriptions[group.keys.len()..],
                    "dropping descriptions without a key"
                );
            }
            let mut descriptions = group.descriptions.into_iter();
            groups[ty.index()] = group
                .keys
                .into_iter()
                .zip(group.samples)
                .map(|(name, samples)| Column {
                    name,
                    description: descriptions.next().unwrap_or_default(),
                    samples,
                })
                .collect();
        }

        Columns::new(groups, data_frames)
    }
}

/// Decode key and description payloads, which must be ASCII.
fn decode_text(dat: &[u8]) -> Result<String> {
    if let Some(offset) = dat.iter().position(|b| !b.is_ascii()) {
        return Err(Error::InvalidEncoding {
            byte: dat[offset],
            offset,
        });
    }
    Ok(dat.iter().map(|b| char::from(*b)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::DataRecord;

    fn key(ty: ScalarType, name: &str) -> Message {
        Message {
            tag: Kind::Key(ty).tag(),
            payload: name.as_bytes().to_vec(),
        }
    }

    fn desc(ty: ScalarType, desc: &str) -> Message {
        Message {
            tag: Kind::Desc(ty).tag(),
            payload: desc.as_bytes().to_vec(),
        }
    }

    fn data(record: &DataRecord) -> Message {
        Message {
            tag: Kind::Data.tag(),
            payload: record.payload(),
        }
    }

    #[test]
    fn no_events_no_columns() {
        let columns = Accumulator::default().finish();
        assert!(columns.is_empty());
        assert_eq!(columns.data_frames(), 0);
    }

    #[test]
    fn uint8_roundtrip() {
        let values = [10u8, 20, 30, 255];
        let mut acc = Accumulator::default();
        acc.on_event(&key(ScalarType::Uint8, "alt")).unwrap();
        acc.on_event(&desc(ScalarType::Uint8, "altitude")).unwrap();
        for v in values {
            let progress = acc.on_event(&data(DataRecord::new().push(v))).unwrap();
            assert_eq!(progress, Progress::Continue);
        }

        let columns = acc.finish();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns.data_frames(), values.len());
        let col = columns.get("alt").unwrap();
        assert_eq!(col.description, "altitude");
        assert_eq!(col.samples, Samples::Uint8(values.to_vec()));
    }

    #[test]
    fn float_and_int16_offsets() {
        let mut acc = Accumulator::default();
        // declared float first; int16 still precedes it on the wire
        acc.on_event(&key(ScalarType::Float, "airspeed")).unwrap();
        acc.on_event(&key(ScalarType::Int16, "elevator")).unwrap();

        let mut payload = (-300i16).to_le_bytes().to_vec();
        payload.extend_from_slice(&12.5f32.to_le_bytes());
        assert_eq!(acc.record_len(), 6);
        acc.on_event(&Message {
            tag: Kind::Data.tag(),
            payload,
        })
        .unwrap();

        let columns = acc.finish();
        assert_eq!(columns.get("airspeed").unwrap().samples, Samples::Float(vec![12.5]));
        assert_eq!(columns.get("elevator").unwrap().samples, Samples::Int16(vec![-300]));
    }

    #[test]
    fn several_columns_per_type_advance_offset() {
        let mut acc = Accumulator::default();
        acc.on_event(&key(ScalarType::Uint16, "a")).unwrap();
        acc.on_event(&key(ScalarType::Uint16, "b")).unwrap();
        acc.on_event(&key(ScalarType::Uint64, "t")).unwrap();
        acc.on_event(&data(DataRecord::new().push(1u16).push(2u16).push(99u64)))
            .unwrap();
        acc.on_event(&data(DataRecord::new().push(3u16).push(4u16).push(100u64)))
            .unwrap();

        let columns = acc.finish();
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["t", "a", "b"]);
        assert_eq!(columns.get("t").unwrap().samples, Samples::Uint64(vec![99, 100]));
        assert_eq!(columns.get("a").unwrap().samples, Samples::Uint16(vec![1, 3]));
        assert_eq!(columns.get("b").unwrap().samples, Samples::Uint16(vec![2, 4]));
    }

    #[test]
    fn descriptions_are_positional() {
        let mut acc = Accumulator::default();
        acc.on_event(&key(ScalarType::Double, "lat")).unwrap();
        acc.on_event(&key(ScalarType::Double, "lon")).unwrap();
        acc.on_event(&key(ScalarType::Float, "p")).unwrap();
        acc.on_event(&desc(ScalarType::Double, "latitude")).unwrap();
        acc.on_event(&desc(ScalarType::Double, "longitude")).unwrap();

        let columns = acc.finish();
        assert_eq!(columns.get("lat").unwrap().description, "latitude");
        assert_eq!(columns.get("lon").unwrap().description, "longitude");
        assert_eq!(columns.get("p").unwrap().description, "");
    }

    #[test]
    fn description_without_key_is_dropped() {
        let mut acc = Accumulator::default();
        acc.on_event(&desc(ScalarType::Int8, "orphan")).unwrap();
        acc.on_event(&key(ScalarType::Int8, "mode")).unwrap();
        acc.on_event(&desc(ScalarType::Int8, "flight mode")).unwrap();

        // first description arrived first, so it wins the position
        let columns = acc.finish();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns.get("mode").unwrap().description, "orphan");
    }

    #[test]
    fn truncated_data_frame() {
        let mut acc = Accumulator::default();
        acc.on_event(&key(ScalarType::Uint32, "count")).unwrap();
        acc.on_event(&key(ScalarType::Uint8, "flag")).unwrap();

        let zult = acc.on_event(&Message {
            tag: Kind::Data.tag(),
            payload: vec![0, 0, 0, 0],
        });
        assert!(
            matches!(
                zult,
                Err(Error::TruncatedDataFrame {
                    actual: 4,
                    minimum: 5
                })
            ),
            "got {zult:?}"
        );

        // nothing was appended
        assert_eq!(acc.data_frames(), 0);
        let columns = acc.finish();
        assert!(columns.iter().all(Column::is_empty));
    }

    #[test]
    fn trailing_data_bytes_are_ignored() {
        let mut acc = Accumulator::default();
        acc.on_event(&key(ScalarType::Uint8, "x")).unwrap();
        acc.on_event(&Message {
            tag: Kind::Data.tag(),
            payload: vec![5, 6, 7],
        })
        .unwrap();
        assert_eq!(acc.finish().get("x").unwrap().samples, Samples::Uint8(vec![5]));
    }

    #[test]
    fn malformed_tag() {
        let mut acc = Accumulator::default();
        let zult = acc.on_event(&Message {
            tag: 21,
            payload: vec![],
        });
        assert!(matches!(zult, Err(Error::MalformedTag(21))));
    }

    #[test]
    fn non_ascii_key_is_invalid() {
        let mut acc = Accumulator::default();
        let zult = acc.on_event(&Message {
            tag: Kind::Key(ScalarType::Uint8).tag(),
            payload: vec![b'a', 0xe9],
        });
        assert!(matches!(
            zult,
            Err(Error::InvalidEncoding {
                byte: 0xe9,
                offset: 1
            })
        ));
        assert!(acc.finish().is_empty());
    }

    #[test]
    fn key_after_data_is_rejected() {
        let mut acc = Accumulator::default();
        acc.on_event(&key(ScalarType::Uint8, "x")).unwrap();
        acc.on_event(&data(DataRecord::new().push(1u8))).unwrap();

        let zult = acc.on_event(&key(ScalarType::Uint8, "y"));
        assert!(matches!(zult, Err(Error::LateKey { data_frames: 1, .. })));
        assert_eq!(acc.finish().len(), 1);
    }

    #[test]
    fn data_frame_limit() {
        let config = AccumulatorConfig::builder().max_data_frames(2).build();
        let mut acc = Accumulator::new(config);
        acc.on_event(&key(ScalarType::Uint8, "x")).unwrap();

        let record = DataRecord::new().push(1u8).clone();
        assert_eq!(acc.on_event(&data(&record)).unwrap(), Progress::Continue);
        assert_eq!(acc.on_event(&data(&record)).unwrap(), Progress::LimitReached);
        assert!(acc.is_full());
        assert_eq!(acc.on_event(&data(&record)).unwrap(), Progress::LimitReached);

        let columns = acc.finish();
        assert_eq!(columns.data_frames(), 2);
        assert_eq!(columns.get("x").unwrap().len(), 2);
    }

    #[test]
    fn data_with_no_columns_counts_frames() {
        let mut acc = Accumulator::default();
        acc.on_event(&data(&DataRecord::new())).unwrap();
        let columns = acc.finish();
        assert!(columns.is_empty());
        assert_eq!(columns.data_frames(), 1);
    }
}
