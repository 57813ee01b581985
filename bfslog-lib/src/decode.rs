use std::io::Read;

use tracing::{debug, info};

use crate::columns::{Accumulator, AccumulatorConfig, Columns, Progress};
use crate::message::{decode_messages, ParseStats};
use crate::Result;

/// The result of decoding an entire log.
#[derive(Debug, Clone)]
pub struct DecodedLog {
    pub columns: Columns,
    pub stats: ParseStats,
    /// True if decoding stopped early due to the configured data frame limit.
    pub limited: bool,
}

/// Decode all messages from `reader` into [Columns].
///
/// Framing problems (noise between frames, bad checksums) are skipped and only
/// counted in [DecodedLog::stats]. Problems with the content of a valid message are
/// returned as errors since they indicate the log was not written in the expected
/// format.
///
/// # Errors
/// Any IO error reading, or any [Accumulator::on_event] error.
///
/// # Example
/// ```
/// use bfslog::{decode_log, AccumulatorConfig};
/// use bfslog::message::{DataRecord, LogWriter, ScalarType};
///
/// let mut writer = LogWriter::new(Vec::new());
/// writer.write_key(ScalarType::Uint8, "alt")?;
/// writer.write_desc(ScalarType::Uint8, "altitude")?;
/// writer.write_data(DataRecord::new().push(12u8))?;
/// let dat = writer.into_inner();
///
/// let log = decode_log(dat.as_slice(), AccumulatorConfig::default())?;
/// let alt = log.columns.get("alt").unwrap();
/// assert_eq!(alt.description, "altitude");
/// assert_eq!(alt.len(), 1);
/// # Ok::<(), bfslog::Error>(())
/// ```
pub fn decode_log<R>(reader: R, config: AccumulatorConfig) -> Result<DecodedLog>
where
    R: Read,
{
    let mut messages = decode_messages(reader);
    let mut acc = Accumulator::new(config);
    let mut limited = false;

    for zult in messages.by_ref() {
        let message = zult?;
        if acc.on_event(&message)? == Progress::LimitReached {
            limited = true;
            break;
        }
    }

    let stats = *messages.stats();
    if stats.checksum_failures > 0 || stats.sync_discarded > 0 {
        info!(
            checksum_failures = stats.checksum_failures,
            sync_discarded = stats.sync_discarded,
            "skipped corrupt data"
        );
    }
    debug!(?stats, data_frames = acc.data_frames(), limited, "decoded log");

    Ok(DecodedLog {
        columns: acc.finish(),
        stats,
        limited,
    })
}
