use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use bfslog::container::Container;
use bfslog::{decode_log, AccumulatorConfig};
use tracing::{info, warn};

// data000.json through data999.json
const MAX_OUTPUT_SEQ: usize = 1000;

/// The first `dataNNN.json` in `dir` that does not exist.
pub fn next_output_path(dir: &Path) -> Result<PathBuf> {
    for seq in 0..MAX_OUTPUT_SEQ {
        let path = dir.join(format!("data{seq:03}.json"));
        if !path.exists() {
            return Ok(path);
        }
    }
    bail!("all default output names in {dir:?} are taken; use --output")
}

pub fn convert(input: &Path, output: &Path, config: AccumulatorConfig) -> Result<()> {
    let src = File::open(input).with_context(|| format!("opening input {input:?}"))?;
    let log = decode_log(src, config).with_context(|| format!("decoding {input:?}"))?;

    if log.limited {
        warn!(
            "stopped after {} data frames; remaining data ignored",
            log.columns.data_frames()
        );
    }
    info!(
        columns = log.columns.len(),
        data_frames = log.columns.data_frames(),
        messages = log.stats.messages,
        "decoded {input:?}"
    );

    // validate before creating the output
    let container = Container::from_columns(&log.columns)
        .with_context(|| format!("invalid columns in {input:?}"))?;
    let dest =
        File::create(output).with_context(|| format!("failed to create output {output:?}"))?;
    if let Err(err) = container.write_json(BufWriter::new(dest)) {
        let _ = fs::remove_file(output);
        return Err(err).with_context(|| format!("writing {output:?}"));
    }
    Ok(())
}
