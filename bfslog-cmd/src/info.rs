use anyhow::{Context, Result};
use bfslog::message::ParseStats;
use bfslog::{decode_log, AccumulatorConfig, Columns};
use handlebars::handlebars_helper;
use serde::Serialize;
use std::{
    io::{stdout, Write},
    path::Path,
};

#[derive(Debug, Clone)]
pub enum Format {
    Json,
    Text,
}

impl clap::ValueEnum for Format {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Json, Self::Text]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            Self::Json => Some(clap::builder::PossibleValue::new("json")),
            Self::Text => Some(clap::builder::PossibleValue::new("text")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ColumnInfo {
    name: String,
    dtype: &'static str,
    description: String,
    samples: usize,
}

#[derive(Debug, Clone, Serialize)]
struct Info {
    filename: String,
    stats: ParseStats,
    data_frames: usize,
    columns: Vec<ColumnInfo>,
}

impl Info {
    fn new(filename: String, stats: ParseStats, columns: &Columns) -> Self {
        Info {
            filename,
            stats,
            data_frames: columns.data_frames(),
            columns: columns
                .iter()
                .map(|col| ColumnInfo {
                    name: col.name.clone(),
                    dtype: col.scalar_type().dtype(),
                    description: col.description.clone(),
                    samples: col.len(),
                })
                .collect(),
        }
    }
}

fn summarize(fpath: &Path) -> Result<Info> {
    let reader = std::fs::File::open(fpath).context("opening input")?;
    let log = decode_log(reader, AccumulatorConfig::default()).context("decoding log")?;
    Ok(Info::new(
        fpath.to_string_lossy().to_string(),
        log.stats,
        &log.columns,
    ))
}

pub fn info(fpath: &Path, format: &Format) -> Result<()> {
    let info = summarize(fpath)?;

    match format {
        Format::Json => {
            serde_json::to_writer_pretty(stdout(), &info).context("serializing to json")
        }
        Format::Text => {
            let data = render_text(&info).context("serializing info")?;
            stdout()
                .write_all(str::as_bytes(&data))
                .context("writing to stdout")
        }
    }
}

fn render_text(info: &Info) -> Result<String> {
    handlebars_helper!(left_pad: |num: u64, v: Json| {
        let v = match v {
            serde_json::Value::String(s) => s.to_owned(),
            serde_json::Value::Null => String::new(),
            _ => v.to_string()
        };
        let num = usize::try_from(num).unwrap_or_default().max(v.len());
        format!("{v:>num$}")
    });
    let mut hb = handlebars::Handlebars::new();
    hb.register_escape_fn(handlebars::no_escape);
    hb.register_helper("lpad", Box::new(left_pad));
    hb.register_template_string("info", TEXT_TEMPLATE)
        .context("registering template")?;

    hb.render("info", &info).context("rendering text")
}

const TEXT_TEMPLATE: &str = r"{{ filename }}
===============================================================================================
Bytes:             {{ stats.bytes }}
Messages:          {{ stats.messages }}
Data frames:       {{ data_frames }}
Sync discarded:    {{ stats.sync_discarded }}
Checksum failures: {{ stats.checksum_failures }}
-----------------------------------------------------------------------------------------------
                    Name    Type   Samples  Description
-----------------------------------------------------------------------------------------------
{{ #each columns }}{{ lpad 24 name }}  {{ lpad 6 dtype }}  {{ lpad 8 samples }}  {{ description }}
{{/each }}
";
