//! Persist [Columns] as named, described datasets.
//!
//! The container is a JSON document with one dataset per column, in wire type order
//! then declaration order:
//!
//! ```json
//! {
//!   "root": "/",
//!   "datasets": [
//!     {
//!       "name": "alt",
//!       "dtype": "uint8",
//!       "shape": [3, 1],
//!       "attrs": { "Description": "altitude" },
//!       "data": [10, 20, 30]
//!     }
//!   ]
//! }
//! ```
//!
//! Non-finite `float` and `double` samples are written as the strings `"NaN"`,
//! `"inf"` and `"-inf"` since JSON numbers cannot represent them.
use std::collections::HashSet;
use std::io::Write;

use serde::Serialize;

use crate::columns::{Columns, Samples};
use crate::{Error, Result};

#[derive(Debug, Clone, Serialize)]
pub struct Attributes<'a> {
    #[serde(rename = "Description")]
    pub description: &'a str,
}

/// A single named dataset.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset<'a> {
    pub name: &'a str,
    /// Element type, one of [ScalarType::dtype](crate::message::ScalarType::dtype)
    pub dtype: &'static str,
    /// Number of data frames by one
    pub shape: [usize; 2],
    pub attrs: Attributes<'a>,
    pub data: &'a Samples,
}

#[derive(Debug, Clone, Serialize)]
pub struct Container<'a> {
    pub root: &'static str,
    pub datasets: Vec<Dataset<'a>>,
}

impl<'a> Container<'a> {
    /// Create the container layout for `columns`.
    ///
    /// # Errors
    /// [Error::DuplicateDataset] if two columns have the same name.
    pub fn from_columns(columns: &'a Columns) -> Result<Self> {
        let mut seen: HashSet<&str> = HashSet::default();
        let mut datasets = Vec::with_capacity(columns.len());
        for col in columns.iter() {
            if !seen.insert(col.name.as_str()) {
                return Err(Error::DuplicateDataset(col.name.clone()));
            }
            datasets.push(Dataset {
                name: &col.name,
                dtype: col.scalar_type().dtype(),
                shape: [columns.data_frames(), 1],
                attrs: Attributes {
                    description: &col.description,
                },
                data: &col.samples,
            });
        }
        Ok(Container {
            root: "/",
            datasets,
        })
    }

    /// Write this container as pretty printed JSON to `writer`.
    ///
    /// # Errors
    /// Any error serializing or writing.
    pub fn write_json<W>(&self, mut writer: W) -> Result<()>
    where
        W: Write,
    {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// Write `columns` as a JSON container to `writer`.
///
/// Columns are validated before anything is written.
///
/// # Errors
/// [Error::DuplicateDataset] for duplicate column names, or any error serializing
/// or writing.
pub fn write_json<W>(columns: &Columns, writer: W) -> Result<()>
where
    W: Write,
{
    Container::from_columns(columns)?.write_json(writer)
}
