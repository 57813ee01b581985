mod accumulator;

use serde::{Serialize, Serializer};

use crate::message::{Scalar, ScalarType};

pub use accumulator::{Accumulator, AccumulatorConfig, Progress};

/// Typed sample storage for a single column.
///
/// Serializes as a plain array. JSON has no number form for non-finite floats, so
/// those are written as the strings `"NaN"`, `"inf"` and `"-inf"`.
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    Uint64(Vec<u64>),
    Uint32(Vec<u32>),
    Uint16(Vec<u16>),
    Uint8(Vec<u8>),
    Int64(Vec<i64>),
    Int32(Vec<i32>),
    Int16(Vec<i16>),
    Int8(Vec<i8>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

// Apply $body to the inner vector of every variant.
macro_rules! with_samples {
    ($samples:expr, $v:ident => $body:expr) => {
        match $samples {
            Samples::Uint64($v) => $body,
            Samples::Uint32($v) => $body,
            Samples::Uint16($v) => $body,
            Samples::Uint8($v) => $body,
            Samples::Int64($v) => $body,
            Samples::Int32($v) => $body,
            Samples::Int16($v) => $body,
            Samples::Int8($v) => $body,
            Samples::Float($v) => $body,
            Samples::Double($v) => $body,
        }
    };
}

impl Samples {
    #[must_use]
    pub fn new(ty: ScalarType) -> Self {
        match ty {
            ScalarType::Uint64 => Samples::Uint64(Vec::new()),
            ScalarType::Uint32 => Samples::Uint32(Vec::new()),
            ScalarType::Uint16 => Samples::Uint16(Vec::new()),
            ScalarType::Uint8 => Samples::Uint8(Vec::new()),
            ScalarType::Int64 => Samples::Int64(Vec::new()),
            ScalarType::Int32 => Samples::Int32(Vec::new()),
            ScalarType::Int16 => Samples::Int16(Vec::new()),
            ScalarType::Int8 => Samples::Int8(Vec::new()),
            ScalarType::Float => Samples::Float(Vec::new()),
            ScalarType::Double => Samples::Double(Vec::new()),
        }
    }

    #[must_use]
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Samples::Uint64(_) => ScalarType::Uint64,
            Samples::Uint32(_) => ScalarType::Uint32,
            Samples::Uint16(_) => ScalarType::Uint16,
            Samples::Uint8(_) => ScalarType::Uint8,
            Samples::Int64(_) => ScalarType::Int64,
            Samples::Int32(_) => ScalarType::Int32,
            Samples::Int16(_) => ScalarType::Int16,
            Samples::Int8(_) => ScalarType::Int8,
            Samples::Float(_) => ScalarType::Float,
            Samples::Double(_) => ScalarType::Double,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        with_samples!(self, v => v.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode one little-endian sample from the start of `dat` and append it.
    ///
    /// # Panics
    /// If `dat` is shorter than the width of this column's type.
    pub(crate) fn push_le(&mut self, dat: &[u8]) {
        with_samples!(self, v => v.push(Scalar::from_le_slice(dat)));
    }
}

impl Serialize for Samples {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Samples::Float(v) => {
                serializer.collect_seq(v.iter().map(|x| FloatSample(f64::from(*x), Some(*x))))
            }
            Samples::Double(v) => serializer.collect_seq(v.iter().map(|x| FloatSample(*x, None))),
            _ => with_samples!(self, v => v.serialize(serializer)),
        }
    }
}

// A float sample; the f32 is kept so single precision values print as written.
struct FloatSample(f64, Option<f32>);

impl Serialize for FloatSample {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match (self.0, self.1) {
            (v, _) if v.is_nan() => serializer.serialize_str("NaN"),
            (v, _) if v == f64::INFINITY => serializer.serialize_str("inf"),
            (v, _) if v == f64::NEG_INFINITY => serializer.serialize_str("-inf"),
            (_, Some(v)) => serializer.serialize_f32(v),
            (v, None) => serializer.serialize_f64(v),
        }
    }
}

/// A named, described sequence of samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    /// Empty if no description was provided
    pub description: String,
    pub samples: Samples,
}

impl Column {
    #[must_use]
    pub fn scalar_type(&self) -> ScalarType {
        self.samples.scalar_type()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Finished columns, grouped by [ScalarType] in declaration order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Columns {
    groups: [Vec<Column>; ScalarType::COUNT],
    data_frames: usize,
}

impl Columns {
    pub(crate) fn new(groups: [Vec<Column>; ScalarType::COUNT], data_frames: usize) -> Self {
        Columns {
            groups,
            data_frames,
        }
    }

    /// Columns declared for `ty`, in declaration order.
    #[must_use]
    pub fn group(&self, ty: ScalarType) -> &[Column] {
        &self.groups[ty.index()]
    }

    /// All columns, by wire type order then declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.groups.iter().flatten()
    }

    /// First column named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Column> {
        self.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of data frames accumulated, i.e., the length of every column.
    #[must_use]
    pub fn data_frames(&self) -> usize {
        self.data_frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_match_their_type() {
        for ty in ScalarType::ALL {
            let samples = Samples::new(ty);
            assert_eq!(samples.scalar_type(), ty);
            assert!(samples.is_empty());
        }
    }

    #[test]
    fn push_le_decodes_by_type() {
        let mut samples = Samples::new(ScalarType::Int32);
        samples.push_le(&(-70_000i32).to_le_bytes());
        samples.push_le(&[1, 0, 0, 0, 0xff]);
        assert_eq!(samples, Samples::Int32(vec![-70_000, 1]));

        let mut samples = Samples::new(ScalarType::Double);
        samples.push_le(&0.25f64.to_le_bytes());
        assert_eq!(samples, Samples::Double(vec![0.25]));
    }

    #[test]
    fn samples_serialize_as_plain_arrays() {
        let samples = Samples::Uint16(vec![1, 2, 3]);
        assert_eq!(serde_json::to_string(&samples).unwrap(), "[1,2,3]");

        let samples = Samples::Float(vec![0.1, -2.5]);
        assert_eq!(serde_json::to_string(&samples).unwrap(), "[0.1,-2.5]");
    }

    #[test]
    fn non_finite_floats_serialize_as_strings() {
        let samples = Samples::Float(vec![f32::NAN, 1.5, f32::INFINITY, f32::NEG_INFINITY]);
        assert_eq!(
            serde_json::to_string(&samples).unwrap(),
            r#"["NaN",1.5,"inf","-inf"]"#
        );

        let samples = Samples::Double(vec![f64::NEG_INFINITY, 0.25, f64::NAN]);
        assert_eq!(
            serde_json::to_string(&samples).unwrap(),
            r#"["-inf",0.25,"NaN"]"#
        );
    }
}
