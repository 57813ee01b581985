use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Scalar sample types, in wire order.
///
/// The discriminant is the type's position within a data frame and the offset
/// of its `Key`/`Desc` message kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScalarType {
    Uint64 = 0,
    Uint32,
    Uint16,
    Uint8,
    Int64,
    Int32,
    Int16,
    Int8,
    Float,
    Double,
}

impl ScalarType {
    pub const COUNT: usize = 10;

    /// All types in the order their samples are packed in a data frame.
    pub const ALL: [ScalarType; Self::COUNT] = [
        Self::Uint64,
        Self::Uint32,
        Self::Uint16,
        Self::Uint8,
        Self::Int64,
        Self::Int32,
        Self::Int16,
        Self::Int8,
        Self::Float,
        Self::Double,
    ];

    /// Number of bytes used by a single sample.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::Uint64 | Self::Int64 | Self::Double => 8,
            Self::Uint32 | Self::Int32 | Self::Float => 4,
            Self::Uint16 | Self::Int16 => 2,
            Self::Uint8 | Self::Int8 => 1,
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Element type name used for stored datasets.
    #[must_use]
    pub const fn dtype(self) -> &'static str {
        match self {
            Self::Uint64 => "uint64",
            Self::Uint32 => "uint32",
            Self::Uint16 => "uint16",
            Self::Uint8 => "uint8",
            Self::Int64 => "int64",
            Self::Int32 => "int32",
            Self::Int16 => "int16",
            Self::Int8 => "int8",
            Self::Float => "float",
            Self::Double => "double",
        }
    }
}

impl Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A primitive that can be carried as a sample in a data frame.
///
/// All samples are little-endian on the wire.
pub trait Scalar: Copy + Send + 'static {
    const TYPE: ScalarType;

    /// Decode from the first `Self::TYPE.width()` bytes of `dat`.
    ///
    /// # Panics
    /// If `dat` is shorter than the type's width.
    fn from_le_slice(dat: &[u8]) -> Self;

    fn extend_le(self, out: &mut Vec<u8>);
}

macro_rules! impl_scalar {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl Scalar for $t {
                const TYPE: ScalarType = ScalarType::$variant;

                fn from_le_slice(dat: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    let n = buf.len();
                    buf.copy_from_slice(&dat[..n]);
                    <$t>::from_le_bytes(buf)
                }

                fn extend_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_scalar!(
    u64 => Uint64,
    u32 => Uint32,
    u16 => Uint16,
    u8 => Uint8,
    i64 => Int64,
    i32 => Int32,
    i16 => Int16,
    i8 => Int8,
    f32 => Float,
    f64 => Double,
);
