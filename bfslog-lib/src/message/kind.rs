use std::fmt::Display;

use super::ScalarType;
use crate::{Error, Result};

/// The kind of a message, selected by its type tag.
///
/// Tags 0-9 declare a column key for each [ScalarType] in wire order, tags 10-19
/// carry the matching descriptions and tag 20 is a data record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Payload is the ASCII name of a new column.
    Key(ScalarType),
    /// Payload is the ASCII description of a previously declared column.
    Desc(ScalarType),
    /// Payload is one packed sample per declared column.
    Data,
}

impl Kind {
    const DESC_OFFSET: u8 = ScalarType::COUNT as u8;
    pub const DATA_TAG: u8 = 2 * ScalarType::COUNT as u8;

    /// Wire tag for this kind.
    #[must_use]
    pub fn tag(self) -> u8 {
        match self {
            Kind::Key(ty) => ty as u8,
            Kind::Desc(ty) => Self::DESC_OFFSET + ty as u8,
            Kind::Data => Self::DATA_TAG,
        }
    }
}

impl TryFrom<u8> for Kind {
    type Error = Error;

    fn try_from(tag: u8) -> Result<Self> {
        let idx = usize::from(tag);
        match tag {
            t if t < Self::DESC_OFFSET => Ok(Kind::Key(ScalarType::ALL[idx])),
            t if t < Self::DATA_TAG => Ok(Kind::Desc(
                ScalarType::ALL[idx - ScalarType::COUNT],
            )),
            Self::DATA_TAG => Ok(Kind::Data),
            _ => Err(Error::MalformedTag(tag)),
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Key(ty) => write!(f, "{ty}Key"),
            Kind::Desc(ty) => write!(f, "{ty}Desc"),
            Kind::Data => write!(f, "Data"),
        }
    }
}
