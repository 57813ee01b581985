#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Message type tag is not one of the known message kinds.
    #[error("malformed message type tag {0}")]
    MalformedTag(u8),

    /// Key or description payload contains a non-ASCII byte.
    #[error("invalid text encoding: byte {byte:#04x} at offset {offset}")]
    InvalidEncoding { byte: u8, offset: usize },

    /// Data payload does not cover every declared column.
    #[error("truncated data frame")]
    TruncatedDataFrame {
        /// Number of payload bytes we got
        actual: usize,
        /// Number of bytes required by the declared columns
        minimum: usize,
    },

    /// A key was declared once data frames had already been accumulated.
    #[error("key {key:?} declared after {data_frames} data frames")]
    LateKey { key: String, data_frames: usize },

    #[error("payload of {0} bytes does not fit in a message")]
    PayloadTooLarge(usize),

    #[error("duplicate dataset name {0:?}")]
    DuplicateDataset(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
