#![doc = include_str!("../README.md")]

mod decode;
mod error;

pub mod columns;
pub mod container;
pub mod message;

pub use columns::{AccumulatorConfig, Column, Columns, Samples};
pub use decode::{decode_log, DecodedLog};
pub use error::{Error, Result};
pub use message::{Kind, Message, ScalarType};
