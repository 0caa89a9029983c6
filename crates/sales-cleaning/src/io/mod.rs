//! Reading and writing delimited files.
//!
//! Both directions go through `encoding_rs` so the on-disk text encoding is a
//! configuration value: the input is decoded strictly before polars parses
//! it, and the serialized output is encoded before it touches the disk.

mod reader;
mod writer;

pub use reader::{DatasetReader, resolve_encoding};
pub use writer::DatasetWriter;
