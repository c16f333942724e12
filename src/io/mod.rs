//! Streams and file I/O
//!
//! The [`Stream`] trait is the crate's byte-transport seam: files,
//! string values, and user types all sit behind the same eight
//! operations. Whole-file helpers for string values live here too.

pub mod file;
pub mod stream;
pub mod string_stream;

pub use file::{read_file, write_file, FileStream};
pub use stream::{SeekOrigin, SerialSlot, SerialValue, Stream, WriterStream};
pub use string_stream::StrStream;
