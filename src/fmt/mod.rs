//! Formatted printing over streams
//!
//! A concatenative `printf`-like front-end: [`write_fmt`] drives any
//! [`Stream`](crate::io::Stream), [`format_str`] concatenates into a
//! string value, and [`print`]/[`eprint`] go to the standard streams.

pub mod printer;

pub use printer::{eprint, format_str, print, write_fmt, FmtArg};
