//! # Bytekit: High-Performance Byte-String Processing
//!
//! This crate provides a coherent toolkit for byte-string work, built
//! around one central value type and the machinery that makes it fast.
//!
//! ## Key Features
//!
//! - **Tri-variant strings**: [`FlexStr`] stores bytes inline (SSO), in
//!   an allocator-owned buffer, or as a non-owning slice - one interface
//!   over all three
//! - **SIMD scan kernel**: byte search, set membership and block compare
//!   with runtime CPU feature detection and a clean scalar fallback
//! - **String-keyed dictionary**: [`StrMap`] with metadata-banded
//!   buckets, SIMD probe matching and tombstone deletion
//! - **Streams**: one eight-operation trait over files, string buffers
//!   and user types, with runtime-typed text serialization
//! - **Formatted printing**: a concatenative `printf`-style front-end
//!   with string-value, calendar-time and explicit-width directives
//! - **Encoders**: hex, URL, base64, C-string escapes, UTF-8, JSON and
//!   XML/HTML transforms over string values
//! - **Pattern engine**: a compact regex-like bytecode compiler and
//!   backtracking matcher with capture extraction
//! - **Allocator capability**: every owning value draws from a pluggable
//!   [`Allocator`], with arenas included
//!
//! ## Quick Start
//!
//! ```rust
//! use bytekit::{FlexStr, Pattern, StrMap};
//!
//! // small strings stay inline, large ones go to the heap
//! let mut s = FlexStr::new("hello").unwrap();
//! s.push_str(", world").unwrap();
//! assert_eq!(s.find("world"), Some(7));
//!
//! // string-keyed map with SIMD-probed buckets
//! let mut map = StrMap::new();
//! map.set(FlexStr::new("answer").unwrap(), 42).unwrap();
//! assert_eq!(map.get("answer"), Some(&42));
//!
//! // compile once, search anywhere
//! let pattern = Pattern::compile("w(or)ld").unwrap();
//! let m = pattern.find(s.as_bytes()).unwrap().unwrap();
//! assert_eq!(m.group(1).unwrap(), b"or");
//! ```
//!
//! ## Concurrency
//!
//! The crate is single-threaded by design: values are not internally
//! synchronized and long operations run to completion. The only
//! process-wide state is the scan-kernel dispatch record and the default
//! allocator, both immutable after initialization.

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod dict;
pub mod encoding;
pub mod error;
pub mod fmt;
pub mod io;
pub mod memory;
pub mod pattern;
pub mod simd;
pub mod string;
pub mod system;

// Re-export core types
pub use dict::StrMap;
pub use error::{BytekitError, Result};
pub use memory::{AllocFlags, Allocator, ArenaAllocator, SystemAllocator};
pub use pattern::{Match, Pattern};
pub use simd::{ByteSet, ScanTier};
pub use string::{FlexStr, StrVariant};

// Stream and printing surface
pub use fmt::FmtArg;
pub use io::{FileStream, SeekOrigin, SerialValue, Stream, StrStream};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Check whether a vectorized scan kernel is active.
pub fn has_simd_support() -> bool {
    simd::kernel().width() > 0
}

/// Initialize the library: probes CPU features and fixes the scan
/// kernel tier. Optional unless the `dynamic-detect` feature is on, in
/// which case nothing is vectorized until this runs.
pub fn init() {
    log::debug!("initializing bytekit v{}", VERSION);
    simd::detect();
}
