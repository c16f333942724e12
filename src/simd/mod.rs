//! SIMD scan kernel
//!
//! Block-wide byte search primitives with runtime tier selection. See
//! [`kernel`] for the dispatch record and [`ByteSet`] for set membership.

pub mod kernel;

pub use kernel::{detect, kernel, match_byte16, ByteSet, ScanKernel, ScanTier};
