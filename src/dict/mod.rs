//! String-keyed dictionary
//!
//! [`StrMap`] maps owned [`FlexStr`](crate::FlexStr) keys to arbitrary
//! values with metadata-banded open addressing and SIMD probe matching.

pub mod str_map;

pub use str_map::{HashFn, Iter, StrMap};
