//! String values and their operations
//!
//! [`FlexStr`] is the crate's central type: a byte string stored inline,
//! in an allocator-owned buffer, or as a non-owning slice. The sibling
//! modules attach search, mutation, strip/indent, tokenization, edit
//! distance, and hashing to it.

pub mod distance;
pub mod flex_str;
pub mod hash;
pub mod mutate;
pub mod search;
pub mod strip;
pub mod token;

pub use distance::edit_distance;
pub use flex_str::{FlexStr, StrVariant, INLINE_CAP};
pub use hash::hash_bytes;
pub use strip::DEFAULT_STRIP_CLASS;
pub use token::{Split, Tokens};
