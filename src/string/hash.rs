//! String hashing
//!
//! The bundled hash is FNV-1a with constants selected for the target
//! word width. The `external-hash` feature swaps in `ahash` with a
//! per-process random state. Either way the result is stable for the
//! lifetime of the process and nothing more: values must not be
//! persisted or compared across builds.

use super::flex_str::FlexStr;

#[cfg(all(target_pointer_width = "64", not(feature = "external-hash")))]
mod fnv {
    pub const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    pub const PRIME: u64 = 0x0000_0100_0000_01b3;
}

#[cfg(all(not(target_pointer_width = "64"), not(feature = "external-hash")))]
mod fnv {
    pub const OFFSET: u64 = 0x811c_9dc5;
    pub const PRIME: u64 = 0x0100_0193;
}

/// 64-bit non-cryptographic hash of a byte string.
#[cfg(not(feature = "external-hash"))]
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut h = fnv::OFFSET;
    for &b in bytes {
        h ^= b as u64;
        h = h.wrapping_mul(fnv::PRIME);
    }
    h
}

/// 64-bit non-cryptographic hash of a byte string.
#[cfg(feature = "external-hash")]
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    use std::hash::{BuildHasher, Hasher};
    use std::sync::OnceLock;

    static STATE: OnceLock<ahash::RandomState> = OnceLock::new();
    let state = STATE.get_or_init(ahash::RandomState::new);
    let mut hasher = state.build_hasher();
    hasher.write(bytes);
    hasher.finish()
}

impl FlexStr<'_> {
    /// Hash of the string's bytes; see the [module docs](self) for
    /// stability guarantees.
    #[inline]
    pub fn hash_bytes(&self) -> u64 {
        hash_bytes(self.as_bytes())
    }
}
