//! Vector scan primitives with tiered dispatch
//!
//! The kernel exposes three block-wide primitives: byte equality
//! ([`ScanKernel::match_chr`]), byte-set membership
//! ([`ScanKernel::match_set`]) and pairwise equality
//! ([`ScanKernel::compare`]). Each returns a lane bitmask where bit `i`
//! reports lane `i` of the block; lanes at and above the kernel width are
//! always zero, so `trailing_zeros`/`leading_zeros` arithmetic works the
//! same on every tier.
//!
//! Tier selection happens once per process. The default build picks the
//! widest instruction set the CPU reports on first use; with the
//! `dynamic-detect` feature the kernel stays at width zero (every search
//! takes the scalar tail) until [`detect`] runs. The `no-simd` feature
//! pins the scalar tier outright.

use crate::system::get_cpu_features;
use std::sync::OnceLock;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

/// Membership table over the 256 byte values.
///
/// Built once per search from the caller's set bytes; lookups are a
/// single indexed load. The raw bytes are kept so narrow sets can be
/// probed with per-byte vector compares instead of the table.
#[derive(Clone)]
pub struct ByteSet {
    table: [bool; 256],
    bytes: [u8; 8],
    narrow: u8,
}

impl ByteSet {
    /// Build a set from its member bytes (duplicates are fine).
    pub fn new(members: &[u8]) -> Self {
        let mut table = [false; 256];
        let mut bytes = [0u8; 8];
        let mut narrow = 0usize;

        for &b in members {
            if !table[b as usize] {
                if narrow < bytes.len() {
                    bytes[narrow] = b;
                }
                narrow += 1;
            }
            table[b as usize] = true;
        }

        Self {
            table,
            bytes,
            narrow: narrow.min(u8::MAX as usize) as u8,
        }
    }

    /// Membership test for one byte.
    #[inline]
    pub fn contains(&self, byte: u8) -> bool {
        self.table[byte as usize]
    }

    /// Distinct members when the set is narrow enough for the
    /// compare-per-member vector path, `None` otherwise.
    #[inline]
    fn narrow_members(&self) -> Option<&[u8]> {
        (self.narrow as usize <= self.bytes.len())
            .then(|| &self.bytes[..self.narrow as usize])
    }
}

impl std::fmt::Debug for ByteSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let members: Vec<u8> = (0u16..256)
            .filter(|&b| self.table[b as usize])
            .map(|b| b as u8)
            .collect();
        f.debug_struct("ByteSet").field("members", &members).finish()
    }
}

/// Instruction-set tier the kernel dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTier {
    /// No vector path; width is zero and searches take the per-byte tail.
    Scalar,
    /// 16-byte blocks via SSE2.
    Sse2,
    /// 32-byte blocks via AVX2.
    Avx2,
}

/// The process-wide dispatch record.
#[derive(Debug, Clone, Copy)]
pub struct ScanKernel {
    tier: ScanTier,
    width: usize,
}

static SCALAR: ScanKernel = ScanKernel {
    tier: ScanTier::Scalar,
    width: 0,
};

static KERNEL: OnceLock<ScanKernel> = OnceLock::new();

/// Probe CPU features and fix the kernel tier for the process.
///
/// Idempotent; later calls return the first result. Under the
/// `dynamic-detect` feature nothing is vectorized until this runs.
pub fn detect() -> &'static ScanKernel {
    KERNEL.get_or_init(|| {
        let kernel = ScanKernel::from_cpu();
        log::debug!("scan kernel tier: {:?} (width {})", kernel.tier, kernel.width);
        kernel
    })
}

/// The current kernel.
///
/// In the default build this selects the tier on first use; under
/// `dynamic-detect` it stays scalar until [`detect`] has been called.
#[inline]
pub fn kernel() -> &'static ScanKernel {
    #[cfg(feature = "dynamic-detect")]
    {
        KERNEL.get().unwrap_or(&SCALAR)
    }
    #[cfg(not(feature = "dynamic-detect"))]
    {
        detect()
    }
}

impl ScanKernel {
    fn from_cpu() -> Self {
        if cfg!(feature = "no-simd") {
            return SCALAR;
        }

        let features = get_cpu_features();
        if features.has_avx2 {
            Self {
                tier: ScanTier::Avx2,
                width: 32,
            }
        } else if features.has_sse2 {
            Self {
                tier: ScanTier::Sse2,
                width: 16,
            }
        } else {
            SCALAR
        }
    }

    /// Selected tier.
    #[inline]
    pub fn tier(&self) -> ScanTier {
        self.tier
    }

    /// Block width `V` in bytes; zero means no vector path.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Bitmask of lanes in `block[..width]` equal to `c`.
    ///
    /// `block` must hold at least [`width`](Self::width) bytes.
    #[inline]
    pub fn match_chr(&self, block: &[u8], c: u8) -> u32 {
        debug_assert!(block.len() >= self.width);
        match self.tier {
            ScanTier::Scalar => 0,
            ScanTier::Sse2 => unsafe { match_chr_sse2(block, c) as u32 },
            ScanTier::Avx2 => unsafe { match_chr_avx2(block, c) },
        }
    }

    /// Bitmask of lanes in `block[..width]` that are members of `set`.
    #[inline]
    pub fn match_set(&self, block: &[u8], set: &ByteSet) -> u32 {
        debug_assert!(block.len() >= self.width);
        match self.tier {
            ScanTier::Scalar => 0,
            ScanTier::Sse2 | ScanTier::Avx2 => {
                if let Some(members) = set.narrow_members() {
                    // Few distinct members: OR one vector compare per member.
                    let mut mask = 0u32;
                    for &m in members {
                        mask |= self.match_chr(block, m);
                    }
                    mask
                } else {
                    let mut mask = 0u32;
                    for (i, &b) in block[..self.width].iter().enumerate() {
                        mask |= (set.contains(b) as u32) << i;
                    }
                    mask
                }
            }
        }
    }

    /// Bitmask of lanes where `a` and `b` hold equal bytes.
    ///
    /// Both slices must hold at least [`width`](Self::width) bytes.
    #[inline]
    pub fn compare(&self, a: &[u8], b: &[u8]) -> u32 {
        debug_assert!(a.len() >= self.width && b.len() >= self.width);
        match self.tier {
            ScanTier::Scalar => 0,
            ScanTier::Sse2 => unsafe { compare_sse2(a, b) as u32 },
            ScanTier::Avx2 => unsafe { compare_avx2(a, b) },
        }
    }
}

/// 16-lane byte-equality mask over a fixed metadata strip.
///
/// Unlike the kernel primitives this never degrades to width zero: the
/// dictionary's bucket strips are always 16 bytes, so the SSE2 path is
/// used whenever the CPU has it and a scalar loop covers the rest.
#[inline]
pub fn match_byte16(block: &[u8; 16], c: u8) -> u16 {
    #[cfg(target_arch = "x86_64")]
    {
        if !cfg!(feature = "no-simd") && get_cpu_features().has_sse2 {
            return unsafe { match_chr_sse2(block, c) };
        }
    }

    let mut mask = 0u16;
    for (i, &b) in block.iter().enumerate() {
        mask |= ((b == c) as u16) << i;
    }
    mask
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn match_chr_sse2(block: &[u8], c: u8) -> u16 {
    let needle = _mm_set1_epi8(c as i8);
    let data = unsafe { _mm_loadu_si128(block.as_ptr() as *const __m128i) };
    _mm_movemask_epi8(_mm_cmpeq_epi8(data, needle)) as u16
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn match_chr_avx2(block: &[u8], c: u8) -> u32 {
    let needle = _mm256_set1_epi8(c as i8);
    let data = unsafe { _mm256_loadu_si256(block.as_ptr() as *const __m256i) };
    _mm256_movemask_epi8(_mm256_cmpeq_epi8(data, needle)) as u32
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn compare_sse2(a: &[u8], b: &[u8]) -> u16 {
    let left = unsafe { _mm_loadu_si128(a.as_ptr() as *const __m128i) };
    let right = unsafe { _mm_loadu_si128(b.as_ptr() as *const __m128i) };
    _mm_movemask_epi8(_mm_cmpeq_epi8(left, right)) as u16
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn compare_avx2(a: &[u8], b: &[u8]) -> u32 {
    let left = unsafe { _mm256_loadu_si256(a.as_ptr() as *const __m256i) };
    let right = unsafe { _mm256_loadu_si256(b.as_ptr() as *const __m256i) };
    _mm256_movemask_epi8(_mm256_cmpeq_epi8(left, right)) as u32
}

#[cfg(not(target_arch = "x86_64"))]
unsafe fn match_chr_sse2(_block: &[u8], _c: u8) -> u16 {
    0
}

#[cfg(not(target_arch = "x86_64"))]
unsafe fn match_chr_avx2(_block: &[u8], _c: u8) -> u32 {
    0
}

#[cfg(not(target_arch = "x86_64"))]
unsafe fn compare_sse2(_a: &[u8], _b: &[u8]) -> u16 {
    0
}

#[cfg(not(target_arch = "x86_64"))]
unsafe fn compare_avx2(_a: &[u8], _b: &[u8]) -> u32 {
    0
}
