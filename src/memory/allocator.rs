//! The allocator capability used by every owning value in the crate
//!
//! An [`Allocator`] is a capability object threaded through constructors
//! rather than a hidden global: any function that receives a capacity also
//! receives the allocator it should draw from. A process-wide
//! [`SystemAllocator`] singleton is available through [`system()`] for the
//! common case.
//!
//! The whole interface funnels through a single call shape,
//! [`Allocator::raw_alloc`], whose behavior is selected by its
//! `(ptr, new_size)` pair. The convenience methods are thin wrappers
//! over it.

use bitflags::bitflags;
use std::alloc::{self, Layout};
use std::ptr::NonNull;

/// Alignment every allocation from the bundled allocators satisfies.
///
/// Matches the widest scan-kernel block so owned string buffers can be
/// walked with aligned vector loads.
pub const DEFAULT_ALIGN: usize = 32;

bitflags! {
    /// Request bits for a raw allocator call.
    ///
    /// Bit 0 requests zero-initialization of new bytes. All higher bits
    /// hold the requested alignment, a power of two (zero means the
    /// allocator default applies).
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    pub struct AllocFlags: usize {
        /// Zero-initialize newly visible bytes.
        const ZEROED = 1;
        // Alignment request occupies the remaining bits.
        const _ = !0;
    }
}

impl AllocFlags {
    /// Flags requesting a specific alignment (power of two, >= 2).
    #[inline]
    pub fn aligned(align: usize) -> Self {
        debug_assert!(align == 0 || align.is_power_of_two());
        Self::from_bits_retain(align & !1)
    }

    /// Requested alignment, or zero when the default applies.
    #[inline]
    pub fn alignment(self) -> usize {
        self.bits() & !1
    }

    /// Whether zero-initialization was requested.
    #[inline]
    pub fn is_zeroed(self) -> bool {
        self.contains(Self::ZEROED)
    }
}

/// Capability interface for memory providers.
///
/// Behavior of [`raw_alloc`](Self::raw_alloc) by `(ptr, new_size)`:
///
/// | `ptr`    | `new_size` | action |
/// |----------|------------|--------|
/// | `None`   | `0`        | no-op, returns `None` |
/// | `None`   | `> 0`      | fresh allocation (zeroed if requested) |
/// | `Some`   | `0`        | free; `old_size` is the original size |
/// | `Some`   | `> 0`      | resize in place or copy |
///
/// Returning `None` from an allocating call signals out-of-memory; call
/// sites translate that into
/// [`BytekitError::OutOfMemory`](crate::error::BytekitError::OutOfMemory).
/// When resizing with the zero bit set, bytes from `old_size` to
/// `new_size` are zeroed. When an alignment is requested and an in-place
/// resize cannot keep it, the allocator must move the block, copying the
/// overlap.
pub trait Allocator: Sync {
    /// The single call shape everything else is built on.
    ///
    /// # Safety
    ///
    /// When `ptr` is `Some`, it must have been returned by a previous
    /// allocating call on this same allocator with size `old_size`, and
    /// it must not be used again after this call returns.
    unsafe fn raw_alloc(
        &self,
        ptr: Option<NonNull<u8>>,
        old_size: usize,
        new_size: usize,
        flags: AllocFlags,
    ) -> Option<NonNull<u8>>;

    /// Release all bookkeeping for arena-style allocators.
    ///
    /// Standard allocators ignore this.
    ///
    /// # Safety
    ///
    /// Invalidates every pointer this allocator has handed out.
    unsafe fn release_all(&self) {}

    /// Allocate `size` uninitialized bytes.
    #[inline]
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        // ptr = None makes this call safe for any size.
        unsafe { self.raw_alloc(None, 0, size, AllocFlags::empty()) }
    }

    /// Allocate `size` zeroed bytes.
    #[inline]
    fn allocate_zeroed(&self, size: usize) -> Option<NonNull<u8>> {
        unsafe { self.raw_alloc(None, 0, size, AllocFlags::ZEROED) }
    }

    /// Allocate `size` bytes at the given alignment.
    #[inline]
    fn allocate_aligned(&self, size: usize, align: usize) -> Option<NonNull<u8>> {
        unsafe { self.raw_alloc(None, 0, size, AllocFlags::aligned(align)) }
    }

    /// Resize a previous allocation, preserving its contents.
    ///
    /// # Safety
    ///
    /// Same contract as [`raw_alloc`](Self::raw_alloc) with `Some(ptr)`.
    #[inline]
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_size: usize,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        unsafe { self.raw_alloc(Some(ptr), old_size, new_size, AllocFlags::empty()) }
    }

    /// Resize a previous allocation at the given alignment.
    ///
    /// # Safety
    ///
    /// Same contract as [`raw_alloc`](Self::raw_alloc) with `Some(ptr)`.
    #[inline]
    unsafe fn reallocate_aligned(
        &self,
        ptr: NonNull<u8>,
        old_size: usize,
        new_size: usize,
        align: usize,
    ) -> Option<NonNull<u8>> {
        unsafe { self.raw_alloc(Some(ptr), old_size, new_size, AllocFlags::aligned(align)) }
    }

    /// Return a previous allocation.
    ///
    /// # Safety
    ///
    /// Same contract as [`raw_alloc`](Self::raw_alloc) with `Some(ptr)`.
    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, old_size: usize) {
        unsafe {
            self.raw_alloc(Some(ptr), old_size, 0, AllocFlags::empty());
        }
    }
}

/// The process-wide default allocator, backed by the global Rust heap.
///
/// Every allocation is aligned to [`DEFAULT_ALIGN`]; alignment requests
/// above that are refused (returns `None`).
#[derive(Debug, Default)]
pub struct SystemAllocator;

static SYSTEM: SystemAllocator = SystemAllocator;

/// The process-wide [`SystemAllocator`] singleton.
#[inline]
pub fn system() -> &'static SystemAllocator {
    &SYSTEM
}

impl SystemAllocator {
    #[inline]
    fn layout(size: usize) -> Option<Layout> {
        Layout::from_size_align(size, DEFAULT_ALIGN).ok()
    }
}

impl Allocator for SystemAllocator {
    unsafe fn raw_alloc(
        &self,
        ptr: Option<NonNull<u8>>,
        old_size: usize,
        new_size: usize,
        flags: AllocFlags,
    ) -> Option<NonNull<u8>> {
        if flags.alignment() > DEFAULT_ALIGN {
            return None;
        }

        match (ptr, new_size) {
            (None, 0) => None,
            (None, _) => {
                let layout = Self::layout(new_size)?;
                let raw = unsafe {
                    if flags.is_zeroed() {
                        alloc::alloc_zeroed(layout)
                    } else {
                        alloc::alloc(layout)
                    }
                };
                NonNull::new(raw)
            }
            (Some(p), 0) => {
                let layout = Self::layout(old_size)?;
                unsafe { alloc::dealloc(p.as_ptr(), layout) };
                None
            }
            (Some(p), _) => {
                let layout = Self::layout(old_size)?;
                let raw = unsafe { alloc::realloc(p.as_ptr(), layout, new_size) };
                let out = NonNull::new(raw)?;
                if flags.is_zeroed() && new_size > old_size {
                    unsafe {
                        out.as_ptr().add(old_size).write_bytes(0, new_size - old_size);
                    }
                }
                Some(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_pack_zero_and_alignment() {
        let f = AllocFlags::aligned(32) | AllocFlags::ZEROED;
        assert!(f.is_zeroed());
        assert_eq!(f.alignment(), 32);

        let plain = AllocFlags::aligned(16);
        assert!(!plain.is_zeroed());
        assert_eq!(plain.alignment(), 16);

        assert_eq!(AllocFlags::ZEROED.alignment(), 0);
    }

    #[test]
    fn test_allocate_and_free() {
        let a = system();
        let ptr = a.allocate(64).expect("allocation failed");
        assert_eq!(ptr.as_ptr() as usize % DEFAULT_ALIGN, 0);
        unsafe {
            ptr.as_ptr().write_bytes(0xAB, 64);
            a.deallocate(ptr, 64);
        }
    }

    #[test]
    fn test_allocate_zeroed() {
        let a = system();
        let ptr = a.allocate_zeroed(128).expect("allocation failed");
        let bytes = unsafe { std::slice::from_raw_parts(ptr.as_ptr(), 128) };
        assert!(bytes.iter().all(|&b| b == 0));
        unsafe { a.deallocate(ptr, 128) };
    }

    #[test]
    fn test_reallocate_preserves_contents_and_zeroes_tail() {
        let a = system();
        let ptr = a.allocate(16).expect("allocation failed");
        unsafe { ptr.as_ptr().write_bytes(0x5A, 16) };

        let grown = unsafe {
            a.raw_alloc(Some(ptr), 16, 48, AllocFlags::ZEROED)
                .expect("realloc failed")
        };
        let bytes = unsafe { std::slice::from_raw_parts(grown.as_ptr(), 48) };
        assert!(bytes[..16].iter().all(|&b| b == 0x5A));
        assert!(bytes[16..].iter().all(|&b| b == 0));
        unsafe { a.deallocate(grown, 48) };
    }

    #[test]
    fn test_null_zero_is_noop() {
        let a = system();
        let out = unsafe { a.raw_alloc(None, 0, 0, AllocFlags::empty()) };
        assert!(out.is_none());
    }

    #[test]
    fn test_oversized_alignment_refused() {
        let a = system();
        assert!(a.allocate_aligned(64, DEFAULT_ALIGN * 2).is_none());
        assert!(a.allocate_aligned(64, DEFAULT_ALIGN).is_some_and(|p| {
            unsafe { a.deallocate(p, 64) };
            true
        }));
    }
}
