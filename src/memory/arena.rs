//! Bump arena implementing the allocator capability
//!
//! Arenas serve allocation-heavy workloads where objects share a lifetime
//! and are released together. Individual frees are no-ops; the
//! distinguished `release_all` call rewinds the whole arena.

use super::allocator::{AllocFlags, Allocator, DEFAULT_ALIGN};
use crate::error::{BytekitError, Result};
use std::alloc::{self, Layout};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Bump arena over one fixed chunk.
///
/// Allocations advance a cursor; resizing copies into a fresh span;
/// `deallocate` does nothing; `release_all` rewinds the cursor to zero.
pub struct ArenaAllocator {
    buffer: NonNull<u8>,
    capacity: usize,
    cursor: AtomicUsize,
}

impl ArenaAllocator {
    /// Create an arena with the given chunk capacity.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(BytekitError::invalid_argument("arena capacity cannot be zero"));
        }

        let layout = Layout::from_size_align(capacity, DEFAULT_ALIGN)
            .map_err(|_| BytekitError::invalid_argument("arena capacity overflows a layout"))?;

        let raw = unsafe { alloc::alloc(layout) };
        let buffer = NonNull::new(raw).ok_or_else(|| BytekitError::out_of_memory(capacity))?;

        Ok(Self {
            buffer,
            capacity,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Total chunk capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes not yet handed out.
    pub fn remaining(&self) -> usize {
        self.capacity - self.cursor.load(Ordering::Relaxed).min(self.capacity)
    }

    fn bump(&self, size: usize, align: usize) -> Option<NonNull<u8>> {
        let align = align.max(1);
        let mut start = 0;
        self.cursor
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |cur| {
                start = (cur + align - 1) & !(align - 1);
                let end = start.checked_add(size)?;
                (end <= self.capacity).then_some(end)
            })
            .ok()?;

        // start is within the chunk by the check above.
        Some(unsafe { NonNull::new_unchecked(self.buffer.as_ptr().add(start)) })
    }
}

impl Allocator for ArenaAllocator {
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
        let align = flags.alignment().max(std::mem::align_of::<usize>());

        match (ptr, new_size) {
            (None, 0) => None,
            (None, _) => {
                let out = self.bump(new_size, align)?;
                if flags.is_zeroed() {
                    unsafe { out.as_ptr().write_bytes(0, new_size) };
                }
                Some(out)
            }
            // Individual frees are no-ops in an arena.
            (Some(_), 0) => None,
            (Some(p), _) => {
                if new_size <= old_size {
                    return Some(p);
                }
                let out = self.bump(new_size, align)?;
                unsafe {
                    std::ptr::copy_nonoverlapping(p.as_ptr(), out.as_ptr(), old_size);
                    if flags.is_zeroed() {
                        out.as_ptr().add(old_size).write_bytes(0, new_size - old_size);
                    }
                }
                Some(out)
            }
        }
    }

    unsafe fn release_all(&self) {
        self.cursor.store(0, Ordering::Relaxed);
    }
}

unsafe impl Send for ArenaAllocator {}
unsafe impl Sync for ArenaAllocator {}

impl Drop for ArenaAllocator {
    fn drop(&mut self) {
        let layout = Layout::from_size_align(self.capacity, DEFAULT_ALIGN).unwrap();
        unsafe { alloc::dealloc(self.buffer.as_ptr(), layout) };
    }
}

impl std::fmt::Debug for ArenaAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArenaAllocator")
            .field("capacity", &self.capacity)
            .field("used", &self.cursor.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_bump_allocations() {
        let arena = ArenaAllocator::new(1024).unwrap();
        let a = arena.allocate(100).expect("first allocation");
        let b = arena.allocate(100).expect("second allocation");
        assert_ne!(a.as_ptr(), b.as_ptr());
        assert!(arena.remaining() < 1024 - 199);
    }

    #[test]
    fn test_arena_exhaustion() {
        let arena = ArenaAllocator::new(64).unwrap();
        assert!(arena.allocate(48).is_some());
        assert!(arena.allocate(48).is_none());
    }

    #[test]
    fn test_arena_free_is_noop() {
        let arena = ArenaAllocator::new(256).unwrap();
        let ptr = arena.allocate(32).unwrap();
        let before = arena.remaining();
        unsafe { arena.deallocate(ptr, 32) };
        assert_eq!(arena.remaining(), before);
    }

    #[test]
    fn test_release_all_rewinds() {
        let arena = ArenaAllocator::new(128).unwrap();
        assert!(arena.allocate(96).is_some());
        assert!(arena.allocate(96).is_none());
        unsafe { arena.release_all() };
        assert!(arena.allocate(96).is_some());
    }

    #[test]
    fn test_arena_realloc_copies() {
        let arena = ArenaAllocator::new(512).unwrap();
        let ptr = arena.allocate(8).unwrap();
        unsafe { ptr.as_ptr().write_bytes(0x7E, 8) };

        let grown = unsafe {
            arena
                .raw_alloc(Some(ptr), 8, 32, AllocFlags::ZEROED)
                .expect("realloc")
        };
        let bytes = unsafe { std::slice::from_raw_parts(grown.as_ptr(), 32) };
        assert!(bytes[..8].iter().all(|&b| b == 0x7E));
        assert!(bytes[8..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_arena_zeroed_allocation() {
        let arena = ArenaAllocator::new(256).unwrap();
        let ptr = arena.allocate_zeroed(64).unwrap();
        let bytes = unsafe { std::slice::from_raw_parts(ptr.as_ptr(), 64) };
        assert!(bytes.iter().all(|&b| b == 0));
    }
}
