//! FlexStr: the tri-variant byte string at the center of the crate
//!
//! A `FlexStr` is a byte sequence stored one of three ways behind a single
//! observational interface:
//!
//! - **Inline**: short strings live directly in the value (small-string
//!   optimization); no allocation, no allocator reference.
//! - **Owned**: the bytes live in a buffer drawn from an [`Allocator`]
//!   capability; the value carries pointer, length, capacity, and the
//!   allocator. A trailing null byte at `buffer[len]` is maintained for
//!   interoperability; the length is authoritative.
//! - **Slice**: a non-owning view into foreign memory, bound by the `'a`
//!   lifetime parameter. Capacity equals length and every resizing
//!   operation is rejected.
//!
//! The variant is a tagged enum rather than the pointer-null encoding some
//! C libraries use; exhaustive matching replaces bit tricks.
//!
//! # Examples
//!
//! ```rust
//! use bytekit::FlexStr;
//!
//! let s = FlexStr::new("hi").unwrap();
//! assert!(s.is_inline());
//! assert_eq!(s.as_bytes(), b"hi");
//!
//! let view = FlexStr::wrap(b"borrowed bytes");
//! assert!(view.is_slice());
//! ```

use crate::error::{BytekitError, Result};
use crate::memory::{system, Allocator, DEFAULT_ALIGN};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Bound, Deref, RangeBounds};
use std::ptr::NonNull;

#[cfg(not(feature = "sso-extend-16"))]
const SSO_EXTEND: usize = 0;
#[cfg(feature = "sso-extend-16")]
const SSO_EXTEND: usize = 16;

/// Bytes a string can hold inline, at least the size of the owned header.
pub const INLINE_CAP: usize =
    3 * std::mem::size_of::<usize>() + std::mem::size_of::<&'static dyn Allocator>() + SSO_EXTEND;

// Inline buffers keep room for the trailing null.
const INLINE_BUF: usize = INLINE_CAP + 1;

/// Observable storage variant of a [`FlexStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrVariant {
    /// Bytes live inside the value itself.
    Inline,
    /// Bytes live in an allocator-managed heap buffer.
    Owned,
    /// Bytes live in foreign memory the value does not own.
    Slice,
}

enum Repr<'a> {
    Inline {
        len: u8,
        buf: [u8; INLINE_BUF],
    },
    Owned {
        ptr: NonNull<u8>,
        len: usize,
        cap: usize,
        alloc: &'static dyn Allocator,
    },
    Slice {
        data: &'a [u8],
    },
}

/// The tri-variant byte string. See the [module docs](self) for the
/// storage model.
pub struct FlexStr<'a> {
    repr: Repr<'a>,
}

// Owned buffers are uniquely owned and allocators are Sync; the slice
// variant is an ordinary shared borrow.
unsafe impl Send for FlexStr<'_> {}
unsafe impl Sync for FlexStr<'_> {}

#[inline]
fn is_system(alloc: &'static dyn Allocator) -> bool {
    std::ptr::eq(
        alloc as *const dyn Allocator as *const u8,
        system() as *const _ as *const u8,
    )
}

#[inline]
fn round_alloc(size: usize) -> usize {
    (size + (DEFAULT_ALIGN - 1)) & !(DEFAULT_ALIGN - 1)
}

impl FlexStr<'static> {
    /// Empty inline string; never allocates.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            repr: Repr::Inline {
                len: 0,
                buf: [0; INLINE_BUF],
            },
        }
    }

    /// Copy `bytes` into a new string using the default allocator.
    ///
    /// Short inputs are stored inline.
    pub fn new(bytes: impl AsRef<[u8]>) -> Result<Self> {
        Self::new_in(bytes.as_ref(), system())
    }

    /// Copy `bytes` into a new string drawing from `alloc`.
    ///
    /// Inline storage is used only when the input fits and `alloc` is the
    /// default allocator; a named allocator always gets an owned buffer so
    /// the capability is not silently dropped.
    pub fn new_in(bytes: &[u8], alloc: &'static dyn Allocator) -> Result<Self> {
        let mut out = Self::with_capacity_in(bytes.len(), alloc)?;
        unsafe {
            // with_capacity_in guarantees room for bytes.len() + null.
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), out.buf_mut_ptr(), bytes.len());
            out.set_len(bytes.len());
        }
        Ok(out)
    }

    /// Reserve `capacity` bytes without storing anything.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_capacity_in(capacity, system())
    }

    /// Reserve `capacity` bytes from `alloc` without storing anything.
    pub fn with_capacity_in(capacity: usize, alloc: &'static dyn Allocator) -> Result<Self> {
        if capacity <= INLINE_CAP && is_system(alloc) {
            return Ok(Self::empty());
        }

        let alloc_size = round_alloc(capacity + 1);
        let ptr = alloc
            .allocate_aligned(alloc_size, DEFAULT_ALIGN)
            .ok_or_else(|| BytekitError::out_of_memory(alloc_size))?;
        unsafe { ptr.as_ptr().write(0) };

        Ok(Self {
            repr: Repr::Owned {
                ptr,
                len: 0,
                cap: alloc_size - 1,
                alloc,
            },
        })
    }
}

impl<'a> FlexStr<'a> {
    /// Borrow foreign bytes as a non-owning slice value.
    #[inline]
    pub fn wrap(data: &'a [u8]) -> Self {
        Self {
            repr: Repr::Slice { data },
        }
    }

    /// Length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Inline { len, .. } => *len as usize,
            Repr::Owned { len, .. } => *len,
            Repr::Slice { data } => data.len(),
        }
    }

    /// Whether the string holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes the string can hold without resizing.
    ///
    /// Inline values report [`INLINE_CAP`]; slices report their length.
    #[inline]
    pub fn capacity(&self) -> usize {
        match &self.repr {
            Repr::Inline { .. } => INLINE_CAP,
            Repr::Owned { cap, .. } => *cap,
            Repr::Slice { data } => data.len(),
        }
    }

    /// The storage variant currently in use.
    #[inline]
    pub fn variant(&self) -> StrVariant {
        match &self.repr {
            Repr::Inline { .. } => StrVariant::Inline,
            Repr::Owned { .. } => StrVariant::Owned,
            Repr::Slice { .. } => StrVariant::Slice,
        }
    }

    /// Whether the bytes are stored inline.
    #[inline]
    pub fn is_inline(&self) -> bool {
        matches!(self.repr, Repr::Inline { .. })
    }

    /// Whether the bytes live in an allocator-managed buffer.
    #[inline]
    pub fn is_owned_buffer(&self) -> bool {
        matches!(self.repr, Repr::Owned { .. })
    }

    /// Whether the value is a non-owning slice.
    #[inline]
    pub fn is_slice(&self) -> bool {
        matches!(self.repr, Repr::Slice { .. })
    }

    /// Whether the value can be resized (inline or owned).
    #[inline]
    pub fn is_resizable(&self) -> bool {
        !self.is_slice()
    }

    /// The allocator backing an owned buffer, if any.
    #[inline]
    pub fn allocator(&self) -> Option<&'static dyn Allocator> {
        match &self.repr {
            Repr::Owned { alloc, .. } => Some(*alloc),
            _ => None,
        }
    }

    /// The bytes of the string.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.repr {
            Repr::Inline { len, buf } => &buf[..*len as usize],
            Repr::Owned { ptr, len, .. } => unsafe {
                std::slice::from_raw_parts(ptr.as_ptr(), *len)
            },
            Repr::Slice { data } => data,
        }
    }

    /// Mutable access to the bytes; `None` for slice values.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> Option<&mut [u8]> {
        match &mut self.repr {
            Repr::Inline { len, buf } => Some(&mut buf[..*len as usize]),
            Repr::Owned { ptr, len, .. } => {
                Some(unsafe { std::slice::from_raw_parts_mut(ptr.as_ptr(), *len) })
            }
            Repr::Slice { .. } => None,
        }
    }

    /// Byte at `index`, or `None` out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> Option<u8> {
        self.as_bytes().get(index).copied()
    }

    /// Copy this string into a fresh value, keeping its allocator.
    ///
    /// This is also the way to turn a slice into an owned string.
    pub fn dup(&self) -> Result<FlexStr<'static>> {
        let alloc = self.allocator().unwrap_or_else(|| system());
        FlexStr::new_in(self.as_bytes(), alloc)
    }

    /// Sub-view `[from, to)` with both bounds clamped to the length;
    /// `to < from` yields an empty slice at `to`.
    pub fn slice(&self, from: usize, to: usize) -> FlexStr<'_> {
        let len = self.len();
        let to = to.min(len);
        let from = from.min(to);
        FlexStr::wrap(&self.as_bytes()[from..to])
    }

    /// Sub-view over an arbitrary range, clamped to the byte range of the
    /// string; unbounded ends snap to the start and end respectively.
    pub fn range<R: RangeBounds<usize>>(&self, bounds: R) -> FlexStr<'_> {
        let len = self.len();
        let from = match bounds.start_bound() {
            Bound::Included(&i) => i,
            Bound::Excluded(&i) => i.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let to = match bounds.end_bound() {
            Bound::Included(&i) => i.saturating_add(1),
            Bound::Excluded(&i) => i,
            Bound::Unbounded => len,
        };
        self.slice(from, to)
    }

    /// Drop all bytes, keeping the capacity.
    #[inline]
    pub fn clear(&mut self) {
        if self.is_resizable() {
            unsafe { self.set_len(0) };
        } else {
            self.repr = Repr::Slice { data: &[] };
        }
    }

    /// Shorten to `len` bytes; longer requests are ignored.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len() {
            return;
        }
        match &mut self.repr {
            Repr::Slice { data } => *data = &data[..len],
            _ => unsafe { self.set_len(len) },
        }
    }

    /// Ensure room for `additional` more bytes.
    ///
    /// Grows to `(len + additional) * 2 - len` when the current capacity
    /// is insufficient. Slices fail with `InvalidArgument`.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        if additional == 0 {
            return Ok(());
        }
        let len = self.len();
        let needed = len
            .checked_add(additional)
            .ok_or_else(|| BytekitError::invalid_argument("capacity overflow"))?;
        if needed <= self.capacity() && self.is_resizable() {
            return Ok(());
        }
        let target = needed * 2 - len;
        self.grow_to(target)
    }

    /// Enlarge the buffer by at least `count` bytes, promoting inline
    /// storage to an owned buffer on first growth.
    pub fn grow(&mut self, count: usize) -> Result<()> {
        if count == 0 {
            return Err(BytekitError::invalid_argument("grow of zero bytes"));
        }
        let target = self
            .capacity()
            .checked_add(count)
            .ok_or_else(|| BytekitError::invalid_argument("capacity overflow"))?;
        self.grow_to(target)
    }

    /// Shrink an owned buffer to the smallest capacity that still holds
    /// the bytes and the trailing null.
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        match &mut self.repr {
            Repr::Slice { .. } => Err(BytekitError::invalid_argument("cannot resize a slice")),
            Repr::Inline { .. } => Ok(()),
            Repr::Owned { ptr, len, cap, alloc } => {
                let alloc_size = round_alloc(*len + 1);
                if alloc_size >= *cap + 1 {
                    return Ok(());
                }
                let new_ptr = unsafe {
                    alloc
                        .reallocate_aligned(*ptr, *cap + 1, alloc_size, DEFAULT_ALIGN)
                        .ok_or_else(|| BytekitError::out_of_memory(alloc_size))?
                };
                *ptr = new_ptr;
                *cap = alloc_size - 1;
                Ok(())
            }
        }
    }

    fn grow_to(&mut self, target_cap: usize) -> Result<()> {
        let alloc_size = round_alloc(target_cap + 1);

        match &mut self.repr {
            Repr::Slice { .. } => Err(BytekitError::invalid_argument("cannot resize a slice")),
            Repr::Inline { len, buf } => {
                if alloc_size - 1 <= INLINE_CAP {
                    return Ok(());
                }
                let alloc: &'static dyn Allocator = system();
                let ptr = alloc
                    .allocate_aligned(alloc_size, DEFAULT_ALIGN)
                    .ok_or_else(|| BytekitError::out_of_memory(alloc_size))?;
                let length = *len as usize;
                unsafe {
                    std::ptr::copy_nonoverlapping(buf.as_ptr(), ptr.as_ptr(), length);
                    ptr.as_ptr().add(length).write(0);
                }
                self.repr = Repr::Owned {
                    ptr,
                    len: length,
                    cap: alloc_size - 1,
                    alloc,
                };
                Ok(())
            }
            Repr::Owned { ptr, cap, alloc, .. } => {
                if alloc_size - 1 <= *cap {
                    return Ok(());
                }
                let new_ptr = unsafe {
                    alloc
                        .reallocate_aligned(*ptr, *cap + 1, alloc_size, DEFAULT_ALIGN)
                        .ok_or_else(|| BytekitError::out_of_memory(alloc_size))?
                };
                *ptr = new_ptr;
                *cap = alloc_size - 1;
                Ok(())
            }
        }
    }

    /// Raw base pointer of a resizable buffer.
    ///
    /// # Safety
    ///
    /// Must not be called on a slice value. Writes through the pointer
    /// must stay within `capacity() + 1` bytes.
    pub(crate) unsafe fn buf_mut_ptr(&mut self) -> *mut u8 {
        match &mut self.repr {
            Repr::Inline { buf, .. } => buf.as_mut_ptr(),
            Repr::Owned { ptr, .. } => ptr.as_ptr(),
            Repr::Slice { .. } => unreachable!("buf_mut_ptr on a slice"),
        }
    }

    /// Set the length of a resizable value and maintain the trailing
    /// null byte.
    ///
    /// # Safety
    ///
    /// `len` must not exceed the capacity and bytes `..len` must be
    /// initialized. Must not be called on a slice value.
    pub(crate) unsafe fn set_len(&mut self, new_len: usize) {
        debug_assert!(new_len <= self.capacity());
        match &mut self.repr {
            Repr::Inline { len, buf } => {
                *len = new_len as u8;
                buf[new_len] = 0;
            }
            Repr::Owned { ptr, len, .. } => {
                *len = new_len;
                unsafe { ptr.as_ptr().add(new_len).write(0) };
            }
            Repr::Slice { .. } => unreachable!("set_len on a slice"),
        }
    }

    /// Reposition a slice value to `[from, to)` of its current view.
    ///
    /// Only meaningful for slices; other variants are untouched.
    pub(crate) fn reslice(&mut self, from: usize, to: usize) {
        if let Repr::Slice { data } = &mut self.repr {
            let to = to.min(data.len());
            let from = from.min(to);
            *data = &data[from..to];
        }
    }
}

impl Drop for FlexStr<'_> {
    fn drop(&mut self) {
        if let Repr::Owned { ptr, cap, alloc, .. } = &self.repr {
            unsafe { alloc.deallocate(*ptr, *cap + 1) };
        }
    }
}

impl Default for FlexStr<'static> {
    fn default() -> Self {
        Self::empty()
    }
}

impl Deref for FlexStr<'_> {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for FlexStr<'_> {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<'a> From<&'a str> for FlexStr<'a> {
    fn from(s: &'a str) -> Self {
        Self::wrap(s.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for FlexStr<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::wrap(bytes)
    }
}

impl PartialEq for FlexStr<'_> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        crate::string::search::bytes_equal(self.as_bytes(), other.as_bytes())
    }
}

impl Eq for FlexStr<'_> {}

impl PartialOrd for FlexStr<'_> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FlexStr<'_> {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        crate::string::search::bytes_compare(self.as_bytes(), other.as_bytes())
    }
}

impl Hash for FlexStr<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(crate::string::hash::hash_bytes(self.as_bytes()));
    }
}

impl PartialEq<str> for FlexStr<'_> {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for FlexStr<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<[u8]> for FlexStr<'_> {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl PartialEq<&[u8]> for FlexStr<'_> {
    fn eq(&self, other: &&[u8]) -> bool {
        self.as_bytes() == *other
    }
}

impl fmt::Debug for FlexStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(self.as_bytes()) {
            Ok(s) => write!(f, "FlexStr({:?})", s),
            Err(_) => write!(f, "FlexStr({:?})", self.as_bytes()),
        }
    }
}

impl fmt::Display for FlexStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::ArenaAllocator;

    #[test]
    fn test_new_short_is_inline() {
        let s = FlexStr::new("hi").unwrap();
        assert_eq!(s.variant(), StrVariant::Inline);
        assert_eq!(s.len(), 2);
        assert_eq!(s.as_bytes(), b"hi");
        assert_eq!(s.capacity(), INLINE_CAP);
    }

    #[test]
    fn test_inline_keeps_trailing_null() {
        let s = FlexStr::new("hi").unwrap();
        match &s.repr {
            Repr::Inline { buf, .. } => {
                assert_eq!(&buf[..2], b"hi");
                assert_eq!(buf[2], 0);
            }
            _ => panic!("expected inline"),
        }
    }

    #[test]
    fn test_new_long_is_owned() {
        let text = "x".repeat(INLINE_CAP + 1);
        let s = FlexStr::new(&text).unwrap();
        assert_eq!(s.variant(), StrVariant::Owned);
        assert_eq!(s.len(), INLINE_CAP + 1);
        assert!(s.capacity() >= s.len());
        assert_eq!(s.as_bytes(), text.as_bytes());
    }

    #[test]
    fn test_owned_trailing_null() {
        let text = "y".repeat(100);
        let s = FlexStr::new(&text).unwrap();
        match &s.repr {
            Repr::Owned { ptr, len, .. } => {
                let nul = unsafe { *ptr.as_ptr().add(*len) };
                assert_eq!(nul, 0);
            }
            _ => panic!("expected owned"),
        }
    }

    #[test]
    fn test_named_allocator_forces_owned() {
        static ARENA: std::sync::OnceLock<ArenaAllocator> = std::sync::OnceLock::new();
        let arena = ARENA.get_or_init(|| ArenaAllocator::new(4096).unwrap());

        let s = FlexStr::new_in(b"hi", arena).unwrap();
        assert_eq!(s.variant(), StrVariant::Owned);
        assert!(s.allocator().is_some());
        std::mem::forget(s); // arena frees are no-ops anyway
    }

    #[test]
    fn test_wrap_is_slice() {
        let backing = b"Hello, world!".to_vec();
        let s = FlexStr::wrap(&backing);
        assert_eq!(s.variant(), StrVariant::Slice);
        assert_eq!(s.len(), 13);
        assert_eq!(s.capacity(), s.len());
        assert!(s.allocator().is_none());
    }

    #[test]
    fn test_slice_rejects_resize() {
        let mut s = FlexStr::wrap(b"fixed");
        assert!(matches!(
            s.reserve(1),
            Err(BytekitError::InvalidArgument { .. })
        ));
        assert!(matches!(s.grow(1), Err(BytekitError::InvalidArgument { .. })));
        assert!(matches!(
            s.shrink_to_fit(),
            Err(BytekitError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_grow_promotes_inline_to_owned() {
        let mut s = FlexStr::new("hi").unwrap();
        assert!(s.is_inline());

        s.grow(100).unwrap();
        assert_eq!(s.variant(), StrVariant::Owned);
        assert_eq!(s.len(), 2);
        assert!(s.capacity() >= 102);
        assert_eq!(s.as_bytes(), b"hi");
        match &s.repr {
            Repr::Owned { ptr, .. } => assert_eq!(unsafe { *ptr.as_ptr().add(2) }, 0),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_reserve_growth_formula() {
        let mut s = FlexStr::with_capacity(0).unwrap();
        s.reserve(100).unwrap();
        // new_cap = (0 + 100) * 2 - 0, rounded up to the alignment
        assert!(s.capacity() >= 200);
    }

    #[test]
    fn test_capacity_is_alignment_rounded() {
        let s = FlexStr::with_capacity(100).unwrap();
        assert_eq!((s.capacity() + 1) % DEFAULT_ALIGN, 0);
    }

    #[test]
    fn test_shrink_to_fit() {
        let mut s = FlexStr::with_capacity(1024).unwrap();
        crate::string::mutate::append(&mut s, b"abc").unwrap();
        s.shrink_to_fit().unwrap();
        assert!(s.capacity() < 1024);
        assert_eq!(s.as_bytes(), b"abc");
    }

    #[test]
    fn test_dup_copies_bytes_not_buffer() {
        let text = "z".repeat(80);
        let s = FlexStr::new(&text).unwrap();
        let t = s.dup().unwrap();
        assert_eq!(s, t);
        assert_ne!(s.as_bytes().as_ptr(), t.as_bytes().as_ptr());
    }

    #[test]
    fn test_dup_turns_slice_into_owned() {
        let backing = "o".repeat(64);
        let view = FlexStr::wrap(backing.as_bytes());
        let owned = view.dup().unwrap();
        assert!(owned.is_owned_buffer());
        assert_eq!(owned.as_bytes(), backing.as_bytes());
    }

    #[test]
    fn test_slice_clamps_bounds() {
        let s = FlexStr::new("Hello, world!").unwrap();
        assert_eq!(s.slice(7, 12).as_bytes(), b"world");
        assert_eq!(s.slice(7, 999).as_bytes(), b"world!");
        assert_eq!(s.slice(999, 999).len(), 0);
        // to < from takes an empty slice at to
        assert_eq!(s.slice(9, 4).len(), 0);
    }

    #[test]
    fn test_range_bounds() {
        let s = FlexStr::new("Hello, world!").unwrap();
        assert_eq!(s.range(..).as_bytes(), b"Hello, world!");
        assert_eq!(s.range(7..).as_bytes(), b"world!");
        assert_eq!(s.range(..5).as_bytes(), b"Hello");
        assert_eq!(s.range(7..12).as_bytes(), b"world");
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut s = FlexStr::with_capacity(256).unwrap();
        crate::string::mutate::append(&mut s, b"data").unwrap();
        let cap = s.capacity();
        s.clear();
        assert_eq!(s.len(), 0);
        assert_eq!(s.capacity(), cap);
    }

    #[test]
    fn test_truncate() {
        let mut s = FlexStr::new("abcdef").unwrap();
        s.truncate(3);
        assert_eq!(s.as_bytes(), b"abc");
        s.truncate(100);
        assert_eq!(s.as_bytes(), b"abc");

        let mut v = FlexStr::wrap(b"abcdef");
        v.truncate(2);
        assert_eq!(v.as_bytes(), b"ab");
    }

    #[test]
    fn test_equality_and_ordering() {
        let a = FlexStr::new("abc").unwrap();
        let b = FlexStr::new("abd").unwrap();
        let c = FlexStr::wrap(b"abc");

        assert_eq!(a, c);
        assert!(a < b);
        assert!(b > c);
        assert_eq!(a, "abc");
        assert_eq!(a, b"abc".as_slice());
    }

    #[test]
    fn test_prefix_orders_before_longer() {
        let short = FlexStr::new("ab").unwrap();
        let long = FlexStr::new("abc").unwrap();
        assert!(short < long);
    }

    #[test]
    fn test_equal_implies_equal_hash() {
        use std::collections::hash_map::DefaultHasher;

        let a = FlexStr::new("same-bytes").unwrap();
        let b = FlexStr::wrap(b"same-bytes");
        assert_eq!(a, b);

        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn test_display_and_debug() {
        let s = FlexStr::new("hello").unwrap();
        assert_eq!(format!("{}", s), "hello");
        assert!(format!("{:?}", s).contains("hello"));

        let raw = FlexStr::wrap(&[0xFF, 0xFE]);
        assert!(format!("{:?}", raw).contains("FlexStr"));
    }

    #[test]
    fn test_deref_gives_slice_methods() {
        let s = FlexStr::new("abc").unwrap();
        assert_eq!(s.first(), Some(&b'a'));
        assert_eq!(s.iter().count(), 3);
    }

    #[test]
    fn test_inline_cap_covers_owned_header() {
        assert!(INLINE_CAP >= 3 * std::mem::size_of::<usize>());
        #[cfg(not(feature = "sso-extend-16"))]
        assert_eq!(
            INLINE_CAP,
            3 * std::mem::size_of::<usize>() + std::mem::size_of::<&'static dyn Allocator>()
        );
    }
}
