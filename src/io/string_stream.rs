//! Stream over a string value
//!
//! A `StrStream` borrows a resizable [`FlexStr`] and keeps a byte cursor
//! into it. Writing past the end extends the string through its reserve
//! path, so a string-backed stream turns any stream producer into a
//! string concatenator. Seeking past the end reserves capacity without
//! raising the length; the gap is zero-filled if a later write lands
//! beyond it.

use super::stream::{SeekOrigin, Stream};
use crate::error::{BytekitError, Result};
use crate::string::FlexStr;

/// Stream reading from and writing to a borrowed string value.
pub struct StrStream<'s, 'a> {
    value: &'s mut FlexStr<'a>,
    cursor: usize,
}

impl<'s, 'a> StrStream<'s, 'a> {
    /// Borrow `value` as a stream with the cursor at the end of the
    /// string. Slice values cannot back a stream.
    pub fn new(value: &'s mut FlexStr<'a>) -> Result<Self> {
        if value.is_slice() {
            return Err(BytekitError::invalid_argument(
                "a slice cannot back a string stream",
            ));
        }
        let cursor = value.len();
        Ok(Self { value, cursor })
    }

    /// Borrow `value` with the cursor at the start.
    pub fn at_start(value: &'s mut FlexStr<'a>) -> Result<Self> {
        let mut stream = Self::new(value)?;
        stream.cursor = 0;
        Ok(stream)
    }

    /// The backing string.
    pub fn get_ref(&self) -> &FlexStr<'a> {
        self.value
    }
}

impl Stream for StrStream<'_, '_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let available = self.value.len().saturating_sub(self.cursor);
        let n = available.min(buf.len());
        if n > 0 {
            buf[..n].copy_from_slice(&self.value.as_bytes()[self.cursor..self.cursor + n]);
            self.cursor += n;
        }
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let end = self
            .cursor
            .checked_add(buf.len())
            .ok_or_else(|| BytekitError::invalid_argument("write past address space"))?;
        let len = self.value.len();
        if end > len {
            self.value.reserve(end - len)?;
        }

        unsafe {
            let base = self.value.buf_mut_ptr();
            if self.cursor > len {
                // materialize the seek gap as zeroes
                base.add(len).write_bytes(0, self.cursor - len);
            }
            std::ptr::copy_nonoverlapping(buf.as_ptr(), base.add(self.cursor), buf.len());
            if end > len {
                self.value.set_len(end);
            }
        }

        self.cursor = end;
        Ok(buf.len())
    }

    fn tell(&mut self) -> Result<u64> {
        Ok(self.cursor as u64)
    }

    fn seek(&mut self, origin: SeekOrigin) -> Result<()> {
        let len = self.value.len();
        let target: i128 = match origin {
            SeekOrigin::Start(off) => off as i128,
            SeekOrigin::Current(off) => self.cursor as i128 + off as i128,
            SeekOrigin::End(off) => len as i128 + off as i128,
        };
        if target < 0 || target > usize::MAX as i128 {
            return Err(BytekitError::invalid_argument("seek before start of stream"));
        }
        let target = target as usize;

        if target > len {
            self.value.reserve(target - len)?;
        }
        self.cursor = target;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        // The string belongs to the caller.
        Ok(())
    }
}
