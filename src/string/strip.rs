//! Strip and indentation operations
//!
//! Stripping removes bytes of a class from the ends of a value; slices
//! are repositioned instead of rewritten, so the backing buffer is never
//! touched. Indentation operations rewrite whole lines and therefore
//! require a resizable value.

use super::flex_str::FlexStr;
use super::search;
use crate::error::{BytekitError, Result};
use crate::simd::ByteSet;

/// Bytes stripped when no explicit class is given.
pub const DEFAULT_STRIP_CLASS: &[u8] = b" \t\r\n\x0b\x0c";

fn class_or_default(class: Option<&ByteSet>) -> ByteSet {
    match class {
        Some(set) => set.clone(),
        None => ByteSet::new(DEFAULT_STRIP_CLASS),
    }
}

impl FlexStr<'_> {
    /// Remove leading bytes found in `class` (whitespace when `None`).
    pub fn strip_leading(&mut self, class: Option<&ByteSet>) -> Result<()> {
        let set = class_or_default(class);
        let count = search::span(self.as_bytes(), &set);
        if count == 0 {
            return Ok(());
        }
        let len = self.len();
        if self.is_slice() {
            self.reslice(count, len);
            Ok(())
        } else {
            self.cut(count, len)
        }
    }

    /// Remove trailing bytes found in `class` (whitespace when `None`).
    pub fn strip_trailing(&mut self, class: Option<&ByteSet>) -> Result<()> {
        let set = class_or_default(class);
        let count = search::rspan(self.as_bytes(), &set);
        if count > 0 {
            self.truncate(self.len() - count);
        }
        Ok(())
    }

    /// Remove leading and trailing bytes found in `class`.
    pub fn strip(&mut self, class: Option<&ByteSet>) -> Result<()> {
        self.strip_trailing(class)?;
        self.strip_leading(class)
    }

    /// Remove up to `columns` columns of leading indentation from every
    /// line.
    ///
    /// A space is one column and a tab is `tab_width` columns; a tab is
    /// only removed when it fits entirely in the remaining budget. Bytes
    /// `\r`, `\v`, `\f` inside the leading run are collapsed silently
    /// without counting.
    pub fn dedent(&mut self, columns: usize, tab_width: usize) -> Result<()> {
        if self.is_slice() {
            return Err(BytekitError::invalid_argument("cannot rewrite a slice"));
        }
        if columns == 0 {
            return Ok(());
        }

        let src = self.as_bytes();
        let mut out: Vec<u8> = Vec::with_capacity(src.len());
        let mut i = 0;

        while i < src.len() {
            let line_end = match search::find_byte(&src[i..], b'\n') {
                Some(rel) => i + rel + 1,
                None => src.len(),
            };

            let mut remaining = columns;
            let mut j = i;
            while j < line_end {
                match src[j] {
                    b' ' if remaining >= 1 => remaining -= 1,
                    b'\t' if remaining >= tab_width && tab_width > 0 => remaining -= tab_width,
                    b'\r' | b'\x0b' | b'\x0c' => {}
                    _ => break,
                }
                j += 1;
            }

            out.extend_from_slice(&src[j..line_end]);
            i = line_end;
        }

        self.copy_from(&out[..])
    }

    /// Prepend `columns` spaces to every non-empty line.
    pub fn indent(&mut self, columns: usize) -> Result<()> {
        if self.is_slice() {
            return Err(BytekitError::invalid_argument("cannot rewrite a slice"));
        }
        if columns == 0 || self.is_empty() {
            return Ok(());
        }

        let src = self.as_bytes();
        let mut out: Vec<u8> = Vec::with_capacity(src.len() + columns);
        let pad = vec![b' '; columns];
        let mut i = 0;

        while i < src.len() {
            let line_end = match search::find_byte(&src[i..], b'\n') {
                Some(rel) => i + rel + 1,
                None => src.len(),
            };
            if src[i] != b'\n' {
                out.extend_from_slice(&pad);
            }
            out.extend_from_slice(&src[i..line_end]);
            i = line_end;
        }

        self.copy_from(&out[..])
    }

    /// Minimum indentation, in columns, across lines that contain at
    /// least one non-whitespace byte. Returns zero when no such line
    /// exists.
    pub fn indent_depth(&self, tab_width: usize) -> usize {
        let src = self.as_bytes();
        let mut min: Option<usize> = None;
        let mut i = 0;

        while i < src.len() {
            let line_end = match search::find_byte(&src[i..], b'\n') {
                Some(rel) => i + rel + 1,
                None => src.len(),
            };

            let mut cols = 0;
            let mut j = i;
            let mut has_content = false;
            while j < line_end {
                match src[j] {
                    b' ' => cols += 1,
                    b'\t' => cols += tab_width,
                    b'\r' | b'\x0b' | b'\x0c' => {}
                    b'\n' => break,
                    _ => {
                        has_content = true;
                        break;
                    }
                }
                j += 1;
            }

            if has_content {
                min = Some(min.map_or(cols, |m: usize| m.min(cols)));
            }
            i = line_end;
        }

        min.unwrap_or(0)
    }
}
