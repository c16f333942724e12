//! Tokenization: separator-set tokens and substring splitting
//!
//! Both iterators carry their cursor internally; the source value is
//! borrowed for the iterator's lifetime and never modified.

use super::flex_str::FlexStr;
use super::search;
use crate::error::{BytekitError, Result};
use crate::simd::ByteSet;

/// Iterator over maximal runs of bytes outside a separator set.
pub struct Tokens<'h> {
    rest: &'h [u8],
    set: ByteSet,
}

impl<'h> Iterator for Tokens<'h> {
    type Item = FlexStr<'h>;

    fn next(&mut self) -> Option<Self::Item> {
        let skip = search::span(self.rest, &self.set);
        self.rest = &self.rest[skip..];
        if self.rest.is_empty() {
            return None;
        }

        let end = search::cspan(self.rest, &self.set);
        let token = &self.rest[..end];
        self.rest = &self.rest[end..];
        Some(FlexStr::wrap(token))
    }
}

/// Iterator over tokens separated by a substring.
///
/// A separator sitting immediately after the previous token is skipped
/// before the next search, so back-to-back separators produce empty
/// tokens while a trailing separator produces none.
pub struct Split<'h, 'n> {
    rest: &'h [u8],
    sep: &'n [u8],
}

impl<'h> Iterator for Split<'h, '_> {
    type Item = FlexStr<'h>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.len() >= self.sep.len() && &self.rest[..self.sep.len()] == self.sep {
            self.rest = &self.rest[self.sep.len()..];
        }
        if self.rest.is_empty() {
            return None;
        }

        match search::find(self.rest, self.sep) {
            Some(pos) => {
                let token = &self.rest[..pos];
                self.rest = &self.rest[pos..];
                Some(FlexStr::wrap(token))
            }
            None => {
                let token = self.rest;
                self.rest = &[];
                Some(FlexStr::wrap(token))
            }
        }
    }
}

impl FlexStr<'_> {
    /// Tokens of the string: maximal runs of bytes not in `set`.
    pub fn tokens(&self, set: &ByteSet) -> Tokens<'_> {
        Tokens {
            rest: self.as_bytes(),
            set: set.clone(),
        }
    }

    /// Tokens separated by the substring `sep`.
    ///
    /// Fails with `InvalidArgument` when `sep` is empty.
    pub fn split<'n>(&self, sep: &'n [u8]) -> Result<Split<'_, 'n>> {
        if sep.is_empty() {
            return Err(BytekitError::invalid_argument("empty split separator"));
        }
        Ok(Split {
            rest: self.as_bytes(),
            sep,
        })
    }
}
