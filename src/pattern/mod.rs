//! Pattern engine: a compact regex-like matcher
//!
//! Patterns compile to a flat bytecode program executed by a
//! backtracking matcher. The surface grammar covers single bytes, `.`
//! (one codepoint), escaped metacharacters, the `\d \s \w` classes and
//! their negations, bracket sets with ranges and `^` negation,
//! alternation, numbered capture groups, and the greedy quantifiers
//! `?`, `*`, `+`, `{n}`, `{n,}`, `{n,m}`. Multibyte UTF-8 sequences are
//! matched as atomic units. Matching is unanchored and byte-oriented;
//! word boundaries and non-greedy quantifiers are not supported.
//!
//! # Bytecode
//!
//! Operands are pointer-width little-endian words. `MATCH min max` is
//! followed by an inline value record: a kind byte, then one operand
//! byte for `Byte`/`Class` or a word length plus raw bytes for
//! `Utf8`/`Set`/`NegSet`/`Group`. `BRANCH jump` chains the alternatives
//! of a group: each branch's target is the next branch of the chain (or
//! the end of the group), measured in bytes after the operand.
//!
//! # Examples
//!
//! ```rust
//! use bytekit::Pattern;
//!
//! let pattern = Pattern::compile("(a|b)+").unwrap();
//! let m = pattern.find(b"xxaabbaby").unwrap().unwrap();
//! assert_eq!(m.as_bytes(), b"aabbab");
//! ```

pub mod matcher;
pub mod parser;

use crate::error::Result;
use crate::memory::Allocator;
use crate::string::FlexStr;

/// Deepest nesting the parser accepts.
pub(crate) const PARSER_DEPTH: usize = 64;
/// Most simultaneously active backtrack frames in the matcher.
pub(crate) const MATCHER_DEPTH: usize = 128;

/// Bytecode word width.
pub(crate) const WORD: usize = std::mem::size_of::<usize>();

pub(crate) mod op {
    pub const NOP: u8 = 0;
    pub const MATCH: u8 = 1;
    pub const BRANCH: u8 = 2;
    pub const CAPTURE_START: u8 = 3;
    pub const CAPTURE_END: u8 = 4;
}

pub(crate) mod val {
    pub const BYTE: u8 = 0;
    pub const UTF8: u8 = 1;
    pub const CLASS: u8 = 2;
    pub const SET: u8 = 3;
    pub const NSET: u8 = 4;
    pub const GROUP: u8 = 5;
}

/// A compiled pattern program.
///
/// The bytecode lives in a string value, so an allocator capability can
/// be threaded through [`compile_in`](Self::compile_in).
pub struct Pattern {
    code: FlexStr<'static>,
    captures: usize,
}

impl Pattern {
    /// Compile a pattern from its textual form.
    pub fn compile(pattern: impl AsRef<[u8]>) -> Result<Self> {
        Self::compile_in(pattern.as_ref(), crate::memory::system())
    }

    /// Compile a pattern, drawing the program buffer from `alloc`.
    pub fn compile_in(pattern: &[u8], alloc: &'static dyn Allocator) -> Result<Self> {
        let parsed = parser::parse(pattern)?;
        log::trace!(
            "compiled pattern ({} bytes source, {} bytes code, {} captures)",
            pattern.len(),
            parsed.code.len(),
            parsed.captures
        );
        Ok(Self {
            code: FlexStr::new_in(&parsed.code, alloc)?,
            captures: parsed.captures,
        })
    }

    /// Number of capture slots, the whole-match capture included.
    pub fn capture_count(&self) -> usize {
        self.captures + 1
    }

    /// The compiled bytecode.
    pub(crate) fn code(&self) -> &[u8] {
        self.code.as_bytes()
    }

    /// Search for the leftmost match in `input`.
    ///
    /// The search is unanchored: every start position is tried until one
    /// matches or the input is exhausted.
    pub fn find<'i>(&self, input: &'i [u8]) -> Result<Option<Match<'i>>> {
        matcher::find(self, input)
    }

    /// Whether `input` contains a match.
    pub fn is_match(&self, input: &[u8]) -> Result<bool> {
        Ok(self.find(input)?.is_some())
    }
}

impl std::fmt::Debug for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pattern")
            .field("code_len", &self.code.len())
            .field("captures", &self.captures)
            .finish()
    }
}

/// A successful match: capture 0 is the whole span, further captures
/// are the numbered groups. Every capture is a non-owning slice of the
/// input.
pub struct Match<'i> {
    input: &'i [u8],
    groups: Vec<Option<(usize, usize)>>,
}

impl<'i> Match<'i> {
    pub(crate) fn new(input: &'i [u8], groups: Vec<Option<(usize, usize)>>) -> Self {
        Self { input, groups }
    }

    /// Byte offset where the match starts.
    pub fn start(&self) -> usize {
        self.groups[0].map(|(s, _)| s).unwrap_or(0)
    }

    /// Byte offset one past the end of the match.
    pub fn end(&self) -> usize {
        self.groups[0].map(|(_, e)| e).unwrap_or(0)
    }

    /// The whole matched span.
    pub fn as_bytes(&self) -> &'i [u8] {
        self.group(0).unwrap_or(&[])
    }

    /// Capture group `index`, or `None` when the group did not take part
    /// in the match.
    pub fn group(&self, index: usize) -> Option<&'i [u8]> {
        let (start, end) = (*self.groups.get(index)?)?;
        Some(&self.input[start..end])
    }

    /// Number of capture slots, the whole-match capture included.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

impl std::fmt::Debug for Match<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Match")
            .field("span", &(self.start()..self.end()))
            .field("groups", &self.groups.len())
            .finish()
    }
}
