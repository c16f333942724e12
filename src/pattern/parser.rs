//! Pattern front-end: source text to bytecode
//!
//! A recursive-descent parser over the pattern bytes. Sequences compile
//! to runs of `MATCH` instructions; alternation compiles each group (and
//! the top level) into a branch chain where every alternative is
//! prefixed by a `BRANCH` whose target is the next alternative's branch,
//! or the end of the group. Groups quantified by a postfix operator are
//! wrapped whole into a `Group` value record so the quantifier machinery
//! treats them as one atom; unquantified groups are spliced inline.

use super::{op, val, PARSER_DEPTH, WORD};
use crate::error::{BytekitError, Result};

/// Raw parse output before the program buffer is placed with an
/// allocator.
#[derive(Debug)]
pub(crate) struct Parsed {
    pub(crate) code: Vec<u8>,
    pub(crate) captures: usize,
}

struct Parser<'p> {
    src: &'p [u8],
    pos: usize,
    captures: usize,
    depth: usize,
}

#[inline]
fn push_word(code: &mut Vec<u8>, value: usize) {
    code.extend_from_slice(&value.to_le_bytes());
}

enum Atom<'p> {
    Byte(u8),
    Class(u8),
    Utf8(&'p [u8]),
    Set { negated: bool, body: &'p [u8] },
    Group(Vec<u8>),
}

/// Compile `src` into a pattern program.
pub(crate) fn parse(src: &[u8]) -> Result<Parsed> {
    let mut parser = Parser {
        src,
        pos: 0,
        captures: 0,
        depth: 0,
    };

    let code = parser.alternatives()?;
    if parser.pos < src.len() {
        // the only way to stop early at depth zero is a stray ')'
        return Err(BytekitError::invalid_argument("unbalanced ')'"));
    }

    Ok(Parsed {
        code,
        captures: parser.captures,
    })
}

impl<'p> Parser<'p> {
    #[inline]
    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    #[inline]
    fn bump(&mut self) -> Option<u8> {
        let b = self.peek();
        if b.is_some() {
            self.pos += 1;
        }
        b
    }

    /// A chain of `|`-separated sequences, each prefixed by its branch.
    fn alternatives(&mut self) -> Result<Vec<u8>> {
        let mut alts = vec![self.sequence()?];
        while self.peek() == Some(b'|') {
            self.pos += 1;
            alts.push(self.sequence()?);
        }

        let mut code = Vec::new();
        for alt in &alts {
            code.push(op::BRANCH);
            push_word(&mut code, alt.len());
            code.extend_from_slice(alt);
        }
        Ok(code)
    }

    /// A run of quantified atoms, up to `|`, `)`, or the end.
    fn sequence(&mut self) -> Result<Vec<u8>> {
        let mut code = Vec::new();

        while let Some(b) = self.peek() {
            if b == b'|' || b == b')' {
                break;
            }

            let atom = self.atom()?;
            let (min, max) = self.quantifier()?;

            match atom {
                Atom::Group(body) if (min, max) == (1, 1) => {
                    // plain group: splice the capture inline
                    code.extend_from_slice(&body);
                }
                atom => {
                    code.push(op::MATCH);
                    push_word(&mut code, min);
                    push_word(&mut code, max);
                    emit_value(&mut code, &atom);
                }
            }
        }

        Ok(code)
    }

    fn atom(&mut self) -> Result<Atom<'p>> {
        let b = self
            .bump()
            .ok_or_else(|| BytekitError::invalid_argument("pattern ended unexpectedly"))?;

        match b {
            b'*' | b'+' | b'?' | b'{' => {
                Err(BytekitError::invalid_argument("quantifier with nothing to repeat"))
            }
            b']' => Err(BytekitError::invalid_argument("unbalanced ']'")),
            b'(' => self.group(),
            b'[' => self.set(),
            b'\\' => self.escape(),
            b'.' => Ok(Atom::Class(b'.')),
            _ if b & 0x80 != 0 => {
                // multibyte UTF-8 sequence matched as one unit
                let start = self.pos - 1;
                let len = utf8_len(b);
                while self.pos < start + len && self.pos < self.src.len() {
                    if self.src[self.pos] & 0xC0 != 0x80 {
                        break;
                    }
                    self.pos += 1;
                }
                Ok(Atom::Utf8(&self.src[start..self.pos]))
            }
            _ => Ok(Atom::Byte(b)),
        }
    }

    fn group(&mut self) -> Result<Atom<'p>> {
        self.depth += 1;
        if self.depth > PARSER_DEPTH {
            return Err(BytekitError::out_of_range(
                "pattern nesting",
                self.depth,
                PARSER_DEPTH,
            ));
        }

        self.captures += 1;
        let id = self.captures;

        let chain = self.alternatives()?;
        if self.bump() != Some(b')') {
            return Err(BytekitError::invalid_argument("unbalanced '('"));
        }
        self.depth -= 1;

        let mut body = Vec::with_capacity(chain.len() + 2 * (1 + WORD));
        body.push(op::CAPTURE_START);
        push_word(&mut body, id);
        body.extend_from_slice(&chain);
        body.push(op::CAPTURE_END);
        push_word(&mut body, id);
        Ok(Atom::Group(body))
    }

    fn set(&mut self) -> Result<Atom<'p>> {
        let negated = self.peek() == Some(b'^');
        if negated {
            self.pos += 1;
        }

        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == b'\\' {
                self.pos += 2;
            } else if b == b']' {
                let body = &self.src[start..self.pos];
                self.pos += 1;
                return Ok(Atom::Set { negated, body });
            } else {
                self.pos += 1;
            }
        }
        Err(BytekitError::invalid_argument("unbalanced '['"))
    }

    fn escape(&mut self) -> Result<Atom<'p>> {
        let b = self
            .bump()
            .ok_or_else(|| BytekitError::invalid_argument("trailing backslash"))?;

        match b {
            b't' => Ok(Atom::Byte(b'\t')),
            b'n' => Ok(Atom::Byte(b'\n')),
            b'r' => Ok(Atom::Byte(b'\r')),
            b'b' | b'B' => Err(BytekitError::not_implemented("word-boundary escapes")),
            b'd' | b'D' | b's' | b'S' | b'w' | b'W' => Ok(Atom::Class(b)),
            _ if is_metachar(b) => Ok(Atom::Byte(b)),
            _ => Err(BytekitError::invalid_argument("unknown escape")),
        }
    }

    /// Postfix quantifier; `(1, 1)` when none follows.
    fn quantifier(&mut self) -> Result<(usize, usize)> {
        let bounds = match self.peek() {
            Some(b'?') => {
                self.pos += 1;
                (0, 1)
            }
            Some(b'*') => {
                self.pos += 1;
                (0, usize::MAX)
            }
            Some(b'+') => {
                self.pos += 1;
                (1, usize::MAX)
            }
            Some(b'{') => {
                self.pos += 1;
                self.braces()?
            }
            _ => return Ok((1, 1)),
        };

        if self.peek() == Some(b'?') {
            return Err(BytekitError::not_implemented("non-greedy quantifiers"));
        }
        Ok(bounds)
    }

    /// The `{n}`, `{n,}` and `{n,m}` forms; the brace is already
    /// consumed.
    fn braces(&mut self) -> Result<(usize, usize)> {
        let min = self.number()?;
        match self.bump() {
            Some(b'}') => Ok((min, min)),
            Some(b',') => {
                if self.peek() == Some(b'}') {
                    self.pos += 1;
                    return Ok((min, usize::MAX));
                }
                let max = self.number()?;
                if self.bump() != Some(b'}') {
                    return Err(BytekitError::invalid_argument("unterminated quantifier"));
                }
                if max < min {
                    return Err(BytekitError::invalid_argument("quantifier bounds reversed"));
                }
                Ok((min, max))
            }
            _ => Err(BytekitError::invalid_argument("unterminated quantifier")),
        }
    }

    fn number(&mut self) -> Result<usize> {
        let start = self.pos;
        let mut value = 0usize;
        while let Some(d @ b'0'..=b'9') = self.peek() {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add((d - b'0') as usize))
                .ok_or_else(|| BytekitError::invalid_argument("quantifier bound overflow"))?;
            self.pos += 1;
        }
        if self.pos == start {
            return Err(BytekitError::invalid_argument("quantifier needs a number"));
        }
        Ok(value)
    }
}

fn emit_value(code: &mut Vec<u8>, atom: &Atom<'_>) {
    match atom {
        Atom::Byte(b) => {
            code.push(val::BYTE);
            code.push(*b);
        }
        Atom::Class(c) => {
            code.push(val::CLASS);
            code.push(*c);
        }
        Atom::Utf8(bytes) => {
            code.push(val::UTF8);
            push_word(code, bytes.len());
            code.extend_from_slice(bytes);
        }
        Atom::Set { negated, body } => {
            code.push(if *negated { val::NSET } else { val::SET });
            push_word(code, body.len());
            code.extend_from_slice(body);
        }
        Atom::Group(body) => {
            code.push(val::GROUP);
            push_word(code, body.len());
            code.extend_from_slice(body);
        }
    }
}

#[inline]
fn is_metachar(b: u8) -> bool {
    matches!(
        b,
        b'{' | b'}'
            | b'['
            | b']'
            | b'('
            | b')'
            | b'^'
            | b'$'
            | b'.'
            | b'|'
            | b'*'
            | b'+'
            | b'?'
            | b'\\'
    )
}

#[inline]
pub(crate) fn utf8_len(lead: u8) -> usize {
    if lead & 0xF8 == 0xF0 {
        4
    } else if lead & 0xF0 == 0xE0 {
        3
    } else if lead & 0xE0 == 0xC0 {
        2
    } else {
        1
    }
}
