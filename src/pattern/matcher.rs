//! Pattern back-end: bytecode execution with backtracking
//!
//! The matcher is an explicit backtracking VM. Each quantified `MATCH`
//! greedily consumes its atom up to the maximum, remembering the input
//! position after every repetition; on downstream failure it gives back
//! one repetition at a time (one byte for byte-wide atoms, the stored
//! byte length for UTF-8 atoms, whatever the iteration consumed for
//! group atoms) until the count would drop below the minimum. Capture
//! boundaries recorded inside a rewound repetition or a failed
//! alternative are restored from snapshots.
//!
//! The stack of simultaneously *backtrackable* frames - quantifiers
//! holding spare repetitions and alternation choice points with
//! untried branches - is bounded by `MATCHER_DEPTH`. Exhausted frames
//! pop immediately, so long literal runs cost no depth.
//!
//! The outer driver is unanchored: it retries the program at each start
//! offset until a match is found or the input ends.

use super::parser::utf8_len;
use super::{op, val, Match, Pattern, MATCHER_DEPTH, WORD};
use crate::error::{BytekitError, Result};

type CapSpan = Option<(usize, usize)>;

struct Engine<'p, 'i> {
    code: &'p [u8],
    input: &'i [u8],
    caps: Vec<CapSpan>,
    starts: Vec<Option<usize>>,
    frames: usize,
    landed: usize,
}

#[derive(Debug, Clone, Copy)]
enum AtomRef<'p> {
    Byte(u8),
    Class(u8),
    Utf8(&'p [u8]),
    Set(&'p [u8]),
    NegSet(&'p [u8]),
    /// Start and end of an inline sub-program.
    Group(usize, usize),
}

#[inline]
fn read_word(code: &[u8], at: usize) -> usize {
    usize::from_le_bytes(code[at..at + WORD].try_into().expect("truncated operand"))
}

/// Search for the leftmost match of `pattern` in `input`.
pub(crate) fn find<'i>(pattern: &Pattern, input: &'i [u8]) -> Result<Option<Match<'i>>> {
    let slots = pattern.capture_count();
    let mut engine = Engine {
        code: pattern.code(),
        input,
        caps: vec![None; slots],
        starts: vec![None; slots],
        frames: 0,
        landed: 0,
    };

    let mut start = 0;
    loop {
        engine.caps.fill(None);
        engine.starts.fill(None);
        engine.frames = 0;

        if engine.match_chain(0, engine.code.len(), start)? {
            engine.caps[0] = Some((start, engine.landed));
            return Ok(Some(Match::new(input, engine.caps)));
        }

        if start == input.len() {
            return Ok(None);
        }
        start += 1;
    }
}

impl<'p, 'i> Engine<'p, 'i> {
    fn enter_frame(&mut self) -> Result<()> {
        self.frames += 1;
        if self.frames > MATCHER_DEPTH {
            return Err(BytekitError::out_of_range(
                "backtrack depth",
                self.frames,
                MATCHER_DEPTH,
            ));
        }
        Ok(())
    }

    #[inline]
    fn exit_frame(&mut self) {
        self.frames -= 1;
    }

    /// Try the alternatives of a branch chain in order at `pos`.
    ///
    /// `first_branch` points at the first `BRANCH` of the chain; every
    /// alternative body runs on into the rest of the program, so a
    /// successful call means the whole scope up to `end` matched.
    fn match_chain(&mut self, first_branch: usize, end: usize, pos: usize) -> Result<bool> {
        let mut branch_pc = first_branch;

        loop {
            debug_assert_eq!(self.code[branch_pc], op::BRANCH);
            let body = branch_pc + 1 + WORD;
            let next = body + read_word(self.code, branch_pc + 1);
            let more = next < end && self.code[next] == op::BRANCH;

            if more {
                // a choice point only while an untried branch remains
                self.enter_frame()?;
                let caps = self.caps.clone();
                let starts = self.starts.clone();
                let matched = self.match_at(body, end, pos)?;
                self.exit_frame();
                if matched {
                    return Ok(true);
                }
                self.caps = caps;
                self.starts = starts;
                branch_pc = next;
            } else {
                return self.match_at(body, end, pos);
            }
        }
    }

    /// Execute the program from `pc` to `end` with the input cursor at
    /// `pos`. Reaching `end` is a match; the final cursor lands in
    /// `self.landed`.
    fn match_at(&mut self, pc: usize, end: usize, pos: usize) -> Result<bool> {
        if pc >= end {
            self.landed = pos;
            return Ok(true);
        }

        match self.code[pc] {
            op::NOP => self.match_at(pc + 1, end, pos),

            op::BRANCH => {
                // reached in forward flow after an alternative matched:
                // chase the chain past the remaining alternatives
                let mut p = pc;
                while p < end && self.code[p] == op::BRANCH {
                    p += 1 + WORD + read_word(self.code, p + 1);
                }
                self.match_at(p, end, pos)
            }

            op::CAPTURE_START => {
                let id = read_word(self.code, pc + 1);
                let saved = self.starts[id];
                self.starts[id] = Some(pos);

                let matched = self.match_chain(pc + 1 + WORD, end, pos)?;
                if !matched {
                    self.starts[id] = saved;
                }
                Ok(matched)
            }

            op::CAPTURE_END => {
                let id = read_word(self.code, pc + 1);
                let start = self.starts[id].unwrap_or(pos);
                let saved = self.caps[id];
                self.caps[id] = Some((start, pos));

                let matched = self.match_at(pc + 1 + WORD, end, pos)?;
                if !matched {
                    self.caps[id] = saved;
                }
                Ok(matched)
            }

            op::MATCH => {
                let min = read_word(self.code, pc + 1);
                let max = read_word(self.code, pc + 1 + WORD);
                let (atom, next_pc) = self.read_value(pc + 1 + 2 * WORD);
                self.run_quantified(atom, min, max, next_pc, end, pos)
            }

            other => Err(BytekitError::invalid_argument(format!(
                "corrupt bytecode: opcode {other}"
            ))),
        }
    }

    fn run_quantified(
        &mut self,
        atom: AtomRef<'p>,
        min: usize,
        max: usize,
        next_pc: usize,
        end: usize,
        pos: usize,
    ) -> Result<bool> {
        let is_group = matches!(atom, AtomRef::Group(..));

        // greedily consume up to `max`, remembering the position after
        // each repetition (and, for group atoms, the capture state)
        let mut ends = vec![pos];
        let mut snapshots = if is_group {
            vec![(self.caps.clone(), self.starts.clone())]
        } else {
            Vec::new()
        };

        let mut cur = pos;
        while ends.len() - 1 < max {
            match self.atom_step(atom, cur)? {
                Some(next) if next > cur => {
                    cur = next;
                    ends.push(next);
                    if is_group {
                        snapshots.push((self.caps.clone(), self.starts.clone()));
                    }
                }
                // a repetition that consumes nothing would never stop
                _ => break,
            }
        }

        let count = ends.len() - 1;
        if count < min {
            // one final empty-width repetition (only a group can have
            // one) may still satisfy the minimum; its captures are
            // already in place when it matches
            return match self.atom_step(atom, cur)? {
                Some(next) if next == cur => self.match_at(next_pc, end, cur),
                _ => Ok(false),
            };
        }

        let backtrackable = count > min;
        if backtrackable {
            self.enter_frame()?;
        }

        let mut matched = false;
        let mut k = count;
        loop {
            if is_group {
                let (caps, starts) = snapshots[k].clone();
                self.caps = caps;
                self.starts = starts;
            }
            if self.match_at(next_pc, end, ends[k])? {
                matched = true;
                break;
            }
            if k == min {
                break;
            }
            // rewind one repetition and retry
            k -= 1;
        }

        if backtrackable {
            self.exit_frame();
        }
        Ok(matched)
    }

    fn read_value(&self, at: usize) -> (AtomRef<'p>, usize) {
        let kind = self.code[at];
        match kind {
            val::BYTE => (AtomRef::Byte(self.code[at + 1]), at + 2),
            val::CLASS => (AtomRef::Class(self.code[at + 1]), at + 2),
            _ => {
                let len = read_word(self.code, at + 1);
                let start = at + 1 + WORD;
                let body = &self.code[start..start + len];
                let atom = match kind {
                    val::UTF8 => AtomRef::Utf8(body),
                    val::SET => AtomRef::Set(body),
                    val::NSET => AtomRef::NegSet(body),
                    val::GROUP => AtomRef::Group(start, start + len),
                    other => unreachable!("corrupt value kind {other}"),
                };
                (atom, start + len)
            }
        }
    }

    /// Consume one occurrence of `atom` at `pos`, returning the new
    /// position.
    fn atom_step(&mut self, atom: AtomRef<'p>, pos: usize) -> Result<Option<usize>> {
        let byte = self.input.get(pos).copied();

        Ok(match atom {
            AtomRef::Byte(b) => (byte == Some(b)).then(|| pos + 1),
            AtomRef::Class(c) => match (c, byte) {
                (b'.', Some(lead)) => Some(pos + self.codepoint_stride(pos, lead)),
                (_, Some(b)) if class_match(c, b) => Some(pos + 1),
                _ => None,
            },
            AtomRef::Utf8(seq) => self.input[pos..]
                .starts_with(seq)
                .then(|| pos + seq.len()),
            AtomRef::Set(body) => byte
                .is_some_and(|b| set_match(body, b))
                .then(|| pos + 1),
            AtomRef::NegSet(body) => byte
                .is_some_and(|b| !set_match(body, b))
                .then(|| pos + 1),
            AtomRef::Group(start, end) => {
                if self.match_at(start, end, pos)? {
                    Some(self.landed)
                } else {
                    None
                }
            }
        })
    }

    /// Bytes one `.` consumes at `pos`: a whole codepoint when the lead
    /// byte announces one and its continuation bytes are present, one
    /// byte otherwise.
    fn codepoint_stride(&self, pos: usize, lead: u8) -> usize {
        let len = utf8_len(lead);
        if len > 1
            && pos + len <= self.input.len()
            && self.input[pos + 1..pos + len]
                .iter()
                .all(|&b| b & 0xC0 == 0x80)
        {
            len
        } else {
            1
        }
    }
}

fn class_match(class: u8, b: u8) -> bool {
    match class {
        b'd' => b.is_ascii_digit(),
        b'D' => !b.is_ascii_digit(),
        b's' => matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b'\x0b' | b'\x0c'),
        b'S' => !matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b'\x0b' | b'\x0c'),
        b'w' => b.is_ascii_alphanumeric() || b == b'_',
        b'W' => !(b.is_ascii_alphanumeric() || b == b'_'),
        _ => false,
    }
}

/// Interpret raw bracket-set bytes against one input byte: escapes,
/// `x-y` ranges (literal `-` at either edge), and embedded classes.
fn set_match(body: &[u8], b: u8) -> bool {
    let mut i = 0;
    while i < body.len() {
        if body[i] == b'\\' && i + 1 < body.len() {
            let hit = match body[i + 1] {
                c @ (b'd' | b'D' | b's' | b'S' | b'w' | b'W') => class_match(c, b),
                b't' => b == b'\t',
                b'n' => b == b'\n',
                b'r' => b == b'\r',
                other => b == other,
            };
            if hit {
                return true;
            }
            i += 2;
        } else if i + 2 < body.len() && body[i + 1] == b'-' && body[i + 2] != b'\\' {
            if body[i] <= b && b <= body[i + 2] {
                return true;
            }
            i += 3;
        } else {
            if body[i] == b {
                return true;
            }
            i += 1;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_match<'i>(pattern: &str, input: &'i [u8]) -> Option<Match<'i>> {
        Pattern::compile(pattern).unwrap().find(input).unwrap()
    }

    fn whole(pattern: &str, input: &[u8]) -> Option<Vec<u8>> {
        first_match(pattern, input).map(|m| m.as_bytes().to_vec())
    }

    #[test]
    fn test_literal_match_is_unanchored() {
        let m = first_match("foo", b"xfooy").unwrap();
        assert_eq!(m.as_bytes(), b"foo");
        assert_eq!(m.start(), 1);
        assert_eq!(m.end(), 4);

        assert!(first_match("foo", b"bar").is_none());
    }

    #[test]
    fn test_star_is_greedy() {
        let m = first_match("a*", b"aaab").unwrap();
        assert_eq!(m.as_bytes(), b"aaa");
        assert_eq!(m.start(), 0);
    }

    #[test]
    fn test_star_matches_empty() {
        let m = first_match("a*", b"bbb").unwrap();
        assert_eq!(m.as_bytes(), b"");
        assert_eq!(m.start(), 0);
    }

    #[test]
    fn test_plus_requires_one() {
        assert_eq!(whole("ab+", b"abbbc").unwrap(), b"abbb");
        assert!(first_match("ab+", b"ac").is_none());
    }

    #[test]
    fn test_question_mark() {
        assert_eq!(whole("colou?r", b"color").unwrap(), b"color");
        assert_eq!(whole("colou?r", b"colour").unwrap(), b"colour");
    }

    #[test]
    fn test_brace_quantifiers() {
        assert_eq!(whole("a{3}", b"aaaa").unwrap(), b"aaa");
        assert!(first_match("a{3}", b"aa").is_none());
        assert_eq!(whole("a{2,}", b"aaaa").unwrap(), b"aaaa");
        assert_eq!(whole("a{1,2}", b"aaaa").unwrap(), b"aa");
        assert_eq!(whole("ba{0}c", b"bc").unwrap(), b"bc");
    }

    #[test]
    fn test_backtracking_gives_back_repetitions() {
        // a* must give back the final 'a' for the literal to match
        assert_eq!(whole("a*ab", b"aaab").unwrap(), b"aaab");
        assert_eq!(whole("a*a", b"aaa").unwrap(), b"aaa");
    }

    #[test]
    fn test_dot_matches_codepoint() {
        let m = first_match(".", "é".as_bytes()).unwrap();
        assert_eq!(m.as_bytes().len(), 2);

        let ascii = first_match(".", b"x").unwrap();
        assert_eq!(ascii.as_bytes(), b"x");

        // invalid lead byte falls back to one byte
        let raw = first_match(".", b"\xFF\xFF").unwrap();
        assert_eq!(raw.as_bytes().len(), 1);
    }

    #[test]
    fn test_utf8_literal_atom() {
        let m = first_match("é+", "caféé!".as_bytes()).unwrap();
        assert_eq!(m.as_bytes(), "éé".as_bytes());
    }

    #[test]
    fn test_classes() {
        assert_eq!(whole("\\d+", b"abc123def").unwrap(), b"123");
        assert_eq!(whole("\\w+", b"  word_1  ").unwrap(), b"word_1");
        assert_eq!(whole("\\s+", b"a \t b").unwrap(), b" \t ");
        assert_eq!(whole("\\D+", b"12ab34").unwrap(), b"ab");
        assert_eq!(whole("\\S+", b"  xy  ").unwrap(), b"xy");
        assert_eq!(whole("\\W+", b"ab-+cd").unwrap(), b"-+");
    }

    #[test]
    fn test_sets() {
        assert_eq!(whole("[abc]+", b"zzcabz").unwrap(), b"cab");
        assert_eq!(whole("[a-f]+", b"xxdeadbeefxx").unwrap(), b"deadbeef");
        assert_eq!(whole("[0-9a-f]+", b"zz1f9azz").unwrap(), b"1f9a");
        assert_eq!(whole("[^0-9]+", b"12abc34").unwrap(), b"abc");
        assert_eq!(whole("[-x]+", b"a-x-b").unwrap(), b"-x-");
        assert_eq!(whole("[\\]]+", b"a]]b").unwrap(), b"]]");
        assert_eq!(whole("[\\d]+", b"ab12cd").unwrap(), b"12");
    }

    #[test]
    fn test_alternation() {
        assert_eq!(whole("cat|dog", b"hotdog").unwrap(), b"dog");
        assert_eq!(whole("cat|dog", b"catnip").unwrap(), b"cat");
        // leftmost alternative wins at the same position
        assert_eq!(whole("ab|abc", b"abc").unwrap(), b"ab");
        assert!(first_match("cat|dog", b"bird").is_none());
    }

    #[test]
    fn test_group_captures() {
        let m = first_match("(\\d+)-(\\d+)", b"range 10-25 end").unwrap();
        assert_eq!(m.as_bytes(), b"10-25");
        assert_eq!(m.group(1).unwrap(), b"10");
        assert_eq!(m.group(2).unwrap(), b"25");
        assert_eq!(m.group_count(), 3);
    }

    #[test]
    fn test_quantified_group_keeps_last_iteration() {
        let m = first_match("(a|b)+", b"aabbabx").unwrap();
        assert_eq!(m.as_bytes(), b"aabbab");
        assert_eq!(m.group(1).unwrap(), b"b");
    }

    #[test]
    fn test_alternation_inside_group() {
        let m = first_match("x(one|two)y", b"_xtwoy_").unwrap();
        assert_eq!(m.as_bytes(), b"xtwoy");
        assert_eq!(m.group(1).unwrap(), b"two");
    }

    #[test]
    fn test_nested_groups() {
        let m = first_match("((a+)b)", b"zzaabz").unwrap();
        assert_eq!(m.group(1).unwrap(), b"aab");
        assert_eq!(m.group(2).unwrap(), b"aa");
    }

    #[test]
    fn test_unused_group_is_none() {
        let m = first_match("(a)|(b)", b"b").unwrap();
        assert_eq!(m.group(1), None);
        assert_eq!(m.group(2).unwrap(), b"b");
    }

    #[test]
    fn test_failed_alternative_restores_captures() {
        // the first alternative sets group 1 before failing on 'x'
        let m = first_match("(a)x|ab", b"ab").unwrap();
        assert_eq!(m.as_bytes(), b"ab");
        assert_eq!(m.group(1), None);
    }

    #[test]
    fn test_group_backtracks_through_quantifier() {
        let m = first_match("(ab)+ab", b"ababab").unwrap();
        assert_eq!(m.as_bytes(), b"ababab");
        assert_eq!(m.group(1).unwrap(), b"ab");
    }

    #[test]
    fn test_empty_pattern_matches_empty() {
        let m = first_match("", b"anything").unwrap();
        assert_eq!(m.as_bytes(), b"");
        assert_eq!(m.start(), 0);
    }

    #[test]
    fn test_empty_group_iteration_terminates() {
        // a group that consumes nothing must not loop forever
        let m = first_match("(a?)+b", b"aab").unwrap();
        assert_eq!(m.as_bytes(), b"aab");
    }

    #[test]
    fn test_empty_group_satisfies_minimum() {
        let m = first_match("(a?)+", b"b").unwrap();
        assert_eq!(m.as_bytes(), b"");
        assert_eq!(m.group(1).unwrap(), b"");
    }

    #[test]
    fn test_match_at_end_of_input() {
        let m = first_match("c", b"abc").unwrap();
        assert_eq!(m.start(), 2);
        assert!(first_match("cd", b"abc").is_none());
    }

    #[test]
    fn test_escaped_metachars() {
        assert_eq!(whole("\\.\\*", b"a.*b").unwrap(), b".*");
        assert_eq!(whole("\\(x\\)", b"(x)").unwrap(), b"(x)");
    }

    #[test]
    fn test_literal_tab_newline_escapes() {
        assert_eq!(whole("\\t+", b"a\t\tb").unwrap(), b"\t\t");
        assert_eq!(whole("\\n", b"a\nb").unwrap(), b"\n");
    }

    #[test]
    fn test_is_match() {
        let p = Pattern::compile("\\d\\d").unwrap();
        assert!(p.is_match(b"year 42!").unwrap());
        assert!(!p.is_match(b"year 4!").unwrap());
    }

    #[test]
    fn test_deep_backtracking_is_bounded() {
        // nested unbounded quantifiers over a non-matching tail
        let pattern = Pattern::compile("(a+)+b").unwrap();
        let input = vec![b'a'; 24];
        // either completes (no match) or reports depth exhaustion;
        // it must not run away or overflow the stack
        match pattern.find(&input) {
            Ok(found) => assert!(found.is_none()),
            Err(BytekitError::OutOfRange { .. }) => {}
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }
}
