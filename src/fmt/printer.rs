//! Directive-walking formatted printing
//!
//! [`write_fmt`] walks a `printf`-style format string, copying literal
//! runs and dispatching one directive at a time against an ordered
//! argument list. Alongside the standard conversions it recognizes the
//! crate's extensions:
//!
//! - `%P` writes a string value's bytes verbatim;
//! - `%D` formats a calendar time with a strftime-style format;
//! - `%?` delegates a runtime-typed value to the stream's `serialize`;
//! - `%Ib %Iw %Id %Iq %Im %Ip %IP` print signed integers of explicit
//!   width, `%Ub %Uw %Ud %Uq %Um %Up %Us` their unsigned counterparts.
//!
//! All output goes through a [`Stream`], so a string-backed stream makes
//! the printer concatenate into a string value.

use crate::error::{BytekitError, Result};
use crate::io::{SerialValue, Stream, StrStream, WriterStream};
use crate::string::FlexStr;
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDateTime;

/// One argument consumed by a printing directive.
#[derive(Debug, Clone, Copy)]
pub enum FmtArg<'a> {
    /// String value, for `%P` and `%s`.
    Str(&'a FlexStr<'a>),
    /// Raw bytes, for `%s`.
    Bytes(&'a [u8]),
    /// Signed integer, for `%d`, `%i` and the `%I*` family.
    Signed(i64),
    /// Unsigned integer, for `%u`, `%x`, `%X`, `%o` and the `%U*` family.
    Unsigned(u64),
    /// Floating point value, for `%f`, `%e`, `%g`.
    Float(f64),
    /// Single byte, for `%c`.
    Char(u8),
    /// Calendar time plus its strftime-style format, for `%D`.
    Time {
        /// strftime-style format string
        fmt: &'a str,
        /// the broken-down time to render
        when: &'a NaiveDateTime,
    },
    /// Runtime-typed value for `%?`, handed to the stream's `serialize`.
    Serial(SerialValue<'a>),
}

#[derive(Debug, Default, Clone, Copy)]
struct Spec {
    minus: bool,
    plus: bool,
    zero: bool,
    space: bool,
    hash: bool,
    width: Option<usize>,
    precision: Option<usize>,
    conv: u8,
}

fn parse_spec(bytes: &[u8], i: &mut usize) -> Result<Spec> {
    let mut spec = Spec::default();

    loop {
        match bytes.get(*i) {
            Some(b'-') => spec.minus = true,
            Some(b'+') => spec.plus = true,
            Some(b'0') => spec.zero = true,
            Some(b' ') => spec.space = true,
            Some(b'#') => spec.hash = true,
            _ => break,
        }
        *i += 1;
    }

    if bytes.get(*i) == Some(&b'*') {
        return Err(BytekitError::invalid_argument("'*' width is unsupported"));
    }
    while let Some(d @ b'0'..=b'9') = bytes.get(*i) {
        let w = spec.width.unwrap_or(0);
        spec.width = Some(w * 10 + (d - b'0') as usize);
        *i += 1;
    }

    if bytes.get(*i) == Some(&b'.') {
        *i += 1;
        if bytes.get(*i) == Some(&b'*') {
            return Err(BytekitError::invalid_argument("'*' precision is unsupported"));
        }
        let mut p = 0usize;
        while let Some(d @ b'0'..=b'9') = bytes.get(*i) {
            p = p * 10 + (d - b'0') as usize;
            *i += 1;
        }
        spec.precision = Some(p);
    }

    // length modifiers carry no information once values are widened
    while matches!(bytes.get(*i), Some(b'h' | b'l' | b'L' | b'z' | b'j' | b't')) {
        *i += 1;
    }

    spec.conv = *bytes
        .get(*i)
        .ok_or_else(|| BytekitError::invalid_argument("format ends inside a directive"))?;
    *i += 1;
    Ok(spec)
}

fn pad_into(out: &mut Vec<u8>, body: &[u8], sign: &[u8], spec: &Spec) {
    let total = sign.len() + body.len();
    let width = spec.width.unwrap_or(0);
    let fill = width.saturating_sub(total);

    if spec.minus {
        out.extend_from_slice(sign);
        out.extend_from_slice(body);
        out.extend(std::iter::repeat(b' ').take(fill));
    } else if spec.zero {
        out.extend_from_slice(sign);
        out.extend(std::iter::repeat(b'0').take(fill));
        out.extend_from_slice(body);
    } else {
        out.extend(std::iter::repeat(b' ').take(fill));
        out.extend_from_slice(sign);
        out.extend_from_slice(body);
    }
}

fn render_signed(out: &mut Vec<u8>, value: i64, spec: &Spec) {
    let body = value.unsigned_abs().to_string();
    let sign: &[u8] = if value < 0 {
        b"-"
    } else if spec.plus {
        b"+"
    } else if spec.space {
        b" "
    } else {
        b""
    };
    pad_into(out, body.as_bytes(), sign, spec);
}

fn render_unsigned(out: &mut Vec<u8>, value: u64, spec: &Spec) {
    let body = match spec.conv {
        b'x' => format!("{value:x}"),
        b'X' => format!("{value:X}"),
        b'o' => format!("{value:o}"),
        _ => value.to_string(),
    };
    let prefix: &[u8] = if spec.hash && value != 0 {
        match spec.conv {
            b'x' => b"0x",
            b'X' => b"0X",
            b'o' => b"0",
            _ => b"",
        }
    } else {
        b""
    };
    pad_into(out, body.as_bytes(), prefix, spec);
}

fn render_float(out: &mut Vec<u8>, value: f64, spec: &Spec) {
    let precision = spec.precision.unwrap_or(6);
    let body = match spec.conv {
        b'e' => format!("{value:.precision$e}"),
        b'g' => format!("{value}"),
        _ => format!("{value:.precision$}"),
    };
    let sign: &[u8] = if value.is_sign_negative() {
        b""
    } else if spec.plus {
        b"+"
    } else if spec.space {
        b" "
    } else {
        b""
    };
    pad_into(out, body.as_bytes(), sign, spec);
}

fn render_bytes(out: &mut Vec<u8>, bytes: &[u8], spec: &Spec) {
    let body = match spec.precision {
        Some(p) => &bytes[..p.min(bytes.len())],
        None => bytes,
    };
    pad_into(out, body, b"", spec);
}

fn format_time(when: &NaiveDateTime, fmt: &str) -> Result<String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(fmt).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(BytekitError::invalid_argument("bad calendar format"));
    }
    Ok(when.format_with_items(items.into_iter()).to_string())
}

fn next_arg<'a, 'b>(args: &mut std::slice::Iter<'b, FmtArg<'a>>) -> Result<&'b FmtArg<'a>> {
    args.next()
        .ok_or_else(|| BytekitError::invalid_argument("more directives than arguments"))
}

/// Walk `fmt`, writing literal runs and rendered directives to `stream`.
pub fn write_fmt<S: Stream + ?Sized>(stream: &mut S, fmt: &str, args: &[FmtArg<'_>]) -> Result<()> {
    let bytes = fmt.as_bytes();
    let mut args = args.iter();
    let mut i = 0;
    let mut literal_start = 0;

    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }

        if i > literal_start {
            stream.write_all(&bytes[literal_start..i])?;
        }
        i += 1; // consume '%'

        if bytes.get(i) == Some(&b'%') {
            stream.write_all(b"%")?;
            i += 1;
            literal_start = i;
            continue;
        }

        let spec = parse_spec(bytes, &mut i)?;
        let mut piece: Vec<u8> = Vec::new();

        match spec.conv {
            b'P' => match next_arg(&mut args)? {
                FmtArg::Str(s) => stream.write_all(s.as_bytes())?,
                _ => return Err(BytekitError::invalid_argument("%P needs a string value")),
            },
            b'D' => match next_arg(&mut args)? {
                FmtArg::Time { fmt, when } => {
                    let text = format_time(when, fmt)?;
                    stream.write_all(text.as_bytes())?;
                }
                _ => return Err(BytekitError::invalid_argument("%D needs a calendar time")),
            },
            b'?' => match next_arg(&mut args)? {
                FmtArg::Serial(value) => stream.serialize(*value)?,
                _ => return Err(BytekitError::invalid_argument("%? needs a serial value")),
            },
            b'I' => {
                // explicit-width signed family; the width letter follows
                let sub = *bytes
                    .get(i)
                    .ok_or_else(|| BytekitError::invalid_argument("format ends inside %I"))?;
                i += 1;
                if !matches!(sub, b'b' | b'w' | b'd' | b'q' | b'm' | b'p' | b'P') {
                    return Err(BytekitError::invalid_argument("unknown %I width"));
                }
                match next_arg(&mut args)? {
                    FmtArg::Signed(v) => render_signed(&mut piece, *v, &spec),
                    _ => return Err(BytekitError::invalid_argument("%I needs a signed integer")),
                }
            }
            b'U' => {
                let sub = *bytes
                    .get(i)
                    .ok_or_else(|| BytekitError::invalid_argument("format ends inside %U"))?;
                i += 1;
                if !matches!(sub, b'b' | b'w' | b'd' | b'q' | b'm' | b'p' | b's') {
                    return Err(BytekitError::invalid_argument("unknown %U width"));
                }
                match next_arg(&mut args)? {
                    FmtArg::Unsigned(v) => render_unsigned(&mut piece, *v, &spec),
                    _ => {
                        return Err(BytekitError::invalid_argument("%U needs an unsigned integer"))
                    }
                }
            }
            b'd' | b'i' => match next_arg(&mut args)? {
                FmtArg::Signed(v) => render_signed(&mut piece, *v, &spec),
                _ => return Err(BytekitError::invalid_argument("%d needs a signed integer")),
            },
            b'u' | b'x' | b'X' | b'o' => match next_arg(&mut args)? {
                FmtArg::Unsigned(v) => render_unsigned(&mut piece, *v, &spec),
                _ => return Err(BytekitError::invalid_argument("%u needs an unsigned integer")),
            },
            b'f' | b'F' | b'e' | b'E' | b'g' | b'G' => match next_arg(&mut args)? {
                FmtArg::Float(v) => render_float(&mut piece, *v, &spec),
                _ => return Err(BytekitError::invalid_argument("%f needs a float")),
            },
            b's' => match next_arg(&mut args)? {
                FmtArg::Str(s) => render_bytes(&mut piece, s.as_bytes(), &spec),
                FmtArg::Bytes(b) => render_bytes(&mut piece, b, &spec),
                _ => return Err(BytekitError::invalid_argument("%s needs bytes")),
            },
            b'c' => match next_arg(&mut args)? {
                FmtArg::Char(c) => render_bytes(&mut piece, &[*c], &spec),
                _ => return Err(BytekitError::invalid_argument("%c needs a byte")),
            },
            other => {
                return Err(BytekitError::invalid_argument(format!(
                    "unknown directive %{}",
                    other as char
                )))
            }
        }

        if !piece.is_empty() {
            stream.write_all(&piece)?;
        }
        literal_start = i;
    }

    if literal_start < bytes.len() {
        stream.write_all(&bytes[literal_start..])?;
    }
    Ok(())
}

/// Concatenate formatted output onto a string value.
///
/// On any error the destination's length is rolled back to its pre-call
/// value.
pub fn format_str(dst: &mut FlexStr<'_>, fmt: &str, args: &[FmtArg<'_>]) -> Result<()> {
    let original = dst.len();
    let mut stream = StrStream::new(dst)?;
    match write_fmt(&mut stream, fmt, args) {
        Ok(()) => Ok(()),
        Err(err) => {
            dst.truncate(original);
            Err(err)
        }
    }
}

/// Print formatted output to stdout.
pub fn print(fmt: &str, args: &[FmtArg<'_>]) -> Result<()> {
    let stdout = std::io::stdout();
    let mut stream = WriterStream::new(stdout.lock());
    write_fmt(&mut stream, fmt, args)?;
    stream.flush()
}

/// Print formatted output to stderr.
pub fn eprint(fmt: &str, args: &[FmtArg<'_>]) -> Result<()> {
    let stderr = std::io::stderr();
    let mut stream = WriterStream::new(stderr.lock());
    write_fmt(&mut stream, fmt, args)?;
    stream.flush()
}
