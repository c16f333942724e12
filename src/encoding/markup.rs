//! XML / HTML entity escaping
//!
//! Encoding maps the five markup-significant bytes to named entities.
//! Decoding expands the named set plus numeric character references
//! (`&#NNN;` and `&#xHH;`, written back as UTF-8); an ampersand that
//! does not open a recognized entity stays literal, which makes decoding
//! idempotent on non-entity text.

use super::utf8::push_utf8;
use crate::error::Result;
use crate::string::FlexStr;

/// Append the entity-escaped form of `src` onto `dst`.
pub fn encode_xml(dst: &mut FlexStr<'_>, src: impl AsRef<[u8]>) -> Result<()> {
    let src = src.as_ref();
    let mut out = Vec::with_capacity(src.len());

    for &b in src {
        match b {
            b'&' => out.extend_from_slice(b"&amp;"),
            b'<' => out.extend_from_slice(b"&lt;"),
            b'>' => out.extend_from_slice(b"&gt;"),
            b'"' => out.extend_from_slice(b"&quot;"),
            b'\'' => out.extend_from_slice(b"&#39;"),
            _ => out.push(b),
        }
    }
    dst.push_str(&out)
}

// Longest entity this decoder recognizes, terminator included.
const MAX_ENTITY: usize = 12;

fn named_entity(name: &[u8]) -> Option<u8> {
    Some(match name {
        b"amp" => b'&',
        b"lt" => b'<',
        b"gt" => b'>',
        b"quot" => b'"',
        b"apos" => b'\'',
        _ => return None,
    })
}

fn numeric_entity(body: &[u8]) -> Option<u32> {
    if body.is_empty() {
        return None;
    }
    let (digits, radix) = if body[0] == b'x' || body[0] == b'X' {
        (&body[1..], 16)
    } else {
        (body, 10)
    };
    if digits.is_empty() {
        return None;
    }
    let text = std::str::from_utf8(digits).ok()?;
    let code = u32::from_str_radix(text, radix).ok()?;
    (code <= 0x10FFFF && !(0xD800..=0xDFFF).contains(&code)).then_some(code)
}

/// Expand entities from `src` onto `dst`.
pub fn decode_xml(dst: &mut FlexStr<'_>, src: impl AsRef<[u8]>) -> Result<()> {
    let src = src.as_ref();
    let mut out = Vec::with_capacity(src.len());
    let mut i = 0;

    while i < src.len() {
        if src[i] != b'&' {
            out.push(src[i]);
            i += 1;
            continue;
        }

        let window_end = (i + MAX_ENTITY).min(src.len());
        let semi = src[i + 1..window_end].iter().position(|&b| b == b';');

        let expanded = semi.and_then(|rel| {
            let body = &src[i + 1..i + 1 + rel];
            if let Some(byte) = named_entity(body) {
                out.push(byte);
                Some(rel + 2)
            } else if body.first() == Some(&b'#') {
                numeric_entity(&body[1..]).map(|code| {
                    push_utf8(&mut out, code);
                    rel + 2
                })
            } else {
                None
            }
        });

        match expanded {
            Some(consumed) => i += consumed,
            None => {
                // not an entity; the ampersand stays literal
                out.push(b'&');
                i += 1;
            }
        }
    }
    dst.push_str(&out)
}

/// Append the entity-escaped form of `src` onto `dst` (HTML alias).
pub fn encode_html(dst: &mut FlexStr<'_>, src: impl AsRef<[u8]>) -> Result<()> {
    encode_xml(dst, src)
}

/// Expand entities from `src` onto `dst` (HTML alias).
pub fn decode_html(dst: &mut FlexStr<'_>, src: impl AsRef<[u8]>) -> Result<()> {
    decode_xml(dst, src)
}
