//! JSON string escaping
//!
//! Encoding escapes the two structural bytes and the control range;
//! decoding expands the standard escape set including `\uXXXX` with
//! surrogate pairs.

use super::hex::hex_to_nibble;
use super::utf8::push_utf8;
use crate::error::{BytekitError, Result};
use crate::string::FlexStr;

/// Append the JSON-escaped form of `src` onto `dst`.
pub fn encode_json(dst: &mut FlexStr<'_>, src: impl AsRef<[u8]>) -> Result<()> {
    let src = src.as_ref();
    let mut out = Vec::with_capacity(src.len());

    for &b in src {
        match b {
            b'"' => out.extend_from_slice(b"\\\""),
            b'\\' => out.extend_from_slice(b"\\\\"),
            0x08 => out.extend_from_slice(b"\\b"),
            0x0C => out.extend_from_slice(b"\\f"),
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\t' => out.extend_from_slice(b"\\t"),
            0x00..=0x1F => {
                out.extend_from_slice(b"\\u00");
                out.push(super::hex::HEX_DIGITS[(b >> 4) as usize]);
                out.push(super::hex::HEX_DIGITS[(b & 0x0F) as usize]);
            }
            _ => out.push(b),
        }
    }
    dst.push_str(&out)
}

fn parse_hex4(src: &[u8], i: usize) -> Result<u32> {
    if i + 4 > src.len() {
        return Err(BytekitError::invalid_argument("truncated \\u escape"));
    }
    let mut code = 0u32;
    for k in 0..4 {
        let nibble = hex_to_nibble(src[i + k])
            .ok_or_else(|| BytekitError::invalid_argument("bad \\u digit"))?;
        code = (code << 4) | nibble as u32;
    }
    Ok(code)
}

/// Expand JSON string escapes from `src` onto `dst`.
pub fn decode_json(dst: &mut FlexStr<'_>, src: impl AsRef<[u8]>) -> Result<()> {
    let src = src.as_ref();
    let mut out = Vec::with_capacity(src.len());
    let mut i = 0;

    while i < src.len() {
        if src[i] != b'\\' {
            out.push(src[i]);
            i += 1;
            continue;
        }
        let esc = *src
            .get(i + 1)
            .ok_or_else(|| BytekitError::invalid_argument("trailing backslash"))?;
        i += 2;

        match esc {
            b'"' => out.push(b'"'),
            b'\\' => out.push(b'\\'),
            b'/' => out.push(b'/'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0C),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'u' => {
                let code = parse_hex4(src, i)?;
                i += 4;
                let code = if (0xD800..=0xDBFF).contains(&code) {
                    // high surrogate needs a following low surrogate
                    if src.get(i) != Some(&b'\\') || src.get(i + 1) != Some(&b'u') {
                        return Err(BytekitError::invalid_argument("lone high surrogate"));
                    }
                    let low = parse_hex4(src, i + 2)?;
                    if !(0xDC00..=0xDFFF).contains(&low) {
                        return Err(BytekitError::invalid_argument("bad low surrogate"));
                    }
                    i += 6;
                    0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00)
                } else if (0xDC00..=0xDFFF).contains(&code) {
                    return Err(BytekitError::invalid_argument("lone low surrogate"));
                } else {
                    code
                };
                push_utf8(&mut out, code);
            }
            _ => return Err(BytekitError::invalid_argument("unknown JSON escape")),
        }
    }
    dst.push_str(&out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(data: &[u8]) -> Vec<u8> {
        let mut out = FlexStr::empty();
        encode_json(&mut out, data).unwrap();
        out.as_bytes().to_vec()
    }

    fn dec(data: &[u8]) -> Result<Vec<u8>> {
        let mut out = FlexStr::empty();
        decode_json(&mut out, data)?;
        Ok(out.as_bytes().to_vec())
    }

    #[test]
    fn test_encode_escapes() {
        assert_eq!(enc(b"say \"hi\""), b"say \\\"hi\\\"");
        assert_eq!(enc(b"a\\b"), b"a\\\\b");
        assert_eq!(enc(b"line\nbreak\t"), b"line\\nbreak\\t");
        assert_eq!(enc(b"\x01"), b"\\u0001");
        assert_eq!(enc(b"\x1F"), b"\\u001F");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(enc(b"no escapes here"), b"no escapes here");
        // UTF-8 passes through as raw bytes
        assert_eq!(enc("héllo".as_bytes()), "héllo".as_bytes());
    }

    #[test]
    fn test_decode_escapes() {
        assert_eq!(dec(b"say \\\"hi\\\"").unwrap(), b"say \"hi\"");
        assert_eq!(dec(b"slash\\/ok").unwrap(), b"slash/ok");
        assert_eq!(dec(b"\\u0041").unwrap(), b"A");
        assert_eq!(dec(b"\\u00e9").unwrap(), "é".as_bytes());
    }

    #[test]
    fn test_decode_surrogate_pair() {
        assert_eq!(dec(b"\\uD83D\\uDE00").unwrap(), "😀".as_bytes());
        assert!(dec(b"\\uD83D").is_err());
        assert!(dec(b"\\uD83Dx").is_err());
        assert!(dec(b"\\uDC00").is_err());
    }

    #[test]
    fn test_round_trip() {
        let data: Vec<u8> = (0..=255).collect();
        let mut encoded = FlexStr::empty();
        encode_json(&mut encoded, &data).unwrap();

        let mut decoded = FlexStr::empty();
        decode_json(&mut decoded, encoded.as_bytes()).unwrap();
        assert_eq!(decoded.as_bytes(), &data[..]);
    }

    #[test]
    fn test_decode_errors() {
        assert!(dec(b"bad\\").is_err());
        assert!(dec(b"\\q").is_err());
        assert!(dec(b"\\u12").is_err());
        assert!(dec(b"\\u12G4").is_err());
    }
}
