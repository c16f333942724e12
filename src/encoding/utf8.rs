//! UTF-8 transforms between codepoint sequences and byte strings
//!
//! Encoding rejects surrogates and codepoints above U+10FFFF. Decoding
//! is lenient the way text pipelines expect: a malformed byte produces
//! the replacement codepoint U+FFFD and the scan resumes at the next
//! byte; an incomplete sequence at the very end of input is dropped.
//! Overlong encodings are rejected unless the `allow-overlong-utf8`
//! feature is enabled.

use crate::error::{BytekitError, Result};
use crate::string::FlexStr;

/// Replacement codepoint written for malformed input.
pub const REPLACEMENT: u32 = 0xFFFD;

/// Append the UTF-8 bytes of `code` onto `out`.
///
/// The caller guarantees `code <= 0x10FFFF`.
pub(crate) fn push_utf8(out: &mut Vec<u8>, code: u32) {
    if code <= 0x7F {
        out.push(code as u8);
    } else if code <= 0x7FF {
        out.push((((code >> 6) & 0x1F) as u8) | 0xC0);
        out.push(((code & 0x3F) as u8) | 0x80);
    } else if code <= 0xFFFF {
        out.push((((code >> 12) & 0x0F) as u8) | 0xE0);
        out.push((((code >> 6) & 0x3F) as u8) | 0x80);
        out.push(((code & 0x3F) as u8) | 0x80);
    } else {
        out.push((((code >> 18) & 0x07) as u8) | 0xF0);
        out.push((((code >> 12) & 0x3F) as u8) | 0x80);
        out.push((((code >> 6) & 0x3F) as u8) | 0x80);
        out.push(((code & 0x3F) as u8) | 0x80);
    }
}

/// Append the UTF-8 encoding of every codepoint in `src` onto `dst`.
///
/// Surrogates and codepoints above U+10FFFF are rejected.
pub fn encode_utf8(dst: &mut FlexStr<'_>, src: &[u32]) -> Result<()> {
    let mut out = Vec::with_capacity(src.len() * 4);
    for &code in src {
        if (0xD800..=0xDFFF).contains(&code) {
            return Err(BytekitError::invalid_argument("surrogate codepoint"));
        }
        if code > 0x10FFFF {
            return Err(BytekitError::invalid_argument("codepoint above U+10FFFF"));
        }
        push_utf8(&mut out, code);
    }
    dst.push_str(&out)
}

// Smallest codepoint a sequence of each length may encode.
const OVERLONG_MIN: [u32; 4] = [0, 0x80, 0x800, 0x10000];

/// Decode UTF-8 bytes from `src`, appending codepoints onto `out`.
///
/// Malformed bytes decode as [`REPLACEMENT`]; see the
/// [module docs](self) for the exact recovery rules.
pub fn decode_utf8(src: impl AsRef<[u8]>, out: &mut Vec<u32>) -> Result<()> {
    let src = src.as_ref();
    let mut i = 0;

    while i < src.len() {
        let lead = src[i];

        if lead & 0x80 == 0 {
            out.push(lead as u32);
            i += 1;
            continue;
        }

        let len = if lead & 0xF8 == 0xF0 {
            4
        } else if lead & 0xF0 == 0xE0 {
            3
        } else if lead & 0xE0 == 0xC0 {
            2
        } else {
            out.push(REPLACEMENT);
            i += 1;
            continue;
        };

        if i + len > src.len() {
            // incomplete trailing sequence is dropped
            break;
        }

        let mut code = (lead as u32) & ((1 << (7 - len)) - 1);
        let mut valid = true;
        for k in 1..len {
            let cont = src[i + k];
            if cont & 0xC0 != 0x80 {
                valid = false;
                // resume at the offending byte
                i += k;
                break;
            }
            code = (code << 6) | (cont as u32 & 0x3F);
        }

        if !valid {
            out.push(REPLACEMENT);
            continue;
        }

        if !cfg!(feature = "allow-overlong-utf8") && code < OVERLONG_MIN[len - 1] {
            out.push(REPLACEMENT);
            i += len;
            continue;
        }

        out.push(code);
        i += len;
    }

    Ok(())
}

/// Decode a string value's bytes, returning the codepoints.
pub fn decode_utf8_to_vec(src: &FlexStr<'_>) -> Result<Vec<u32>> {
    let mut out = Vec::with_capacity(src.len());
    decode_utf8(src.as_bytes(), &mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(codes: &[u32]) -> Vec<u8> {
        let mut out = FlexStr::empty();
        encode_utf8(&mut out, codes).unwrap();
        out.as_bytes().to_vec()
    }

    fn dec(bytes: &[u8]) -> Vec<u32> {
        let mut out = Vec::new();
        decode_utf8(bytes, &mut out).unwrap();
        out
    }

    #[test]
    fn test_encode_width_boundaries() {
        assert_eq!(enc(&[0x24]), b"\x24");
        assert_eq!(enc(&[0x7F]), b"\x7F");
        assert_eq!(enc(&[0x80]), b"\xC2\x80");
        assert_eq!(enc(&[0x7FF]), b"\xDF\xBF");
        assert_eq!(enc(&[0x800]), b"\xE0\xA0\x80");
        assert_eq!(enc(&[0xFFFF]), b"\xEF\xBF\xBF");
        assert_eq!(enc(&[0x10000]), b"\xF0\x90\x80\x80");
        assert_eq!(enc(&[0x10FFFF]), b"\xF4\x8F\xBF\xBF");
    }

    #[test]
    fn test_spec_sequence() {
        let bytes = enc(&[0x24, 0x40, 0x1234, 0x10FFFF]);
        assert_eq!(bytes.len(), 9);
        assert_eq!(&bytes[..2], b"\x24\x40");
        assert_eq!(dec(&bytes), vec![0x24, 0x40, 0x1234, 0x10FFFF]);
    }

    #[test]
    fn test_encode_rejects_bad_codepoints() {
        let mut out = FlexStr::empty();
        assert!(encode_utf8(&mut out, &[0xD800]).is_err());
        assert!(encode_utf8(&mut out, &[0xDFFF]).is_err());
        assert!(encode_utf8(&mut out, &[0x110000]).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_round_trip_sampled_codepoints() {
        let mut codes = Vec::new();
        let mut c = 0u32;
        while c <= 0x10FFFF {
            if !(0xD800..=0xDFFF).contains(&c) {
                codes.push(c);
            }
            c += 257; // dense enough to cross every width boundary
        }

        let bytes = enc(&codes);
        assert_eq!(dec(&bytes), codes);
    }

    #[test]
    fn test_malformed_lead_byte_becomes_replacement() {
        assert_eq!(dec(b"a\xFFb"), vec![b'a' as u32, REPLACEMENT, b'b' as u32]);
        assert_eq!(dec(b"\x80"), vec![REPLACEMENT]); // bare continuation
    }

    #[test]
    fn test_broken_continuation_resyncs() {
        // 0xC3 expects one continuation byte but gets 'x'
        assert_eq!(dec(b"\xC3x"), vec![REPLACEMENT, b'x' as u32]);
    }

    #[test]
    fn test_truncated_tail_is_dropped() {
        assert_eq!(dec(b"ok\xE2\x82"), vec![b'o' as u32, b'k' as u32]);
    }

    #[test]
    fn test_overlong_handling() {
        // 0xC0 0xAF is an overlong encoding of '/'
        let decoded = dec(b"\xC0\xAF");
        #[cfg(not(feature = "allow-overlong-utf8"))]
        assert_eq!(decoded, vec![REPLACEMENT]);
        #[cfg(feature = "allow-overlong-utf8")]
        assert_eq!(decoded, vec![b'/' as u32]);
    }

    #[test]
    fn test_decode_matches_std_for_valid_text() {
        let text = "pæt wæs gōd cyning — 语言 🦀";
        let expected: Vec<u32> = text.chars().map(|c| c as u32).collect();
        assert_eq!(dec(text.as_bytes()), expected);
    }
}
