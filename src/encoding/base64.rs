//! Base64 encoding and decoding
//!
//! Standard and URL-safe alphabets are bundled; the `_with_table`
//! entry points accept any 64-byte alphabet. Encoding pads with `=`.

use crate::error::{BytekitError, Result};
use crate::string::FlexStr;

const STANDARD: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const URL_SAFE: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

fn check_table(table: &[u8]) -> Result<&[u8; 64]> {
    table
        .try_into()
        .map_err(|_| BytekitError::invalid_argument("alphabet must be 64 bytes"))
}

fn lookup(table: &[u8; 64], c: u8) -> Result<u8> {
    table
        .iter()
        .position(|&t| t == c)
        .map(|p| p as u8)
        .ok_or_else(|| BytekitError::invalid_argument("byte outside the alphabet"))
}

/// Append the base64 form of `src` onto `dst` using `table` as the
/// alphabet.
pub fn encode_base64_with_table(
    dst: &mut FlexStr<'_>,
    src: impl AsRef<[u8]>,
    table: &[u8],
) -> Result<()> {
    let table = check_table(table)?;
    let src = src.as_ref();
    let mut out = Vec::with_capacity((src.len() / 3 + 1) * 4);

    let mut chunks = src.chunks_exact(3);
    for group in &mut chunks {
        out.push(table[(group[0] >> 2) as usize]);
        out.push(table[(((group[0] & 0x03) << 4) | (group[1] >> 4)) as usize]);
        out.push(table[(((group[1] & 0x0F) << 2) | (group[2] >> 6)) as usize]);
        out.push(table[(group[2] & 0x3F) as usize]);
    }

    match chunks.remainder() {
        [a] => {
            out.push(table[(a >> 2) as usize]);
            out.push(table[((a & 0x03) << 4) as usize]);
            out.push(b'=');
            out.push(b'=');
        }
        [a, b] => {
            out.push(table[(a >> 2) as usize]);
            out.push(table[(((a & 0x03) << 4) | (b >> 4)) as usize]);
            out.push(table[((b & 0x0F) << 2) as usize]);
            out.push(b'=');
        }
        _ => {}
    }

    dst.push_str(&out)
}

/// Decode base64 from `src` onto `dst` using `table` as the alphabet.
pub fn decode_base64_with_table(
    dst: &mut FlexStr<'_>,
    src: impl AsRef<[u8]>,
    table: &[u8],
) -> Result<()> {
    let table = check_table(table)?;
    let mut src = src.as_ref();

    // padding characters
    if src.last() == Some(&b'=') {
        src = &src[..src.len() - 1];
    }
    if src.last() == Some(&b'=') {
        src = &src[..src.len() - 1];
    }

    let mut out = Vec::with_capacity((src.len() / 4 + 1) * 3);
    let mut chunks = src.chunks_exact(4);
    for group in &mut chunks {
        let v0 = lookup(table, group[0])?;
        let v1 = lookup(table, group[1])?;
        let v2 = lookup(table, group[2])?;
        let v3 = lookup(table, group[3])?;
        out.push((v0 << 2) | (v1 >> 4));
        out.push((v1 << 4) | (v2 >> 2));
        out.push((v2 << 6) | v3);
    }

    match chunks.remainder() {
        [a, b, c] => {
            let v0 = lookup(table, *a)?;
            let v1 = lookup(table, *b)?;
            let v2 = lookup(table, *c)?;
            out.push((v0 << 2) | (v1 >> 4));
            out.push((v1 << 4) | (v2 >> 2));
        }
        [a, b] => {
            let v0 = lookup(table, *a)?;
            let v1 = lookup(table, *b)?;
            out.push((v0 << 2) | (v1 >> 4));
        }
        _ => {}
    }

    dst.push_str(&out)
}

/// Append the base64 form of `src` onto `dst` (standard alphabet).
pub fn encode_base64(dst: &mut FlexStr<'_>, src: impl AsRef<[u8]>) -> Result<()> {
    encode_base64_with_table(dst, src, STANDARD)
}

/// Decode standard-alphabet base64 from `src` onto `dst`.
pub fn decode_base64(dst: &mut FlexStr<'_>, src: impl AsRef<[u8]>) -> Result<()> {
    decode_base64_with_table(dst, src, STANDARD)
}

/// Append the URL-safe base64 form of `src` onto `dst`.
pub fn encode_base64url(dst: &mut FlexStr<'_>, src: impl AsRef<[u8]>) -> Result<()> {
    encode_base64_with_table(dst, src, URL_SAFE)
}

/// Decode URL-safe base64 from `src` onto `dst`.
pub fn decode_base64url(dst: &mut FlexStr<'_>, src: impl AsRef<[u8]>) -> Result<()> {
    decode_base64_with_table(dst, src, URL_SAFE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::{STANDARD as B64_STD, URL_SAFE as B64_URL};
    use base64::Engine;

    fn enc(data: &[u8]) -> Vec<u8> {
        let mut out = FlexStr::empty();
        encode_base64(&mut out, data).unwrap();
        out.as_bytes().to_vec()
    }

    #[test]
    fn test_rfc_vectors() {
        assert_eq!(enc(b""), b"");
        assert_eq!(enc(b"f"), b"Zg==");
        assert_eq!(enc(b"fo"), b"Zm8=");
        assert_eq!(enc(b"foo"), b"Zm9v");
        assert_eq!(enc(b"foob"), b"Zm9vYg==");
        assert_eq!(enc(b"fooba"), b"Zm9vYmE=");
        assert_eq!(enc(b"foobar"), b"Zm9vYmFy");
    }

    #[test]
    fn test_agrees_with_reference_implementation() {
        let samples: [&[u8]; 4] = [b"", b"any carnal pleasure.", b"\xFF\x00\xFE", b"bytekit"];
        for data in samples {
            assert_eq!(enc(data), B64_STD.encode(data).into_bytes(), "{data:?}");

            let mut url = FlexStr::empty();
            encode_base64url(&mut url, data).unwrap();
            assert_eq!(url.as_bytes(), B64_URL.encode(data).into_bytes(), "{data:?}");
        }
    }

    #[test]
    fn test_round_trip() {
        let data: Vec<u8> = (0..=255).collect();
        for take in [0, 1, 2, 3, 100, 256] {
            let mut encoded = FlexStr::empty();
            encode_base64(&mut encoded, &data[..take]).unwrap();

            let mut decoded = FlexStr::empty();
            decode_base64(&mut decoded, encoded.as_bytes()).unwrap();
            assert_eq!(decoded.as_bytes(), &data[..take], "len {take}");
        }
    }

    #[test]
    fn test_url_safe_round_trip() {
        let data = b"\xFB\xEF\xFF subjects?";
        let mut encoded = FlexStr::empty();
        encode_base64url(&mut encoded, data).unwrap();
        assert!(!encoded.as_bytes().contains(&b'+'));
        assert!(!encoded.as_bytes().contains(&b'/'));

        let mut decoded = FlexStr::empty();
        decode_base64url(&mut decoded, encoded.as_bytes()).unwrap();
        assert_eq!(decoded.as_bytes(), data);
    }

    #[test]
    fn test_custom_table() {
        // rot13-ish shuffle of the standard alphabet
        let mut table = *b"NOPQRSTUVWXYZABCDEFGHIJKLMnopqrstuvwxyzabcdefghijklm0123456789+/";
        table.reverse();

        let mut encoded = FlexStr::empty();
        encode_base64_with_table(&mut encoded, b"secret", &table).unwrap();

        let mut decoded = FlexStr::empty();
        decode_base64_with_table(&mut decoded, encoded.as_bytes(), &table).unwrap();
        assert_eq!(decoded.as_bytes(), b"secret");

        // standard decode of the custom encoding differs
        let mut wrong = FlexStr::empty();
        if decode_base64(&mut wrong, encoded.as_bytes()).is_ok() {
            assert_ne!(wrong.as_bytes(), b"secret");
        }
    }

    #[test]
    fn test_bad_table_length() {
        let mut out = FlexStr::empty();
        assert!(encode_base64_with_table(&mut out, b"x", b"short").is_err());
        assert!(decode_base64_with_table(&mut out, b"eA==", b"short").is_err());
    }

    #[test]
    fn test_decode_rejects_foreign_bytes() {
        let mut out = FlexStr::new("kept").unwrap();
        let err = decode_base64(&mut out, b"Zm9v!a==").unwrap_err();
        assert!(matches!(err, BytekitError::InvalidArgument { .. }));
        assert_eq!(out.as_bytes(), b"kept");
    }
}
