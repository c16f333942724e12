//! URL percent-encoding
//!
//! The unreserved set is alphanumerics plus `-_~.`; every other byte
//! becomes `%HH` with uppercase digits. Decoding treats a `%` too close
//! to the end as a literal; a malformed two-digit escape anywhere else
//! is an error.

use super::hex::{hex_to_nibble, HEX_DIGITS};
use crate::error::{BytekitError, Result};
use crate::string::FlexStr;

#[inline]
fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'~' | b'.')
}

/// Append the percent-encoded form of `src` onto `dst`.
pub fn encode_url(dst: &mut FlexStr<'_>, src: impl AsRef<[u8]>) -> Result<()> {
    let src = src.as_ref();
    let mut out = Vec::with_capacity(src.len());

    for &b in src {
        if is_unreserved(b) {
            out.push(b);
        } else {
            out.push(b'%');
            out.push(HEX_DIGITS[(b >> 4) as usize]);
            out.push(HEX_DIGITS[(b & 0x0F) as usize]);
        }
    }
    dst.push_str(&out)
}

/// Decode a percent-encoded string from `src` onto `dst`.
pub fn decode_url(dst: &mut FlexStr<'_>, src: impl AsRef<[u8]>) -> Result<()> {
    let src = src.as_ref();
    let mut out = Vec::with_capacity(src.len());
    let mut i = 0;

    while i < src.len() {
        if src[i] == b'%' && i + 3 <= src.len() {
            let hi = hex_to_nibble(src[i + 1]);
            let lo = hex_to_nibble(src[i + 2]);
            match (hi, lo) {
                (Some(hi), Some(lo)) => {
                    out.push((hi << 4) | lo);
                    i += 3;
                }
                _ => {
                    return Err(BytekitError::invalid_argument("bad percent escape"));
                }
            }
        } else if src[i] == b'%' {
            // orphan escape at the end stays literal
            out.extend_from_slice(&src[i..]);
            break;
        } else {
            out.push(src[i]);
            i += 1;
        }
    }
    dst.push_str(&out)
}
