//! Byte-in, byte-out encoders and decoders
//!
//! Every transform appends to its destination string, preserving whatever
//! was already there; on any error the destination is left untouched.
//! Malformed input reports `InvalidArgument`, allocation failure
//! `OutOfMemory`.

pub mod base64;
pub mod cstring;
pub mod hex;
pub mod json;
pub mod markup;
pub mod url;
pub mod utf8;

pub use base64::{
    decode_base64, decode_base64_with_table, decode_base64url, encode_base64,
    encode_base64_with_table, encode_base64url,
};
pub use cstring::{decode_cstring, encode_cstring};
pub use hex::{decode_hex, encode_hex};
pub use json::{decode_json, encode_json};
pub use markup::{decode_html, decode_xml, encode_html, encode_xml};
pub use url::{decode_url, encode_url};
pub use utf8::{decode_utf8, decode_utf8_to_vec, encode_utf8, REPLACEMENT};
