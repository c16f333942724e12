//! End-to-end scenarios across the crate's components

use std::ops::ControlFlow;

use bytekit::encoding::{decode_url, decode_utf8, encode_url, encode_utf8};
use bytekit::string::INLINE_CAP;
use bytekit::{BytekitError, FlexStr, Pattern, StrMap, StrVariant};

#[test]
fn scenario_short_string_is_inline() {
    let s = FlexStr::new("hi").unwrap();
    assert_eq!(s.variant(), StrVariant::Inline);
    assert_eq!(s.len(), 2);
    assert_eq!(&s.as_bytes()[..2], b"hi");
    // inline capacity covers at least the owned header on a 64-bit build
    assert!(INLINE_CAP >= 24);
}

#[test]
fn scenario_grow_promotes_to_owned() {
    let mut s = FlexStr::new("hi").unwrap();
    assert_eq!(s.variant(), StrVariant::Inline);

    s.grow(100).unwrap();
    assert_eq!(s.variant(), StrVariant::Owned);
    assert_eq!(s.len(), 2);
    assert!(s.capacity() >= 102);
    assert_eq!(s.as_bytes(), b"hi");
}

#[test]
fn scenario_dictionary_each_and_filter() {
    let mut map = StrMap::new();
    for (i, key) in ["a", "b", "c", "d", "e"].into_iter().enumerate() {
        map.insert(FlexStr::new(key).unwrap(), (i + 1) as i64).unwrap();
    }

    let mut sum = 0;
    map.each(|_, v| {
        sum += v;
        ControlFlow::Continue(())
    })
    .unwrap();
    assert_eq!(sum, 15);

    map.filter(|_, v| *v <= 3);
    assert_eq!(map.get("d"), None);
    assert_eq!(map.get("e"), None);
    assert_eq!(map.get("a"), Some(&1));
    assert_eq!(map.len(), 3);
}

#[test]
fn scenario_url_round_trip() {
    let mut encoded = FlexStr::empty();
    encode_url(&mut encoded, b"abcd $-hello_'").unwrap();
    assert_eq!(encoded.as_bytes(), b"abcd%20%24-hello_%27");

    let mut decoded = FlexStr::empty();
    decode_url(&mut decoded, encoded.as_bytes()).unwrap();
    assert_eq!(decoded.as_bytes(), b"abcd $-hello_'");

    let mut bad = FlexStr::empty();
    assert!(matches!(
        decode_url(&mut bad, b"%ZY"),
        Err(BytekitError::InvalidArgument { .. })
    ));
}

#[test]
fn scenario_quantified_group_captures() {
    let pattern = Pattern::compile("(a|b)+").unwrap();
    let m = pattern.find(b"aabbabx").unwrap().unwrap();
    assert_eq!(m.group(0).unwrap(), b"aabbab");
    assert_eq!(m.group(1).unwrap(), b"b");
}

#[test]
fn scenario_utf8_codepoint_round_trip() {
    let codes = [0x24u32, 0x40, 0x1234, 0x10FFFF];

    let mut encoded = FlexStr::empty();
    encode_utf8(&mut encoded, &codes).unwrap();
    assert_eq!(&encoded.as_bytes()[..2], b"\x24\x40");
    assert_eq!(encoded.len(), 1 + 1 + 3 + 4);

    let mut decoded = Vec::new();
    decode_utf8(encoded.as_bytes(), &mut decoded).unwrap();
    assert_eq!(decoded, codes);
}

#[test]
fn pattern_results_key_a_dictionary() {
    // pull word tokens out of a text with the pattern engine, count them
    // in the dictionary, and render a report with the printer
    let text = b"the quick brown fox jumps over the lazy dog the end";
    let word = Pattern::compile("\\w+").unwrap();

    let mut counts: StrMap<u32> = StrMap::new();
    let mut rest: &[u8] = text;
    while let Some(m) = word.find(rest).unwrap() {
        let token = FlexStr::new(m.as_bytes()).unwrap();
        let counted = counts.get_mut(token.as_bytes()).map(|n| *n += 1).is_some();
        if !counted {
            counts.set(token, 1).unwrap();
        }
        rest = &rest[m.end()..];
    }

    assert_eq!(counts.get("the"), Some(&3));
    assert_eq!(counts.get("fox"), Some(&1));
    assert_eq!(counts.len(), 9);

    let mut report = FlexStr::empty();
    bytekit::fmt::format_str(
        &mut report,
        "%Ud distinct words",
        &[bytekit::FmtArg::Unsigned(counts.len() as u64)],
    )
    .unwrap();
    assert_eq!(report.as_bytes(), b"9 distinct words");
}

#[test]
fn slices_share_bytes_with_their_source() {
    let mut base = FlexStr::new("prefix [payload] suffix").unwrap();

    let open = base.find_byte(b'[').unwrap();
    let close = base.find_byte(b']').unwrap();
    let view = base.slice(open + 1, close);
    assert_eq!(view.as_bytes(), b"payload");
    assert!(view.is_slice());
    assert_eq!(view.capacity(), view.len());

    // a duplicate owns its bytes and survives the source changing
    let owned = view.dup().unwrap();
    drop(view);
    base.clear();
    assert_eq!(owned.as_bytes(), b"payload");
}

#[test]
fn streams_feed_encoders_and_back() {
    use bytekit::encoding::{decode_base64, encode_base64};
    use bytekit::{SeekOrigin, Stream, StrStream};

    let mut transport = FlexStr::empty();
    {
        let mut stream = StrStream::new(&mut transport).unwrap();
        stream.write_all(b"msg:").unwrap();
    }

    encode_base64(&mut transport, b"binary\x00payload").unwrap();

    // read the framed message back through a stream
    let mut stream = StrStream::at_start(&mut transport).unwrap();
    let mut header = [0u8; 4];
    stream.read_exact(&mut header).unwrap();
    assert_eq!(&header, b"msg:");

    let pos = stream.tell().unwrap() as usize;
    stream.seek(SeekOrigin::End(0)).unwrap();
    let end = stream.tell().unwrap() as usize;
    let body = transport.slice(pos, end);

    let mut decoded = FlexStr::empty();
    decode_base64(&mut decoded, body.as_bytes()).unwrap();
    assert_eq!(decoded.as_bytes(), b"binary\x00payload");
}

#[test]
fn whole_file_round_trip_through_streams() {
    use bytekit::io::{read_file, write_file};

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("payload.bin");

    let mut original = FlexStr::empty();
    for i in 0..512u32 {
        original.push((i % 251) as u8).unwrap();
    }
    write_file(&path, &original).unwrap();

    let mut readback = FlexStr::empty();
    read_file(&path, &mut readback).unwrap();
    assert_eq!(readback, original);
}
