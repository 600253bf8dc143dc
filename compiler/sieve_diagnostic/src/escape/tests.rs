use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn test_printable_passthrough() {
    assert_eq!(escape_bytes(b"GET / HTTP/1.1", 400), "GET / HTTP/1.1");
}

#[test]
fn test_control_and_high_bytes() {
    assert_eq!(
        escape_bytes(&[0x00, b'a', 0xff, b'\\', b'\n', b'\t', b'\r'], 400),
        "\\x00a\\xff\\\\\\n\\t\\r"
    );
}

#[test]
fn test_escape_never_split() {
    // Three chars fit; the fourth byte needs four more.
    assert_eq!(escape_bytes(&[b'a', b'b', b'c', 0x01], 6), "abc");
    assert_eq!(escape_bytes(&[b'a', b'b', 0x01], 6), "ab\\x01");
}

#[test]
fn test_dump_of_short_stream() {
    let stream = ByteStream::complete(vec![0x01, 0x02]);
    assert_eq!(dump_at(&stream, 0), "\\x01\\x02");
    assert_eq!(dump_at(&stream, 2), "");
    assert_eq!(dump_at(&stream, 50), "");
}

#[test]
fn test_dump_reads_at_most_window() {
    let stream = ByteStream::complete(vec![b'z'; 1000]);
    assert_eq!(dump_at(&stream, 10).len(), DUMP_WINDOW);
}

proptest! {
    #[test]
    fn escaped_output_is_bounded(
        bytes in proptest::collection::vec(any::<u8>(), 0..512),
        limit in 0usize..600,
    ) {
        let out = escape_bytes(&bytes, limit);
        prop_assert!(out.len() <= limit);
        prop_assert!(out.is_ascii());
    }

    #[test]
    fn dump_never_exceeds_limit(
        bytes in proptest::collection::vec(any::<u8>(), 0..300),
        position in 0usize..400,
    ) {
        let stream = ByteStream::complete(bytes);
        let out = dump_at(&stream, position);
        prop_assert!(out.len() <= ESCAPED_LIMIT);
        if position >= stream.end() {
            prop_assert!(out.is_empty());
        }
    }

    #[test]
    fn printable_input_is_identity(text in "[ -\\[\\]-~]{0,100}") {
        prop_assert_eq!(escape_bytes(text.as_bytes(), ESCAPED_LIMIT), text);
    }
}
