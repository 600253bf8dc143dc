//! Printable rendering of raw bytes.
//!
//! Diagnostics quote bytes straight from untrusted traffic, so rendering is
//! bounded twice: at most [`DUMP_WINDOW`] bytes are read, and the escaped
//! text never exceeds [`ESCAPED_LIMIT`] characters. An escape sequence is
//! never split: output stops before a sequence that would cross the limit.

use sieve_ir::{BoundedView, ByteStream};

/// Bytes quoted from the failure position.
pub const DUMP_WINDOW: usize = 100;

/// Maximum length of escaped output (every byte may expand to `\xNN`).
pub const ESCAPED_LIMIT: usize = 4 * DUMP_WINDOW;

/// Escape bytes into printable ASCII, truncating at `limit` characters.
///
/// Printable ASCII is kept as is, except the backslash which is doubled.
/// `\n`, `\r`, `\t` use their usual escapes; every other byte becomes `\xNN`.
pub fn escape_bytes(bytes: &[u8], limit: usize) -> String {
    let mut out = String::with_capacity(limit.min(bytes.len() * 4));
    for &b in bytes {
        let needed = match b {
            b'\\' | b'\n' | b'\r' | b'\t' => 2,
            0x20..=0x7e => 1,
            _ => 4,
        };
        if out.len() + needed > limit {
            break;
        }
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(char::from(b)),
            _ => {
                const HEX: &[u8; 16] = b"0123456789abcdef";
                out.push_str("\\x");
                out.push(char::from(HEX[usize::from(b >> 4)]));
                out.push(char::from(HEX[usize::from(b & 0xf)]));
            }
        }
    }
    out
}

/// Escaped rendering of a view, bounded by [`ESCAPED_LIMIT`].
#[inline]
pub fn render_escaped(view: &BoundedView<'_>) -> String {
    escape_bytes(view.as_bytes(), ESCAPED_LIMIT)
}

/// Escaped dump of the [`DUMP_WINDOW`] bytes starting at `position`.
///
/// Truncated to whatever is available; a position past the end yields an
/// empty dump.
#[inline]
pub fn dump_at(stream: &ByteStream, position: usize) -> String {
    render_escaped(&stream.view(position, DUMP_WINDOW))
}

#[cfg(test)]
mod tests;
