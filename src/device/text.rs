//! Textual payloads of the file-like surface.
//!
//! Writes carry an ASCII decimal mask, reads return `"<mask>\n"`.

use core::fmt::Write;

use heapless::String;

/// Longest read payload: `"255\n"`.
pub const MAX_TEXT_LEN: usize = 4;

/// Parse a write payload the way the kernel's `simple_strtoul(.., 10)` does:
/// leading ASCII digits only, no sign, no whitespace skipping, overflow
/// wraps.  Anything else yields 0.  Only the low 8 bits are kept.
pub fn parse_mask(payload: &[u8]) -> u8 {
    let value = payload
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0u64, |acc, b| {
            acc.wrapping_mul(10).wrapping_add(u64::from(b - b'0'))
        });
    value as u8
}

/// Render `mask` as decimal digits plus a newline.
pub fn format_mask(mask: u8) -> String<MAX_TEXT_LEN> {
    let mut out = String::new();
    // "255\n" is the longest possible rendering.
    let _ = writeln!(out, "{mask}");
    out
}
