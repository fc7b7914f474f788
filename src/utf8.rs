//! Incremental UTF-8 decoding over raw byte slices.
//!
//! Channel logs and the receive buffer hold bytes straight off the wire, so
//! the renderer cannot assume valid UTF-8. [`decode`] advances exactly one
//! glyph at a time and reports a torn trailing sequence as "need more bytes"
//! instead of guessing.

use std::borrow::Cow;

/// Longest encoded sequence.
pub const UTF_SIZE: usize = 4;

/// U+FFFD, substituted for anything malformed.
pub const REPLACEMENT: u32 = 0xFFFD;

// Index 0 describes continuation bytes, 1..=4 the lead byte of an n-byte sequence.
const LEAD: [u8; UTF_SIZE + 1] = [0x80, 0x00, 0xC0, 0xE0, 0xF0];
const MASK: [u8; UTF_SIZE + 1] = [0xC0, 0x80, 0xE0, 0xF0, 0xF8];
const MIN: [u32; UTF_SIZE + 1] = [0, 0, 0x80, 0x800, 0x10000];
const MAX: [u32; UTF_SIZE + 1] = [0x10FFFF, 0x7F, 0x7FF, 0xFFFF, 0x10FFFF];

/// Classify a byte. Returns its payload bits and its kind: 0 for a
/// continuation byte, 1..=4 for a lead byte, 5 for a byte that can never
/// appear in UTF-8.
fn classify(byte: u8) -> (u32, usize) {
    for kind in 0..=UTF_SIZE {
        if byte & MASK[kind] == LEAD[kind] {
            return (u32::from(byte & !MASK[kind]), kind);
        }
    }
    (0, UTF_SIZE + 1)
}

/// Replace `cp` with [`REPLACEMENT`] when it is overlong for `len` bytes, out
/// of range, or a surrogate.
fn validate(cp: u32, len: usize) -> u32 {
    if cp < MIN[len] || cp > MAX[len] || (0xD800..=0xDFFF).contains(&cp) {
        REPLACEMENT
    } else {
        cp
    }
}

/// Number of bytes needed to encode `cp`.
fn encoded_len(cp: u32) -> usize {
    (1..=UTF_SIZE).find(|&len| cp <= MAX[len]).unwrap_or(UTF_SIZE)
}

/// Decode the code point at the start of `bytes`.
///
/// Returns the code point and the bytes consumed. Malformed input yields
/// [`REPLACEMENT`] with a consumed length of at least one. A slice that ends
/// in the middle of an otherwise valid sequence yields a consumed length of
/// zero so the caller can wait for the rest.
pub fn decode(bytes: &[u8]) -> (u32, usize) {
    let Some(&first) = bytes.first() else {
        return (REPLACEMENT, 0);
    };
    let (mut cp, len) = classify(first);
    if !(1..=UTF_SIZE).contains(&len) {
        return (REPLACEMENT, 1);
    }
    let mut seen = 1;
    while seen < len {
        let Some(&next) = bytes.get(seen) else {
            return (REPLACEMENT, 0);
        };
        let (bits, kind) = classify(next);
        if kind != 0 {
            return (REPLACEMENT, seen);
        }
        cp = (cp << 6) | bits;
        seen += 1;
    }
    (validate(cp, len), len)
}

/// Like [`decode`] but yields a `char`.
pub fn decode_char(bytes: &[u8]) -> (char, usize) {
    let (cp, used) = decode(bytes);
    (char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER), used)
}

/// Encode `cp` into `out`, returning the number of bytes written. Invalid
/// code points are encoded as [`REPLACEMENT`].
pub fn encode(cp: u32, out: &mut [u8; UTF_SIZE]) -> usize {
    let mut cp = if cp > MAX[0] { REPLACEMENT } else { cp };
    let len = encoded_len(cp);
    cp = validate(cp, len);
    let len = encoded_len(cp);
    for i in (1..len).rev() {
        out[i] = LEAD[0] | (cp as u8 & !MASK[0]);
        cp >>= 6;
    }
    out[0] = LEAD[len] | (cp as u8 & !MASK[len]);
    len
}

/// View `bytes` as text, re-encoding each malformed sequence as
/// [`REPLACEMENT`]. A sequence cut off by the end of the slice counts as
/// malformed. Valid input is borrowed as is.
pub fn sanitize(bytes: &[u8]) -> Cow<'_, str> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(text);
    }
    let mut out = Vec::with_capacity(bytes.len() + UTF_SIZE);
    let mut glyph = [0u8; UTF_SIZE];
    let mut pos = 0;
    while pos < bytes.len() {
        let (cp, used) = decode(&bytes[pos..]);
        let len = encode(cp, &mut glyph);
        out.extend_from_slice(&glyph[..len]);
        pos = if used == 0 { bytes.len() } else { pos + used };
    }
    Cow::Owned(String::from_utf8_lossy(&out).into_owned())
}
