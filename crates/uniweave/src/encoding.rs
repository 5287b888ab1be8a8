//! UTF encoding conversions.
//!
//! UTF-16 and UTF-32 conversion with the replacement-character convention:
//! ill-formed units decode to U+FFFD instead of failing, so downstream
//! consumers (collation included) only ever see valid code points.

/// The replacement character substituted for ill-formed input.
pub const REPLACEMENT: char = '\u{FFFD}';

/// Encode as UTF-16 code units.
pub fn to_utf16(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

/// Decode UTF-16 code units; unpaired surrogates become U+FFFD.
pub fn from_utf16_lossy(units: &[u16]) -> String {
    char::decode_utf16(units.iter().copied())
        .map(|r| r.unwrap_or(REPLACEMENT))
        .collect()
}

/// Encode as UTF-32 code units (scalar values).
pub fn to_utf32(text: &str) -> Vec<u32> {
    text.chars().map(|c| c as u32).collect()
}

/// Decode UTF-32 code units; surrogate values and out-of-range units become
/// U+FFFD.
pub fn from_utf32_lossy(units: &[u32]) -> String {
    units
        .iter()
        .map(|&u| char::from_u32(u).unwrap_or(REPLACEMENT))
        .collect()
}
