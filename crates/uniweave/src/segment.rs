//! Segmentation: grapheme, word, and line boundaries.
//!
//! The classification tables and state machines live in
//! `unicode-segmentation` and `unicode-linebreak`; this module adapts them to
//! code-point offsets and exposes the break-function contract that
//! collation-aware search consumes: a function that, given a code-point
//! buffer and an offset, returns the nearest boundary at or before it
//! (returning the offset unchanged when it already is one).

use unicode_linebreak::linebreaks;
use unicode_segmentation::UnicodeSegmentation;

/// A break function snaps an offset to a segment boundary at or before it.
pub type BreakFn = fn(&[char], usize) -> usize;

/// Iterate extended grapheme clusters.
pub fn graphemes(text: &str) -> impl Iterator<Item = &str> {
    UnicodeSegmentation::graphemes(text, true)
}

/// Iterate words (UAX #29 word segmentation, alphanumeric runs only).
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    text.unicode_words()
}

/// Grapheme-cluster boundaries as code-point offsets, including 0 and the
/// total length.
pub fn grapheme_boundaries(text: &str) -> Vec<usize> {
    let mut out = vec![0];
    let mut offset = 0;
    for g in graphemes(text) {
        offset += g.chars().count();
        out.push(offset);
    }
    out
}

/// Word boundaries (UAX #29 word-bound segmentation) as code-point offsets.
pub fn word_boundaries(text: &str) -> Vec<usize> {
    let mut out = vec![0];
    let mut offset = 0;
    for w in text.split_word_bounds() {
        offset += w.chars().count();
        out.push(offset);
    }
    out
}

/// Whether a line break is permitted or required at an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineBreak {
    /// A break is allowed here.
    Allowed,
    /// A break must occur here (after a mandatory break character).
    Mandatory,
}

/// Line-break opportunities (UAX #14) as code-point offsets.
pub fn line_break_opportunities(text: &str) -> Vec<(usize, LineBreak)> {
    let byte_to_char: Vec<usize> = {
        let mut map = vec![0; text.len() + 1];
        for (chars, (bytes, _)) in text.char_indices().enumerate() {
            map[bytes] = chars;
        }
        map[text.len()] = text.chars().count();
        map
    };
    linebreaks(text)
        .map(|(byte, op)| {
            let kind = match op {
                unicode_linebreak::BreakOpportunity::Mandatory => LineBreak::Mandatory,
                unicode_linebreak::BreakOpportunity::Allowed => LineBreak::Allowed,
            };
            (byte_to_char[byte], kind)
        })
        .collect()
}

/// Snap `offset` to the nearest grapheme boundary at or before it.
///
/// Returns `offset` unchanged when it already is a boundary.
pub fn grapheme_break_before(chars: &[char], offset: usize) -> usize {
    snap(chars, offset, grapheme_boundaries)
}

/// Snap `offset` to the nearest word boundary at or before it.
pub fn word_break_before(chars: &[char], offset: usize) -> usize {
    snap(chars, offset, word_boundaries)
}

fn snap(chars: &[char], offset: usize, boundaries: fn(&str) -> Vec<usize>) -> usize {
    let offset = offset.min(chars.len());
    let text: String = chars.iter().collect();
    let bounds = boundaries(&text);
    match bounds.binary_search(&offset) {
        Ok(_) => offset,
        Err(i) => bounds[i - 1],
    }
}
