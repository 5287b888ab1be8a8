//! Canonically-normalized text.
//!
//! [`Text`] keeps its contents in NFC at all times. Incoming data is
//! normalized on ingest, and every splice re-normalizes across the edit
//! boundary, so a combining mark inserted after a base letter composes with
//! it instead of sitting next to it decomposed. Equality is canonical.

use std::fmt;
use std::ops::Range;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::canonical_combining_class;

use crate::rope::Rope;

/// A persistent text value that is always in Normalization Form C.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text {
    rope: Rope,
}

impl Text {
    /// Create an empty text.
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Length in code points of the NFC form.
    pub fn len(&self) -> usize {
        self.rope.len()
    }

    /// Returns `true` if the text is empty.
    pub fn is_empty(&self) -> bool {
        self.rope.is_empty()
    }

    /// Iterate the code points of the NFC form.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.rope.chars()
    }

    /// The underlying rope.
    pub fn as_rope(&self) -> &Rope {
        &self.rope
    }

    /// Insert `text` at code-point `offset`, keeping the whole in NFC.
    pub fn insert(&mut self, offset: usize, text: &str) {
        let len = self.rope.len();
        assert!(offset <= len, "insert offset {offset} out of range (len {len})");
        let normalized: String = text.chars().nfc().collect();
        let inserted = normalized.chars().count();
        self.rope.insert(offset, &normalized);
        self.renormalize_around(offset, offset + inserted);
    }

    /// Erase `range`, re-composing across the new seam.
    pub fn remove(&mut self, range: Range<usize>) {
        let start = range.start;
        self.rope.remove(range);
        self.renormalize_around(start, start);
    }

    /// Replace `range` with `text` (erase, then insert).
    pub fn replace(&mut self, range: Range<usize>, text: &str) {
        let start = range.start;
        self.rope.remove(range);
        self.insert(start, text);
    }

    /// A normalized copy of `range`.
    ///
    /// The slice boundary can split a composed sequence, so the result is
    /// re-normalized rather than borrowed structurally.
    pub fn slice(&self, range: Range<usize>) -> Text {
        let piece = self.rope.slice(range);
        Text {
            rope: piece.chars().nfc().collect(),
        }
    }

    /// Re-run NFC over the smallest window containing `[start, end)` that is
    /// closed under composition: back to the starter before the previous
    /// starter, forward past trailing combining marks and the starters that
    /// could still compose with the seam.
    fn renormalize_around(&mut self, start: usize, end: usize) {
        let len = self.rope.len();
        let mut lo = start.min(len);
        // Step over combining marks to the starter that carries them.
        while lo > 0 && !is_starter(self.rope.get(lo - 1)) {
            lo -= 1;
        }
        // Include that starter, and one starter further back: two adjacent
        // starters can still compose (Hangul L + V).
        if lo > 0 {
            lo -= 1;
        }
        if lo > 0 && is_starter(self.rope.get(lo)) && is_starter(self.rope.get(lo - 1)) {
            lo -= 1;
        }
        let mut hi = end.min(len);
        while hi < len && !is_starter(self.rope.get(hi)) {
            hi += 1;
        }
        // Starters ahead of the seam can compose with it too: Hangul L + V
        // forms a syllable, and LV + T extends it. Two starter steps cover
        // the longest such chain; each brings its own trailing marks along.
        for _ in 0..2 {
            if hi < len && is_starter(self.rope.get(hi)) {
                hi += 1;
                while hi < len && !is_starter(self.rope.get(hi)) {
                    hi += 1;
                }
            }
        }
        if lo >= hi {
            return;
        }
        let window: String = self.rope.slice(lo..hi).chars().nfc().collect();
        self.rope.replace(lo..hi, &window);
    }
}

fn is_starter(ch: Option<char>) -> bool {
    match ch {
        Some(c) => canonical_combining_class(c) == 0,
        None => true,
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.rope, f)
    }
}

impl From<&str> for Text {
    fn from(text: &str) -> Self {
        Self {
            rope: text.chars().nfc().collect(),
        }
    }
}

impl PartialEq<&str> for Text {
    fn eq(&self, other: &&str) -> bool {
        self.chars().eq(other.chars().nfc())
    }
}
