//! Code-point rope.
//!
//! [`Rope`] is the unencoded text container: a sequence of code points over
//! the persistent segmented vector, with no normalization policy of its own.
//! All offsets are code-point offsets. Cloning is O(1) and clones share
//! storage; edits never show through other clones.

use std::fmt;
use std::ops::Range;

use crate::segvec::SegmentedVector;

/// A persistent rope of code points.
#[derive(Debug, Clone, Default)]
pub struct Rope {
    chars: SegmentedVector<char>,
}

impl Rope {
    /// Create an empty rope.
    pub fn new() -> Self {
        Self {
            chars: SegmentedVector::new(),
        }
    }

    /// Length in code points; O(1).
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Returns `true` if the rope is empty.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Code point at `offset`, or `None` past the end.
    pub fn get(&self, offset: usize) -> Option<char> {
        self.chars.get(offset).copied()
    }

    /// Insert `text` at code-point `offset`. Panics if `offset > len()`.
    pub fn insert(&mut self, offset: usize, text: &str) {
        self.chars.insert_iter(offset, text.chars());
    }

    /// Insert a single code point at `offset`.
    pub fn insert_char(&mut self, offset: usize, ch: char) {
        self.chars.insert(offset, ch);
    }

    /// Erase the code points in `range`.
    pub fn remove(&mut self, range: Range<usize>) {
        self.chars.remove(range);
    }

    /// Replace `range` with `text` (erase, then insert).
    pub fn replace(&mut self, range: Range<usize>, text: &str) {
        self.chars.replace(range, text.chars());
    }

    /// A sub-rope covering `range`; O(log n), shares storage with `self`.
    pub fn slice(&self, range: Range<usize>) -> Rope {
        Rope {
            chars: self.chars.slice(range),
        }
    }

    /// Iterate the code points front to back.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.chars.iter().copied()
    }

    /// Access the underlying segmented vector.
    pub fn as_segments(&self) -> &SegmentedVector<char> {
        &self.chars
    }
}

impl fmt::Display for Rope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in self.chars() {
            f.write_fmt(format_args!("{ch}"))?;
        }
        Ok(())
    }
}

impl From<&str> for Rope {
    fn from(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
        }
    }
}

impl FromIterator<char> for Rope {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        Self {
            chars: iter.into_iter().collect(),
        }
    }
}

impl PartialEq for Rope {
    fn eq(&self, other: &Self) -> bool {
        self.chars == other.chars
    }
}

impl Eq for Rope {}

impl PartialEq<&str> for Rope {
    fn eq(&self, other: &&str) -> bool {
        self.len() == other.chars().count() && self.chars().eq(other.chars())
    }
}
