#![warn(missing_docs)]
//! `uniweave` - Unicode-aware text storage over a persistent rope
//!
//! # Overview
//!
//! `uniweave` stores text as immutable, structurally-shared values instead of
//! flat buffers. Every container is built on the same persistent B-tree of
//! segments, so copies are O(1), edits are O(log n), and slicing borrows
//! storage instead of copying it. On top of the storage layer it provides
//! Unicode normalization, UTF encoding conversion, and segmentation; the
//! collation engine lives in the companion `uniweave-collate` crate.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Collation (uniweave-collate)               │  ← locale-aware ordering
//! ├─────────────────────────────────────────────┤
//! │  Segmentation (graphemes / words / lines)   │  ← boundary analysis
//! ├─────────────────────────────────────────────┤
//! │  Normalization & Encoding                   │  ← NFC/NFD/NFKC/NFKD/FCC,
//! ├─────────────────────────────────────────────┤     UTF-16/32 conversion
//! │  Text / Rope (code-point containers)        │  ← editing API
//! ├─────────────────────────────────────────────┤
//! │  SegmentedVector (persistent B-tree)        │  ← storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use uniweave::{Rope, Text};
//!
//! let mut rope = Rope::from("Hello World");
//! rope.replace(6..11, "rope");
//! assert_eq!(rope.to_string(), "Hello rope");
//!
//! // Clones share storage; edits never leak between values.
//! let snapshot = rope.clone();
//! rope.insert(0, ">> ");
//! assert_eq!(snapshot.to_string(), "Hello rope");
//!
//! // Text keeps itself in NFC: a combining acute composes on insert.
//! let mut text = Text::from("Cafe");
//! text.insert(4, "\u{301}");
//! assert_eq!(text.to_string(), "Caf\u{e9}");
//! ```
//!
//! # Module Description
//!
//! - [`segvec`] - the persistent B-tree segmented vector
//! - [`rope`] - the unencoded code-point rope
//! - [`text`] - always-NFC text with canonical equality
//! - [`normalize`] - normalization forms (NFC/NFD/NFKC/NFKD/FCC)
//! - [`encoding`] - UTF-16/UTF-32 conversion, replacement convention
//! - [`segment`] - grapheme/word/line boundaries and break functions

pub mod encoding;
pub mod normalize;
pub mod rope;
pub mod segment;
pub mod segvec;
pub mod text;

pub use rope::Rope;
pub use segment::{BreakFn, LineBreak, grapheme_break_before, word_break_before};
pub use segvec::SegmentedVector;
pub use text::Text;
