#![warn(missing_docs)]
//! `uniweave-collate` - locale-aware string ordering for `uniweave`
//!
//! # Overview
//!
//! An implementation of multi-level collation in the style of the Unicode
//! Collation Algorithm: strings are mapped to sequences of 4-level weight
//! elements through a longest-match trie (so contractions like the Spanish
//! traditional `ch` work), then compared level by level or flattened into
//! binary sort keys. Tables can be tailored with reset/relation rules,
//! reordered by script group, serialized, and used for collation-aware
//! substring search over [`uniweave::Rope`] text.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Search (find / find_all over ropes)        │  ← boundary-gated matching
//! ├─────────────────────────────────────────────┤
//! │  Keys (collate / sort keys)                 │  ← level extraction
//! ├─────────────────────────────────────────────┤
//! │  Table (elements, options, serialization)   │  ← weight assignment
//! │  Tailor (reset/relation rules, reorder)     │
//! ├─────────────────────────────────────────────┤
//! │  Trie (longest-match contraction lookup)    │  ← arena trie
//! │  Element (weights, implicit derivation)     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use uniweave_collate::{CollateParams, CollationTable, Strength, VariableWeighting};
//!
//! let table = CollationTable::default_table();
//!
//! // Tertiary by default: case and accents matter.
//! let params = CollateParams::default();
//! assert!(table.collate("apple", "Banana", &params).is_lt());
//!
//! // At primary strength with shifted punctuation, "de-luge" == "deluge".
//! let loose = CollateParams {
//!     strength: Strength::Primary,
//!     weighting: VariableWeighting::Shifted,
//!     ..CollateParams::default()
//! };
//! assert!(table.collate("de-luge", "DELUGE", &loose).is_eq());
//!
//! // Sort keys compare exactly like collate() does.
//! let mut words = vec!["cherry", "apple", "banana"];
//! words.sort_by_cached_key(|w| table.sort_key(w, &params));
//! assert_eq!(words, ["apple", "banana", "cherry"]);
//! ```
//!
//! # Module Description
//!
//! - [`element`] - weight tuples, strengths, implicit weights
//! - [`trie`] - the arena trie mapping code-point runs to elements
//! - [`table`] - collation tables, options, serialization
//! - [`keys`] - comparison and sort-key extraction
//! - [`tailor`] - reset/relation tailoring, reordering, suppressions
//! - [`search`] - collation-aware substring search

pub mod element;
pub mod keys;
pub mod search;
pub mod table;
pub mod tailor;
pub mod trie;

pub use element::{CollationElement, Strength};
pub use keys::{SortKey, collate, collation_sort_key};
pub use search::{SearchMatch, find, find_all, find_graphemes};
pub use table::{
    CaseFirst, CollateParams, CollationTable, L2Order, ReorderGroup, TableError,
    VariableWeighting,
};
pub use tailor::{RelationStrength, TailoringBuilder, TailoringError};
