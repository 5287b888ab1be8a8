//! Collation-element trie.
//!
//! Maps a greedy-longest run of code points to the most specific known
//! collation-element range, which is how contractions (multi-code-point
//! units like digraphs) get their own weights.
//!
//! The trie is an arena: one flat `Vec` of nodes, with each node's children
//! stored as one contiguous, code-point-sorted run addressed by an index
//! range. Lookups binary-search the run; the flat layout keeps sibling
//! probes on the same cache lines instead of chasing per-node allocations.

use std::collections::BTreeMap;
use std::collections::VecDeque;

use smallvec::SmallVec;

/// Maximum code points in one trie key.
pub const MAX_KEY_LEN: usize = 32;

/// A trie key: a short code-point sequence, compared as a tuple.
pub type Key = SmallVec<[u32; 4]>;

#[derive(Debug, Clone, Copy)]
struct TrieNode {
    cp: u32,
    /// Children occupy `nodes[first_child..last_child]`, sorted by `cp`.
    first_child: u32,
    last_child: u32,
    /// Collation-element range when this node terminates a key.
    elements: Option<(u32, u32)>,
}

/// The result of a (partial) trie walk.
///
/// `consumed` counts every code point descended through, including steps
/// past the last terminal; `match_len`/`elements` remember the deepest
/// terminal seen. The node handle lets [`Trie::extend`] continue the walk
/// one code point at a time without restarting from the root.
#[derive(Debug, Clone, Copy)]
pub struct TrieMatch {
    node: u32,
    /// Code points walked so far.
    pub consumed: usize,
    /// Length of the deepest terminal on the walked path (0 if none yet).
    pub match_len: usize,
    /// Element range of that terminal.
    pub elements: Option<(u32, u32)>,
}

/// An immutable longest-prefix-match trie over code-point sequences.
#[derive(Debug, Clone, Default)]
pub struct Trie {
    nodes: Vec<TrieNode>,
    root_len: u32,
}

#[derive(Default)]
struct TempNode {
    children: BTreeMap<u32, TempNode>,
    elements: Option<(u32, u32)>,
}

impl Trie {
    /// Build a trie from `(key, element-range)` pairs.
    ///
    /// Later duplicates of a key overwrite earlier ones. Panics on an empty
    /// or oversized key; key validity is the caller's contract.
    pub fn build<I>(keys: I) -> Trie
    where
        I: IntoIterator<Item = (Key, (u32, u32))>,
    {
        let mut root = TempNode::default();
        for (key, range) in keys {
            assert!(
                !key.is_empty() && key.len() <= MAX_KEY_LEN,
                "trie key length {} out of range 1..={MAX_KEY_LEN}",
                key.len()
            );
            let mut node = &mut root;
            for &cp in &key {
                node = node.children.entry(cp).or_default();
            }
            node.elements = Some(range);
        }

        // Breadth-first flatten: every node's children land as one
        // contiguous run, already sorted because BTreeMap iterates in order.
        let mut nodes = Vec::new();
        let mut pending: VecDeque<(usize, &TempNode)> = VecDeque::new();
        for (&cp, child) in &root.children {
            nodes.push(TrieNode {
                cp,
                first_child: 0,
                last_child: 0,
                elements: child.elements,
            });
            pending.push_back((nodes.len() - 1, child));
        }
        let root_len = nodes.len() as u32;
        while let Some((idx, temp)) = pending.pop_front() {
            let first = nodes.len() as u32;
            for (&cp, child) in &temp.children {
                nodes.push(TrieNode {
                    cp,
                    first_child: 0,
                    last_child: 0,
                    elements: child.elements,
                });
                pending.push_back((nodes.len() - 1, child));
            }
            nodes[idx].first_child = first;
            nodes[idx].last_child = nodes.len() as u32;
        }

        Trie { nodes, root_len }
    }

    /// Start a walk with the first code point of a unit.
    ///
    /// `None` means the trie has no entry starting with `cp` and the caller
    /// falls back to implicit-weight derivation.
    pub fn match_first(&self, cp: u32) -> Option<TrieMatch> {
        let roots = &self.nodes[..self.root_len as usize];
        let i = roots.binary_search_by_key(&cp, |n| n.cp).ok()?;
        let node = &self.nodes[i];
        Some(TrieMatch {
            node: i as u32,
            consumed: 1,
            match_len: if node.elements.is_some() { 1 } else { 0 },
            elements: node.elements,
        })
    }

    /// Extend a previous walk by exactly one code point.
    ///
    /// Returns `None` when no child matches; the previous match result stays
    /// valid and its deepest terminal is the answer.
    pub fn extend(&self, m: &TrieMatch, cp: u32) -> Option<TrieMatch> {
        let node = &self.nodes[m.node as usize];
        let run = &self.nodes[node.first_child as usize..node.last_child as usize];
        let i = run.binary_search_by_key(&cp, |n| n.cp).ok()?;
        let idx = node.first_child + i as u32;
        let child = &self.nodes[idx as usize];
        Some(TrieMatch {
            node: idx,
            consumed: m.consumed + 1,
            match_len: if child.elements.is_some() {
                m.consumed + 1
            } else {
                m.match_len
            },
            elements: child.elements.or(m.elements),
        })
    }

    /// Greedy longest match over a code-point stream.
    ///
    /// Walks as deep as the input allows and reports the deepest terminal
    /// visited; a longer contraction always beats a shorter one that shares
    /// its prefix.
    pub fn longest_match<I>(&self, cps: I) -> Option<TrieMatch>
    where
        I: IntoIterator<Item = u32>,
    {
        let mut it = cps.into_iter();
        let mut m = self.match_first(it.next()?)?;
        for cp in it {
            match self.extend(&m, cp) {
                Some(next) => m = next,
                None => break,
            }
        }
        Some(m)
    }

    /// Number of nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
