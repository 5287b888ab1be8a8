//! Persistent segmented vector.
//!
//! A copy-on-write B-tree of element segments. Interior nodes hold cumulative
//! size keys (prefix sums) so that offset lookups descend in O(log n); leaf
//! nodes hold either an owned segment or a *slice leaf* that borrows a
//! sub-range of another leaf's segment while keeping that segment alive.
//!
//! Cloning a [`SegmentedVector`] is O(1): the clone shares every node with the
//! original. Mutation copies only the path from the root to the touched leaf
//! (`Arc::make_mut` mutates in place when a node is uniquely owned), and range
//! edits split the tree at the boundaries and join the parts back, so they
//! too remake only the boundary paths. A mutation through one value is never
//! visible through another value that shares structure with it. Reference
//! counts are atomic, which makes concurrent reads of distinct values that
//! share nodes safe.

use std::ops::{Index, Range};
use std::sync::Arc;

/// Maximum children per interior node.
const MAX_CHILDREN: usize = 8;
/// Fanout floor for freshly built interior nodes; join seams may dip
/// below it without harm.
const MIN_CHILDREN: usize = MAX_CHILDREN / 2;
/// Maximum elements per leaf segment.
const MAX_LEAF_LEN: usize = 64;
/// Leaves shorter than this are merged with a neighbor at an edit seam,
/// bounding fragmentation from repeated slicing.
const MIN_LEAF_LEN: usize = 16;

/// A leaf segment: owned storage, or a borrowed sub-range of another
/// leaf's storage (a reference leaf).
#[derive(Debug, Clone)]
enum Leaf<T> {
    /// A full owned segment.
    Owned(Arc<Vec<T>>),
    /// A sub-range view into `origin`. Holding the `Arc` keeps the origin
    /// segment alive, so the view can never dangle.
    Slice {
        origin: Arc<Vec<T>>,
        start: usize,
        len: usize,
    },
}

impl<T> Leaf<T> {
    fn len(&self) -> usize {
        match self {
            Leaf::Owned(seg) => seg.len(),
            Leaf::Slice { len, .. } => *len,
        }
    }

    fn as_slice(&self) -> &[T] {
        match self {
            Leaf::Owned(seg) => seg,
            Leaf::Slice { origin, start, len } => &origin[*start..*start + *len],
        }
    }

    /// A sub-range view of this leaf; O(1), no element copies.
    fn trimmed(&self, lo: usize, hi: usize) -> Leaf<T> {
        debug_assert!(lo <= hi && hi <= self.len());
        match self {
            Leaf::Owned(seg) => Leaf::Slice {
                origin: Arc::clone(seg),
                start: lo,
                len: hi - lo,
            },
            Leaf::Slice { origin, start, .. } => Leaf::Slice {
                origin: Arc::clone(origin),
                start: start + lo,
                len: hi - lo,
            },
        }
    }
}

#[derive(Debug, Clone)]
struct Interior<T> {
    /// `keys[i]` is the total element count of `children[0..=i]`.
    keys: Vec<usize>,
    children: Vec<Arc<Node<T>>>,
}

#[derive(Debug, Clone)]
enum Node<T> {
    Interior(Interior<T>),
    Leaf(Leaf<T>),
}

fn node_len<T>(node: &Node<T>) -> usize {
    match node {
        Node::Interior(int) => int.keys.last().copied().unwrap_or(0),
        Node::Leaf(leaf) => leaf.len(),
    }
}

fn rebuild_keys<T>(int: &mut Interior<T>) {
    int.keys.clear();
    let mut sum = 0;
    for child in &int.children {
        sum += node_len(child);
        int.keys.push(sum);
    }
}

/// A persistent, structurally-shared sequence of elements.
///
/// Indexed access, insertion, and erasure are O(log n); `clone` is O(1);
/// [`slice`](SegmentedVector::slice) is O(log n) and shares storage with the
/// source via reference leaves instead of copying elements.
#[derive(Debug, Clone)]
pub struct SegmentedVector<T> {
    root: Option<Arc<Node<T>>>,
}

impl<T: Clone> SegmentedVector<T> {
    /// Create an empty vector.
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Total element count; O(1) via the root's aggregate size.
    pub fn len(&self) -> usize {
        self.root.as_deref().map_or(0, node_len)
    }

    /// Returns `true` if the vector holds no elements.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Element at `index`, or `None` if out of range.
    pub fn get(&self, mut index: usize) -> Option<&T> {
        let mut node = self.root.as_deref()?;
        if index >= node_len(node) {
            return None;
        }
        loop {
            match node {
                Node::Interior(int) => {
                    let i = int.keys.partition_point(|&k| k <= index);
                    if i > 0 {
                        index -= int.keys[i - 1];
                    }
                    node = &int.children[i];
                }
                Node::Leaf(leaf) => return leaf.as_slice().get(index),
            }
        }
    }

    /// Insert a single element at `index`.
    ///
    /// Panics if `index > len()`. Descends to the target leaf and mutates it
    /// in place when the path is uniquely owned; shared nodes are copied on
    /// write. Overfull nodes split on the way back up.
    pub fn insert(&mut self, index: usize, value: T) {
        let len = self.len();
        assert!(index <= len, "insert index {index} out of range (len {len})");
        match self.root.take() {
            None => {
                let leaf = Leaf::Owned(Arc::new(vec![value]));
                self.root = Some(Arc::new(Node::Leaf(leaf)));
            }
            Some(mut root) => {
                let split = insert_rec(Arc::make_mut(&mut root), index, value);
                self.root = Some(match split {
                    None => root,
                    Some(right) => {
                        let mut int = Interior {
                            keys: Vec::new(),
                            children: vec![root, right],
                        };
                        rebuild_keys(&mut int);
                        Arc::new(Node::Interior(int))
                    }
                });
            }
        }
    }

    /// Append an element.
    pub fn push(&mut self, value: T) {
        self.insert(self.len(), value);
    }

    /// Insert every element produced by `iter` at `index`, in order.
    ///
    /// The elements are packed into a balanced tree of their own and joined
    /// in at the split point; the prefix and suffix of `self` are shared,
    /// not rebuilt.
    pub fn insert_iter<I>(&mut self, index: usize, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        let len = self.len();
        assert!(index <= len, "insert index {index} out of range (len {len})");
        let mid = Self::from_leaves(pack_leaves(iter));
        if mid.root.is_none() {
            return;
        }
        let (left, right) = self.split_at(index);
        self.root = concat(concat(left, mid.root), right);
    }

    /// Erase the elements in `range`.
    ///
    /// Panics if the range is inverted or extends past the end. Splits at
    /// both boundaries and joins the outer parts, remaking only the two
    /// root-to-boundary paths; boundary leaves that fall below the minimum
    /// length merge at the seam.
    pub fn remove(&mut self, range: Range<usize>) {
        let len = self.len();
        assert!(
            range.start <= range.end && range.end <= len,
            "remove range {range:?} out of range (len {len})"
        );
        if range.start == range.end {
            return;
        }
        let (left, rest) = self.split_at(range.start);
        let tail = Self { root: rest };
        let (_, right) = tail.split_at(range.end - range.start);
        self.root = concat(left, right);
    }

    /// Replace `range` with the elements of `iter`.
    ///
    /// Defined as erase followed by insert; the two stay composable rather
    /// than being fused into one pass.
    pub fn replace<I>(&mut self, range: Range<usize>, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        let start = range.start;
        self.remove(range);
        self.insert_iter(start, iter);
    }

    /// A sub-sequence covering `range`, sharing storage with `self`.
    ///
    /// Fully-covered subtrees are shared node for node; the boundary leaves
    /// become reference leaves into the original segments, so no elements
    /// are copied.
    pub fn slice(&self, range: Range<usize>) -> Self {
        let len = self.len();
        assert!(
            range.start <= range.end && range.end <= len,
            "slice range {range:?} out of range (len {len})"
        );
        let (_, rest) = self.split_at(range.start);
        let tail = Self { root: rest };
        let (mid, _) = tail.split_at(range.end - range.start);
        Self { root: mid }
    }

    /// Iterate all elements front to back.
    ///
    /// The iterator descends once per leaf and then scans the leaf linearly;
    /// it never re-descends from the root per element.
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter {
            stack: Vec::new(),
            leaf: &[],
            pos: 0,
        };
        if let Some(root) = self.root.as_deref() {
            iter.descend(root);
        }
        iter
    }

    /// Split into the trees covering `[0, at)` and `[at, len)`. Only the
    /// nodes along the split path are remade; every other subtree is shared.
    fn split_at(&self, at: usize) -> (Option<Arc<Node<T>>>, Option<Arc<Node<T>>>) {
        let Some(root) = self.root.as_ref() else {
            return (None, None);
        };
        if at == 0 {
            return (None, Some(Arc::clone(root)));
        }
        if at == node_len(root) {
            return (Some(Arc::clone(root)), None);
        }
        split_node(root, at)
    }

    /// Build a balanced tree from an ordered run of leaves.
    ///
    /// Adjacent underfull leaves are coalesced into owned segments first.
    fn from_leaves(leaves: Vec<Leaf<T>>) -> Self {
        let mut merged: Vec<Leaf<T>> = Vec::with_capacity(leaves.len());
        for leaf in leaves {
            if leaf.len() == 0 {
                continue;
            }
            if let Some(last) = merged.last_mut()
                && (last.len() < MIN_LEAF_LEN || leaf.len() < MIN_LEAF_LEN)
                && last.len() + leaf.len() <= MAX_LEAF_LEN
            {
                let mut seg = last.as_slice().to_vec();
                seg.extend_from_slice(leaf.as_slice());
                *last = Leaf::Owned(Arc::new(seg));
                continue;
            }
            merged.push(leaf);
        }

        if merged.is_empty() {
            return Self { root: None };
        }

        let mut level: Vec<Arc<Node<T>>> = merged
            .into_iter()
            .map(|leaf| Arc::new(Node::Leaf(leaf)))
            .collect();
        while level.len() > 1 {
            let cur = std::mem::take(&mut level);
            let n = cur.len();
            // Distribute children evenly so every interior node lands in
            // [MIN_CHILDREN, MAX_CHILDREN].
            let groups = n.div_ceil(MAX_CHILDREN);
            let base = n / groups;
            let extra = n % groups;
            let mut it = cur.into_iter();
            for g in 0..groups {
                let take = base + usize::from(g < extra);
                let children: Vec<_> = it.by_ref().take(take).collect();
                debug_assert!(groups == 1 || children.len() >= MIN_CHILDREN);
                let mut int = Interior {
                    keys: Vec::new(),
                    children,
                };
                rebuild_keys(&mut int);
                level.push(Arc::new(Node::Interior(int)));
            }
        }
        Self { root: level.pop() }
    }
}

/// Height of a subtree; leaves are height 0. Every child of an interior
/// node has the same height.
fn height<T>(node: &Node<T>) -> usize {
    let mut h = 0;
    let mut cur = node;
    while let Node::Interior(int) = cur {
        h += 1;
        cur = &int.children[0];
    }
    h
}

fn make_interior<T>(children: Vec<Arc<Node<T>>>) -> Arc<Node<T>> {
    debug_assert!(children.len() >= 2);
    let mut int = Interior {
        keys: Vec::new(),
        children,
    };
    rebuild_keys(&mut int);
    Arc::new(Node::Interior(int))
}

/// A run of same-height siblings as a standalone tree.
fn subtree<T>(children: &[Arc<Node<T>>]) -> Option<Arc<Node<T>>> {
    match children {
        [] => None,
        [only] => Some(Arc::clone(only)),
        _ => Some(make_interior(children.to_vec())),
    }
}

/// Join two trees end to end, remaking only the spine where they meet.
fn concat<T: Clone>(a: Option<Arc<Node<T>>>, b: Option<Arc<Node<T>>>) -> Option<Arc<Node<T>>> {
    let a = match a {
        None => return b,
        Some(a) => a,
    };
    let b = match b {
        None => return Some(a),
        Some(b) => b,
    };
    let (ha, hb) = (height(&a), height(&b));
    let mut parts = concat_nodes(a, ha, b, hb);
    match parts.len() {
        1 => parts.pop(),
        _ => Some(make_interior(parts)),
    }
}

/// Join `a` and `b` into one or two nodes of height `max(ha, hb)`.
///
/// The shorter tree merges into the taller one's facing spine. Overflowing
/// child runs split evenly so fanout never exceeds `MAX_CHILDREN`, and
/// adjacent underfull seam leaves coalesce into one owned segment. Heights
/// stay uniform throughout.
fn concat_nodes<T: Clone>(
    a: Arc<Node<T>>,
    ha: usize,
    b: Arc<Node<T>>,
    hb: usize,
) -> Vec<Arc<Node<T>>> {
    use std::cmp::Ordering;
    match ha.cmp(&hb) {
        Ordering::Equal => match (a.as_ref(), b.as_ref()) {
            (Node::Leaf(la), Node::Leaf(lb)) => {
                if (la.len() < MIN_LEAF_LEN || lb.len() < MIN_LEAF_LEN)
                    && la.len() + lb.len() <= MAX_LEAF_LEN
                {
                    let mut seg = la.as_slice().to_vec();
                    seg.extend_from_slice(lb.as_slice());
                    vec![Arc::new(Node::Leaf(Leaf::Owned(Arc::new(seg))))]
                } else {
                    vec![a, b]
                }
            }
            (Node::Interior(ia), Node::Interior(ib)) => {
                let mut children = ia.children.clone();
                children.extend(ib.children.iter().cloned());
                rebalance_level(children)
            }
            _ => unreachable!("equal heights mix leaf and interior"),
        },
        Ordering::Greater => {
            let Node::Interior(int) = a.as_ref() else {
                unreachable!()
            };
            let last = int.children.len() - 1;
            let parts = concat_nodes(Arc::clone(&int.children[last]), ha - 1, b, hb);
            let mut children = int.children[..last].to_vec();
            children.extend(parts);
            rebalance_level(children)
        }
        Ordering::Less => {
            let Node::Interior(int) = b.as_ref() else {
                unreachable!()
            };
            let parts = concat_nodes(a, ha, Arc::clone(&int.children[0]), hb - 1);
            let mut children = parts;
            children.extend(int.children[1..].iter().cloned());
            rebalance_level(children)
        }
    }
}

/// Wrap a run of same-height children into one node, or two when the run
/// overflows `MAX_CHILDREN`.
fn rebalance_level<T>(children: Vec<Arc<Node<T>>>) -> Vec<Arc<Node<T>>> {
    if children.len() <= MAX_CHILDREN {
        vec![make_interior(children)]
    } else {
        let mut left = children;
        let right = left.split_off(left.len() / 2);
        vec![make_interior(left), make_interior(right)]
    }
}

/// Split a subtree at interior offset `at` (`0 < at < len`). Children
/// entirely on one side are shared; only the child straddling the offset
/// splits recursively.
fn split_node<T: Clone>(node: &Node<T>, at: usize) -> (Option<Arc<Node<T>>>, Option<Arc<Node<T>>>) {
    match node {
        Node::Leaf(leaf) => {
            debug_assert!(0 < at && at < leaf.len());
            let left = Arc::new(Node::Leaf(leaf.trimmed(0, at)));
            let right = Arc::new(Node::Leaf(leaf.trimmed(at, leaf.len())));
            (Some(left), Some(right))
        }
        Node::Interior(int) => {
            let i = int.keys.partition_point(|&k| k <= at);
            let prefix = if i > 0 { int.keys[i - 1] } else { 0 };
            if at == prefix {
                // The offset falls on a child boundary; no leaf splits.
                (subtree(&int.children[..i]), subtree(&int.children[i..]))
            } else {
                let (cl, cr) = split_node(&int.children[i], at - prefix);
                let left = concat(subtree(&int.children[..i]), cl);
                let right = concat(cr, subtree(&int.children[i + 1..]));
                (left, right)
            }
        }
    }
}

/// Recursive single-element insert. Returns a split-off right sibling when
/// the node overflowed.
fn insert_rec<T: Clone>(node: &mut Node<T>, index: usize, value: T) -> Option<Arc<Node<T>>> {
    match node {
        Node::Leaf(leaf) => {
            // A slice leaf flattens into an owned segment before mutating;
            // its origin stays untouched.
            if let Leaf::Slice { .. } = leaf {
                let flat = leaf.as_slice().to_vec();
                *leaf = Leaf::Owned(Arc::new(flat));
            }
            let Leaf::Owned(seg) = leaf else { unreachable!() };
            let seg = Arc::make_mut(seg);
            seg.insert(index, value);
            if seg.len() > MAX_LEAF_LEN {
                let right = seg.split_off(seg.len() / 2);
                return Some(Arc::new(Node::Leaf(Leaf::Owned(Arc::new(right)))));
            }
            None
        }
        Node::Interior(int) => {
            // First child whose cumulative size reaches the index; an index
            // on a boundary goes to the earlier child's end.
            let i = int.keys.partition_point(|&k| k < index);
            let prefix = if i > 0 { int.keys[i - 1] } else { 0 };
            let split = insert_rec(Arc::make_mut(&mut int.children[i]), index - prefix, value);
            if let Some(right) = split {
                int.children.insert(i + 1, right);
            }
            rebuild_keys(int);
            if int.children.len() > MAX_CHILDREN {
                let mid = int.children.len() / 2;
                let right_children: Vec<_> = int.children.drain(mid..).collect();
                rebuild_keys(int);
                let mut right = Interior {
                    keys: Vec::new(),
                    children: right_children,
                };
                rebuild_keys(&mut right);
                return Some(Arc::new(Node::Interior(right)));
            }
            None
        }
    }
}

impl<T: Clone> Default for SegmentedVector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Index<usize> for SegmentedVector<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        let len = self.len();
        self.get(index)
            .unwrap_or_else(|| panic!("index {index} out of range (len {len})"))
    }
}

impl<T: Clone> FromIterator<T> for SegmentedVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_leaves(pack_leaves(iter))
    }
}

impl<T: Clone> Extend<T> for SegmentedVector<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.insert_iter(self.len(), iter);
    }
}

impl<T: Clone + PartialEq> PartialEq for SegmentedVector<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Clone + Eq> Eq for SegmentedVector<T> {}

impl<T: Clone> SegmentedVector<T> {
    /// Collect into a plain `Vec`.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

/// Pack an element stream into full owned leaves.
fn pack_leaves<T, I>(iter: I) -> Vec<Leaf<T>>
where
    I: IntoIterator<Item = T>,
{
    let mut leaves = Vec::new();
    let mut seg: Vec<T> = Vec::with_capacity(MAX_LEAF_LEN);
    for value in iter {
        seg.push(value);
        if seg.len() == MAX_LEAF_LEN {
            leaves.push(Leaf::Owned(Arc::new(std::mem::replace(
                &mut seg,
                Vec::with_capacity(MAX_LEAF_LEN),
            ))));
        }
    }
    if !seg.is_empty() {
        leaves.push(Leaf::Owned(Arc::new(seg)));
    }
    leaves
}

/// Front-to-back element iterator. See [`SegmentedVector::iter`].
pub struct Iter<'a, T> {
    stack: Vec<(&'a Interior<T>, usize)>,
    leaf: &'a [T],
    pos: usize,
}

impl<'a, T> Iter<'a, T> {
    fn descend(&mut self, mut node: &'a Node<T>) {
        loop {
            match node {
                Node::Interior(int) => {
                    self.stack.push((int, 0));
                    node = &int.children[0];
                }
                Node::Leaf(leaf) => {
                    self.leaf = leaf.as_slice();
                    self.pos = 0;
                    return;
                }
            }
        }
    }

    fn advance_leaf(&mut self) -> bool {
        loop {
            let next: Option<&'a Node<T>> = {
                let Some((int, i)) = self.stack.last_mut() else {
                    return false;
                };
                *i += 1;
                if *i < int.children.len() {
                    Some(int.children[*i].as_ref())
                } else {
                    None
                }
            };
            match next {
                Some(node) => {
                    self.descend(node);
                    return true;
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        loop {
            if self.pos < self.leaf.len() {
                let item = &self.leaf[self.pos];
                self.pos += 1;
                return Some(item);
            }
            if !self.advance_leaf() {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<T: Clone + std::fmt::Debug>(sv: &SegmentedVector<T>) -> Vec<T> {
        sv.to_vec()
    }

    #[test]
    fn test_empty() {
        let sv: SegmentedVector<u32> = SegmentedVector::new();
        assert_eq!(sv.len(), 0);
        assert!(sv.is_empty());
        assert_eq!(sv.get(0), None);
    }

    #[test]
    fn test_push_and_index() {
        let mut sv = SegmentedVector::new();
        for i in 0..500u32 {
            sv.push(i);
        }
        assert_eq!(sv.len(), 500);
        for i in 0..500usize {
            assert_eq!(sv[i], i as u32);
        }
    }

    #[test]
    fn test_insert_front_splits() {
        let mut sv = SegmentedVector::new();
        for i in 0..300u32 {
            sv.insert(0, i);
        }
        let expected: Vec<u32> = (0..300).rev().collect();
        assert_eq!(collect(&sv), expected);
    }

    #[test]
    fn test_from_iter_round_trip() {
        let data: Vec<u32> = (0..1000).collect();
        let sv: SegmentedVector<u32> = data.iter().copied().collect();
        assert_eq!(collect(&sv), data);
    }

    #[test]
    fn test_remove_middle() {
        let mut sv: SegmentedVector<u32> = (0..200).collect();
        sv.remove(50..150);
        let mut expected: Vec<u32> = (0..50).collect();
        expected.extend(150..200);
        assert_eq!(collect(&sv), expected);
    }

    #[test]
    fn test_replace() {
        let mut sv: SegmentedVector<u32> = (0..100).collect();
        sv.replace(10..20, [7, 7, 7]);
        let mut expected: Vec<u32> = (0..10).collect();
        expected.extend([7, 7, 7]);
        expected.extend(20..100);
        assert_eq!(collect(&sv), expected);
    }

    #[test]
    fn test_slice_shares_without_copy() {
        let sv: SegmentedVector<u32> = (0..1000).collect();
        let slice = sv.slice(100..900);
        assert_eq!(slice.len(), 800);
        assert_eq!(slice[0], 100);
        assert_eq!(slice[799], 899);
        // The source is untouched.
        assert_eq!(sv.len(), 1000);
        assert_eq!(sv[0], 0);
    }

    #[test]
    fn test_persistence_after_clone() {
        let a: SegmentedVector<u32> = (0..256).collect();
        let mut b = a.clone();
        b.insert(128, 9999);
        b.remove(0..10);

        // `a` is observably unchanged.
        assert_eq!(a.len(), 256);
        for i in 0..256usize {
            assert_eq!(a[i], i as u32);
        }
        assert_eq!(b.len(), 247);
        assert_eq!(b[118], 9999);
    }

    #[test]
    fn test_mutating_slice_leaves_origin_alone() {
        let a: SegmentedVector<u32> = (0..100).collect();
        let mut s = a.slice(10..40);
        s.insert(0, 42);
        assert_eq!(s[0], 42);
        assert_eq!(s[1], 10);
        assert_eq!(a[10], 10);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_index_out_of_range_panics() {
        let sv: SegmentedVector<u32> = (0..10).collect();
        let _ = sv[10];
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_remove_past_end_panics() {
        let mut sv: SegmentedVector<u32> = (0..10).collect();
        sv.remove(5..11);
    }

    #[test]
    fn test_iter_matches_index_order() {
        let sv: SegmentedVector<u32> = (0..777).collect();
        let via_iter: Vec<u32> = sv.iter().copied().collect();
        let via_index: Vec<u32> = (0..sv.len()).map(|i| sv[i]).collect();
        assert_eq!(via_iter, via_index);
    }

    /// Addresses of every leaf node, front to back.
    fn leaf_ptrs<T: Clone>(sv: &SegmentedVector<T>) -> Vec<*const Node<T>> {
        fn walk<T>(node: &Arc<Node<T>>, out: &mut Vec<*const Node<T>>) {
            match node.as_ref() {
                Node::Interior(int) => {
                    for child in &int.children {
                        walk(child, out);
                    }
                }
                Node::Leaf(_) => out.push(Arc::as_ptr(node)),
            }
        }
        let mut out = Vec::new();
        if let Some(root) = sv.root.as_ref() {
            walk(root, &mut out);
        }
        out
    }

    #[test]
    fn test_range_erase_shares_untouched_subtrees() {
        let a: SegmentedVector<u32> = (0..10_000).collect();
        let mut b = a.clone();
        b.remove(9_990..9_995);
        assert_eq!(b.len(), 9_995);
        assert_eq!(b[9_990], 9_995);
        // An edit near the end leaves the front of the tree alone: the first
        // leaf of both values is the same node, not a rebuilt copy.
        assert_eq!(leaf_ptrs(&a)[0], leaf_ptrs(&b)[0]);
    }

    #[test]
    fn test_bulk_insert_shares_the_untouched_prefix() {
        let a: SegmentedVector<u32> = (0..10_000).collect();
        let mut b = a.clone();
        b.insert_iter(9_000, [1, 2, 3]);
        assert_eq!(b.len(), 10_003);
        assert_eq!(b[9_000], 1);
        assert_eq!(b[9_003], 9_000);
        assert_eq!(leaf_ptrs(&a)[0], leaf_ptrs(&b)[0]);
    }

    #[test]
    fn test_slice_shares_interior_leaf_nodes() {
        use std::collections::HashSet;
        let a: SegmentedVector<u32> = (0..10_000).collect();
        let s = a.slice(3..9_997);
        assert_eq!(s.to_vec(), (3..9_997).collect::<Vec<u32>>());

        let original: HashSet<_> = leaf_ptrs(&a).into_iter().collect();
        let slice_leaves = leaf_ptrs(&s);
        let shared = slice_leaves
            .iter()
            .filter(|p| original.contains(*p))
            .count();
        // Everything but the two trimmed boundary leaves is the original
        // node, untouched.
        assert!(shared + 2 >= slice_leaves.len());
        assert!(shared > 100);
    }

    #[test]
    fn test_equality_ignores_structure() {
        let a: SegmentedVector<u32> = (0..100).collect();
        let mut b = SegmentedVector::new();
        for i in 0..100 {
            b.push(i);
        }
        assert_eq!(a, b);
        let c = a.slice(0..99);
        assert_ne!(a, c);
    }
}
