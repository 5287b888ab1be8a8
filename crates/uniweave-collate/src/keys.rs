//! Multi-level comparison and sort keys.
//!
//! Both entry points share one level-extraction pass, so [`collate`] and
//! comparing [`collation_sort_key`] outputs always agree: the sort key is
//! the level vectors concatenated with `0x0000` separators, and direct
//! comparison walks the same vectors level by level without materializing
//! the key.

use std::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;

use crate::element::{COMMON_L3, CollationElement, Strength, UPPER_L3};
use crate::table::{CollateParams, CollationTable, L2Order};

/// A binary sort key. Comparing keys as `u16` sequences is equivalent to
/// calling [`collate`] on the source strings with the same table and params.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortKey(Vec<u16>);

impl SortKey {
    /// The key as `u16` weight units.
    pub fn as_units(&self) -> &[u16] {
        &self.0
    }

    /// The key as bytes, big-endian so that plain `memcmp` order matches
    /// unit order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.0.len() * 2);
        for &u in &self.0 {
            out.extend_from_slice(&u.to_be_bytes());
        }
        out
    }
}

/// Per-level weight vectors for one input, after strength and option
/// filtering. Levels above the requested strength stay empty.
struct Levels {
    l1: Vec<u16>,
    l2: Vec<u16>,
    case: Vec<u16>,
    l3: Vec<u16>,
    l4: Vec<u16>,
    identical: Vec<u16>,
}

fn extract_levels(
    nfd: &[char],
    elems: &[CollationElement],
    params: &CollateParams,
) -> Levels {
    let strength = params.strength;

    let l1 = elems.iter().map(|e| e.l1).filter(|&w| w != 0).collect();

    let mut l2: Vec<u16> = if strength >= Strength::Secondary {
        elems.iter().map(|e| e.l2).filter(|&w| w != 0).collect()
    } else {
        Vec::new()
    };
    if params.l2_order == L2Order::Backward {
        l2.reverse();
    }

    // The case level ranks each tertiary-bearing element by case only;
    // case-first has already swapped the weights when it applies.
    let case: Vec<u16> = if params.case_level {
        elems
            .iter()
            .filter(|e| e.l3 != 0)
            .map(|e| if e.l3 == UPPER_L3 { 2 } else { 1 })
            .collect()
    } else {
        Vec::new()
    };

    let l3: Vec<u16> = if strength >= Strength::Tertiary {
        elems
            .iter()
            .map(|e| {
                // With a dedicated case level the tertiary weights drop
                // their case distinction so it is not counted twice.
                if params.case_level && e.l3 == UPPER_L3 {
                    COMMON_L3
                } else {
                    e.l3
                }
            })
            .filter(|&w| w != 0)
            .collect()
    } else {
        Vec::new()
    };

    let l4: Vec<u16> = if strength >= Strength::Quaternary {
        elems.iter().map(|e| e.l4).filter(|&w| w != 0).collect()
    } else {
        Vec::new()
    };

    let identical: Vec<u16> = if strength == Strength::Identical {
        nfd.iter()
            .flat_map(|&c| {
                let cp = c as u32;
                [(cp >> 16) as u16, cp as u16]
            })
            .collect()
    } else {
        Vec::new()
    };

    Levels {
        l1,
        l2,
        case,
        l3,
        l4,
        identical,
    }
}

fn levels_for<I>(text: I, table: &CollationTable, params: &CollateParams) -> Levels
where
    I: IntoIterator<Item = char>,
{
    let nfd: Vec<char> = text.into_iter().nfd().collect();
    let mut elems = Vec::new();
    table.copy_collation_elements(nfd.iter().copied(), &mut elems, params);
    extract_levels(&nfd, &elems, params)
}

/// Compare two strings under `table` and `params`.
///
/// Inputs are normalized to NFD first, so canonically equivalent strings
/// always compare equal regardless of strength.
pub fn collate(a: &str, b: &str, table: &CollationTable, params: &CollateParams) -> Ordering {
    collate_chars(a.chars(), b.chars(), table, params)
}

/// [`collate`] over arbitrary code-point iterators (rope segments included).
pub fn collate_chars<A, B>(a: A, b: B, table: &CollationTable, params: &CollateParams) -> Ordering
where
    A: IntoIterator<Item = char>,
    B: IntoIterator<Item = char>,
{
    let la = levels_for(a, table, params);
    let lb = levels_for(b, table, params);
    la.l1
        .cmp(&lb.l1)
        .then_with(|| la.l2.cmp(&lb.l2))
        .then_with(|| la.case.cmp(&lb.case))
        .then_with(|| la.l3.cmp(&lb.l3))
        .then_with(|| la.l4.cmp(&lb.l4))
        .then_with(|| la.identical.cmp(&lb.identical))
}

/// Build the sort key for `text`.
pub fn collation_sort_key(text: &str, table: &CollationTable, params: &CollateParams) -> SortKey {
    collation_sort_key_chars(text.chars(), table, params)
}

/// [`collation_sort_key`] over an arbitrary code-point iterator.
pub fn collation_sort_key_chars<I>(
    text: I,
    table: &CollationTable,
    params: &CollateParams,
) -> SortKey
where
    I: IntoIterator<Item = char>,
{
    let lv = levels_for(text, table, params);
    // A weight is never zero inside a level, so the zero separator sorts
    // below every weight and shorter-prefix inputs order first. (The
    // identical level may carry zero high words, but it is last and both
    // keys reach it only with every earlier level equal.)
    let mut key = lv.l1;
    for level in [lv.l2, lv.case, lv.l3, lv.l4, lv.identical] {
        key.push(0);
        key.extend(level);
    }
    SortKey(key)
}

impl CollationTable {
    /// Compare two strings with this table. See [`collate`].
    pub fn collate(&self, a: &str, b: &str, params: &CollateParams) -> Ordering {
        collate(a, b, self, params)
    }

    /// Sort key for `text` under this table. See [`collation_sort_key`].
    pub fn sort_key(&self, text: &str, params: &CollateParams) -> SortKey {
        collation_sort_key(text, self, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{CaseFirst, VariableWeighting};

    fn table() -> CollationTable {
        CollationTable::default_table()
    }

    #[test]
    fn test_basic_alphabetic_order() {
        let t = table();
        let p = CollateParams::default();
        assert_eq!(t.collate("apple", "banana", &p), Ordering::Less);
        assert_eq!(t.collate("banana", "banana", &p), Ordering::Equal);
        assert_eq!(t.collate("cherry", "banana", &p), Ordering::Greater);
    }

    #[test]
    fn test_strength_collapses_differences() {
        let t = table();
        let primary = CollateParams {
            strength: Strength::Primary,
            ..CollateParams::default()
        };
        let secondary = CollateParams {
            strength: Strength::Secondary,
            ..CollateParams::default()
        };
        let tertiary = CollateParams::default();

        // Accent: invisible at primary, visible at secondary.
        assert_eq!(t.collate("cafe", "caf\u{e9}", &primary), Ordering::Equal);
        assert_eq!(t.collate("cafe", "caf\u{e9}", &secondary), Ordering::Less);

        // Case: invisible through secondary, visible at tertiary.
        assert_eq!(t.collate("abc", "ABC", &secondary), Ordering::Equal);
        assert_eq!(t.collate("abc", "ABC", &tertiary), Ordering::Less);
    }

    #[test]
    fn test_canonically_equivalent_strings_compare_equal() {
        let t = table();
        let p = CollateParams {
            strength: Strength::Identical,
            ..CollateParams::default()
        };
        assert_eq!(t.collate("caf\u{e9}", "cafe\u{301}", &p), Ordering::Equal);
    }

    #[test]
    fn test_contraction_orders_between_neighbors() {
        let t = table();
        let p = CollateParams::default();
        // "ch" is a single unit sorting after every plain-c word.
        assert_eq!(t.collate("cz", "cha", &p), Ordering::Less);
        assert_eq!(t.collate("cha", "da", &p), Ordering::Less);
    }

    #[test]
    fn test_shifted_hyphen_is_ignored_until_quaternary() {
        let t = table();
        let shifted = CollateParams {
            weighting: VariableWeighting::Shifted,
            ..CollateParams::default()
        };
        assert_eq!(t.collate("de-luge", "deluge", &shifted), Ordering::Equal);

        let quaternary = CollateParams {
            strength: Strength::Quaternary,
            weighting: VariableWeighting::Shifted,
            ..CollateParams::default()
        };
        assert_ne!(t.collate("de-luge", "deluge", &quaternary), Ordering::Equal);
    }

    #[test]
    fn test_backward_secondary_reverses_accent_order() {
        let t = table();
        let forward = CollateParams::default();
        let backward = CollateParams {
            l2_order: L2Order::Backward,
            ..CollateParams::default()
        };
        // cote < coté forward; French ordering flips pairs like
        // "côte" vs "coté" where the later accent decides.
        let a = "cot\u{e9}"; // cote + acute on the last vowel
        let b = "c\u{f4}te"; // circumflex on the first vowel
        let fwd = t.collate(a, b, &forward);
        let bwd = t.collate(a, b, &backward);
        assert_ne!(fwd, Ordering::Equal);
        assert_eq!(bwd, fwd.reverse());
    }

    #[test]
    fn test_case_first_upper() {
        let t = table();
        let p = CollateParams {
            case_first: CaseFirst::Upper,
            ..CollateParams::default()
        };
        assert_eq!(t.collate("Zebra", "zebra", &p), Ordering::Less);
    }

    #[test]
    fn test_case_level_isolated_from_tertiary() {
        let t = table();
        let p = CollateParams {
            case_level: true,
            ..CollateParams::default()
        };
        assert_eq!(t.collate("ab", "Ab", &p), Ordering::Less);
        assert_eq!(t.collate("ab", "ab", &p), Ordering::Equal);
    }

    #[test]
    fn test_identical_strength_totally_orders_unmapped_text() {
        let t = table();
        let p = CollateParams {
            strength: Strength::Identical,
            ..CollateParams::default()
        };
        // Unmapped code points fall back to implicit weights in
        // code-point order.
        assert_eq!(t.collate("\u{4E00}", "\u{4E01}", &p), Ordering::Less);
    }

    #[test]
    fn test_sort_key_comparison_matches_collate() {
        let t = table();
        let inputs = ["", "a", "A", "ab", "a\u{301}b", "cha", "cz", "de-luge", "deluge", "\u{4E2D}"];
        for strength in [
            Strength::Primary,
            Strength::Secondary,
            Strength::Tertiary,
            Strength::Quaternary,
            Strength::Identical,
        ] {
            for weighting in [VariableWeighting::NonIgnorable, VariableWeighting::Shifted] {
                let p = CollateParams {
                    strength,
                    weighting,
                    ..CollateParams::default()
                };
                for a in inputs {
                    for b in inputs {
                        let direct = t.collate(a, b, &p);
                        let keyed = t.sort_key(a, &p).cmp(&t.sort_key(b, &p));
                        assert_eq!(direct, keyed, "mismatch for {a:?} vs {b:?} at {p:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_sort_key_bytes_preserve_unit_order() {
        let t = table();
        let p = CollateParams::default();
        let a = t.sort_key("apple", &p);
        let b = t.sort_key("banana", &p);
        assert_eq!(a.to_bytes().cmp(&b.to_bytes()), a.cmp(&b));
    }
}
