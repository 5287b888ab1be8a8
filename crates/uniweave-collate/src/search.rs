//! Collation-aware substring search.
//!
//! Finds rope substrings that are collation-equal to a needle at the
//! requested strength: at primary strength `"fox"` matches `"Fox"` and
//! `"f\u{f6}x"`. Candidate windows are constrained to boundaries from a
//! break function (graphemes by default), so a match never starts or ends
//! inside a user-perceived character.
//!
//! The scan compares sort keys: a window grows from each boundary until its
//! key matches the needle's or its primary weights already exceed the
//! needle's primary count, which bounds the window without decoding the
//! whole haystack per candidate.

use uniweave::{BreakFn, Rope, grapheme_break_before};

use crate::keys::{SortKey, collation_sort_key, collation_sort_key_chars};
use crate::table::{CollateParams, CollationTable};

/// A match: a half-open code-point range into the haystack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    /// Code-point offset of the first matched character.
    pub start: usize,
    /// Code-point offset one past the last matched character.
    pub end: usize,
}

/// Find the first substring of `haystack` collation-equal to `needle`.
///
/// `break_fn` gates both match edges; pass [`grapheme_break_before`] for
/// user-perceived-character boundaries or [`uniweave::word_break_before`]
/// for whole-word search. Returns the shortest match at the leftmost
/// position. A needle that is completely ignorable at the requested
/// strength matches nothing.
pub fn find(
    haystack: &Rope,
    needle: &str,
    table: &CollationTable,
    params: &CollateParams,
    break_fn: BreakFn,
) -> Option<SearchMatch> {
    let chars: Vec<char> = haystack.chars().collect();
    find_from(&chars, needle, table, params, break_fn, 0)
}

/// Find every non-overlapping match, left to right.
pub fn find_all(
    haystack: &Rope,
    needle: &str,
    table: &CollationTable,
    params: &CollateParams,
    break_fn: BreakFn,
) -> Vec<SearchMatch> {
    let chars: Vec<char> = haystack.chars().collect();
    let mut matches = Vec::new();
    let mut from = 0;
    while let Some(m) = find_from(&chars, needle, table, params, break_fn, from) {
        from = m.end;
        matches.push(m);
    }
    matches
}

/// Convenience wrapper: [`find`] at grapheme boundaries.
pub fn find_graphemes(
    haystack: &Rope,
    needle: &str,
    table: &CollationTable,
    params: &CollateParams,
) -> Option<SearchMatch> {
    find(haystack, needle, table, params, grapheme_break_before)
}

fn find_from(
    chars: &[char],
    needle: &str,
    table: &CollationTable,
    params: &CollateParams,
    break_fn: BreakFn,
    from: usize,
) -> Option<SearchMatch> {
    let needle_key = collation_sort_key(needle, table, params);
    if needle_key.as_units().iter().all(|&w| w == 0) {
        return None;
    }
    let needle_l1 = l1_len(&needle_key);

    for start in from..chars.len() {
        if break_fn(chars, start) != start {
            continue;
        }
        // A match never starts on text that is ignorable at this strength;
        // otherwise "café" would match " CAFÉ" space included under shifted
        // primary comparison.
        let mut lead_end = start + 1;
        while lead_end < chars.len() && break_fn(chars, lead_end) != lead_end {
            lead_end += 1;
        }
        let lead = collation_sort_key_chars(chars[start..lead_end].iter().copied(), table, params);
        if lead.as_units().iter().all(|&w| w == 0) {
            continue;
        }
        let mut end = start;
        while end < chars.len() {
            end += 1;
            if break_fn(chars, end) != end {
                continue;
            }
            let window_key =
                collation_sort_key_chars(chars[start..end].iter().copied(), table, params);
            if window_key == needle_key {
                return Some(SearchMatch { start, end });
            }
            // Once the window carries more primary weight than the needle,
            // growing it further can only move it away.
            if l1_len(&window_key) > needle_l1 {
                break;
            }
        }
    }
    None
}

/// Number of primary weights at the front of a sort key. The separator is
/// always present because keys carry every level slot.
fn l1_len(key: &SortKey) -> usize {
    let units = key.as_units();
    units.iter().position(|&w| w == 0).unwrap_or(units.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Strength;
    use crate::table::VariableWeighting;
    use uniweave::word_break_before;

    fn table() -> CollationTable {
        CollationTable::default_table()
    }

    fn primary() -> CollateParams {
        CollateParams {
            strength: Strength::Primary,
            weighting: VariableWeighting::Shifted,
            ..CollateParams::default()
        }
    }

    #[test]
    fn test_exact_match() {
        let hay = Rope::from("the quick brown fox");
        let t = table();
        let m = find_graphemes(&hay, "quick", &t, &CollateParams::default()).unwrap();
        assert_eq!((m.start, m.end), (4, 9));
    }

    #[test]
    fn test_primary_match_ignores_case_and_accents() {
        let t = table();
        let hay = Rope::from("Le CAF\u{c9} ferme");
        let m = find_graphemes(&hay, "caf\u{e9}", &t, &primary()).unwrap();
        assert_eq!((m.start, m.end), (3, 7));
        // And a decomposed needle matches a precomposed haystack.
        let m = find_graphemes(&hay, "cafe\u{301}", &t, &primary()).unwrap();
        assert_eq!((m.start, m.end), (3, 7));
    }

    #[test]
    fn test_no_match_at_tertiary_when_case_differs() {
        let t = table();
        let hay = Rope::from("Fox");
        assert!(find_graphemes(&hay, "fox", &t, &CollateParams::default()).is_none());
        assert!(find_graphemes(&hay, "fox", &t, &primary()).is_some());
    }

    #[test]
    fn test_match_never_splits_a_grapheme() {
        let t = table();
        // Haystack ends in e + combining acute: "e" alone must not match
        // inside that grapheme.
        let hay = Rope::from("ole\u{301}");
        let m = find_graphemes(&hay, "l", &t, &CollateParams::default()).unwrap();
        assert_eq!((m.start, m.end), (1, 2));
        assert!(find_graphemes(&hay, "e", &t, &CollateParams::default()).is_none());
    }

    #[test]
    fn test_word_boundary_search() {
        let t = table();
        let hay = Rope::from("scone unscoped scone");
        let all = find_all(&hay, "scone", &t, &primary(), word_break_before);
        assert_eq!(all.len(), 2);
        assert_eq!((all[0].start, all[0].end), (0, 5));
        assert_eq!((all[1].start, all[1].end), (15, 20));
    }

    #[test]
    fn test_find_all_non_overlapping() {
        let t = table();
        let hay = Rope::from("aaaa");
        let all = find_all(&hay, "aa", &t, &CollateParams::default(), grapheme_break_before);
        assert_eq!(all.len(), 2);
        assert_eq!((all[0].start, all[0].end), (0, 2));
        assert_eq!((all[1].start, all[1].end), (2, 4));
    }

    #[test]
    fn test_ignorable_needle_matches_nothing() {
        let t = table();
        let hay = Rope::from("a-b");
        assert!(find_graphemes(&hay, "-", &t, &primary()).is_none());
        assert!(find_all(&hay, "", &t, &primary(), grapheme_break_before).is_empty());
    }
}
