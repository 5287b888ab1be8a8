use std::cmp::Ordering;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uniweave_collate::{
    CaseFirst, CollateParams, CollationTable, L2Order, Strength, VariableWeighting, collate,
    collation_sort_key,
};

const ALPHABET: &[char] = &[
    'a', 'b', 'c', 'h', 'z', 'A', 'C', 'Z', '0', '9', ' ', '-', '.', '\u{e9}', '\u{301}',
    '\u{3B1}', '\u{391}', '\u{4E2D}', '\u{1F600}',
];

fn random_string(rng: &mut StdRng, max_len: usize) -> String {
    let len = rng.gen_range(0..=max_len);
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
        .collect()
}

fn all_params() -> Vec<CollateParams> {
    let mut out = Vec::new();
    for strength in [
        Strength::Primary,
        Strength::Secondary,
        Strength::Tertiary,
        Strength::Quaternary,
        Strength::Identical,
    ] {
        for weighting in [VariableWeighting::NonIgnorable, VariableWeighting::Shifted] {
            out.push(CollateParams {
                strength,
                weighting,
                ..CollateParams::default()
            });
        }
    }
    out.push(CollateParams {
        l2_order: L2Order::Backward,
        ..CollateParams::default()
    });
    out.push(CollateParams {
        case_level: true,
        case_first: CaseFirst::Upper,
        ..CollateParams::default()
    });
    out
}

#[test]
fn test_collate_is_a_consistent_total_order() {
    let table = CollationTable::default_table();
    let mut rng = StdRng::seed_from_u64(0xC0_11A7E);
    let strings: Vec<String> = (0..40).map(|_| random_string(&mut rng, 6)).collect();

    for params in all_params() {
        // Antisymmetry.
        for a in &strings {
            for b in &strings {
                let ab = collate(a, b, &table, &params);
                let ba = collate(b, a, &table, &params);
                assert_eq!(ab, ba.reverse(), "antisymmetry failed: {a:?} {b:?} {params:?}");
            }
        }
        // Transitivity via sort: a sorted list must be pairwise ordered.
        let mut sorted = strings.clone();
        sorted.sort_by(|a, b| collate(a, b, &table, &params));
        for w in sorted.windows(2) {
            assert_ne!(
                collate(&w[0], &w[1], &table, &params),
                Ordering::Greater,
                "sorted list out of order at {params:?}"
            );
        }
    }
}

#[test]
fn test_sort_keys_agree_with_direct_comparison() {
    let table = CollationTable::default_table();
    let mut rng = StdRng::seed_from_u64(0xC0_11A7F);
    let strings: Vec<String> = (0..40).map(|_| random_string(&mut rng, 6)).collect();

    for params in all_params() {
        for a in &strings {
            for b in &strings {
                let direct = collate(a, b, &table, &params);
                let ka = collation_sort_key(a, &table, &params);
                let kb = collation_sort_key(b, &table, &params);
                assert_eq!(direct, ka.cmp(&kb), "key mismatch: {a:?} {b:?} {params:?}");
                assert_eq!(
                    direct,
                    ka.to_bytes().cmp(&kb.to_bytes()),
                    "byte-key mismatch: {a:?} {b:?} {params:?}"
                );
            }
        }
    }
}

#[test]
fn test_raising_strength_only_refines_equalities() {
    let table = CollationTable::default_table();
    let mut rng = StdRng::seed_from_u64(0xC0_11A80);
    let strings: Vec<String> = (0..30).map(|_| random_string(&mut rng, 5)).collect();

    let ladder = [
        Strength::Primary,
        Strength::Secondary,
        Strength::Tertiary,
        Strength::Quaternary,
        Strength::Identical,
    ];
    for pair in ladder.windows(2) {
        let weak = CollateParams {
            strength: pair[0],
            weighting: VariableWeighting::Shifted,
            ..CollateParams::default()
        };
        let strong = CollateParams {
            strength: pair[1],
            weighting: VariableWeighting::Shifted,
            ..CollateParams::default()
        };
        for a in &strings {
            for b in &strings {
                // A difference visible at the weaker strength never flips or
                // vanishes at the stronger one.
                let w = collate(a, b, &table, &weak);
                if w != Ordering::Equal {
                    assert_eq!(w, collate(a, b, &table, &strong), "{a:?} {b:?} {pair:?}");
                }
            }
        }
    }
}

#[test]
fn test_identical_strength_distinguishes_all_inequivalent_strings() {
    let table = CollationTable::default_table();
    let params = CollateParams {
        strength: Strength::Identical,
        ..CollateParams::default()
    };
    // Unmapped symbols get implicit weights in code-point order, so even
    // adjacent emoji stay apart.
    assert_ne!(
        collate("a\u{1F600}", "a\u{1F601}", &table, &params),
        Ordering::Equal
    );
    // Canonical equivalents stay equal even at identical strength.
    assert_eq!(
        collate("e\u{301}", "\u{e9}", &table, &params),
        Ordering::Equal
    );
}

#[test]
fn test_shifted_variables_break_ties_at_quaternary() {
    let table = CollationTable::default_table();
    let shifted = |strength| CollateParams {
        strength,
        weighting: VariableWeighting::Shifted,
        ..CollateParams::default()
    };
    let words = ["deluge", "de-luge", "de luge"];
    for a in words {
        for b in words {
            assert_eq!(
                collate(a, b, &table, &shifted(Strength::Tertiary)),
                Ordering::Equal
            );
        }
    }
    // At quaternary the variable weights come back as a tie-break; a shifted
    // variable weight is always below the 0xFFFF carried by regular letters,
    // so the punctuated form sorts first.
    assert_eq!(
        collate("de-luge", "deluge", &table, &shifted(Strength::Quaternary)),
        Ordering::Less
    );
    assert_eq!(
        collate("de luge", "de-luge", &table, &shifted(Strength::Quaternary)),
        collate(" ", "-", &table, &shifted(Strength::Quaternary))
    );
}

#[test]
fn test_serialized_table_orders_identically() {
    let table = CollationTable::default_table();
    let mut buf = Vec::new();
    table.save_to(&mut buf).unwrap();
    let loaded = CollationTable::load_from(&mut buf.as_slice()).unwrap();

    let mut rng = StdRng::seed_from_u64(0xC0_11A81);
    let strings: Vec<String> = (0..30).map(|_| random_string(&mut rng, 6)).collect();
    for params in all_params() {
        for a in &strings {
            for b in &strings {
                assert_eq!(
                    collate(a, b, &table, &params),
                    collate(a, b, &loaded, &params)
                );
            }
        }
    }
}
