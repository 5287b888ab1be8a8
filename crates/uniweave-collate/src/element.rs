//! Collation elements and implicit weights.
//!
//! A collation element is a 4-level weight tuple. Its *effective strength*
//! is the highest level carrying a nonzero weight: a primary difference
//! outranks a secondary one, and so on down to quaternary. Code points with
//! no table mapping derive implicit weights from their code point value
//! (UTS #10 §10.1.3), so every input has *some* weight and relative
//! code-point order survives as a last resort.

/// The coarsest level of difference that matters for a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Strength {
    /// Base letters only.
    Primary,
    /// Primary plus accents.
    Secondary,
    /// Primary, accents, and case/variants.
    #[default]
    Tertiary,
    /// Adds the quaternary level (shifted variables surface here).
    Quaternary,
    /// All levels, then code-point order of the NFD forms as a final
    /// tie-break, guaranteeing a total order.
    Identical,
}

/// Default secondary weight for units with no accent difference.
pub const COMMON_L2: u16 = 0x0020;
/// Default tertiary weight (lowercase / unmarked form).
pub const COMMON_L3: u16 = 0x0002;
/// Tertiary weight of an uppercase form.
pub const UPPER_L3: u16 = 0x0008;

/// A 4-level collation weight tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollationElement {
    /// Primary weight (base letter identity).
    pub l1: u16,
    /// Secondary weight (accents).
    pub l2: u16,
    /// Tertiary weight (case, variant forms).
    pub l3: u16,
    /// Quaternary weight; populated by shifted variable weighting.
    pub l4: u16,
}

impl CollationElement {
    /// An element ignorable at every level.
    pub const IGNORABLE: CollationElement = CollationElement {
        l1: 0,
        l2: 0,
        l3: 0,
        l4: 0,
    };

    /// Element with the given first three levels and an empty quaternary.
    pub const fn new(l1: u16, l2: u16, l3: u16) -> Self {
        Self { l1, l2, l3, l4: 0 }
    }

    /// The highest level with a nonzero weight, or `None` if the element is
    /// completely ignorable.
    pub fn effective_strength(&self) -> Option<Strength> {
        if self.l1 != 0 {
            Some(Strength::Primary)
        } else if self.l2 != 0 {
            Some(Strength::Secondary)
        } else if self.l3 != 0 {
            Some(Strength::Tertiary)
        } else if self.l4 != 0 {
            Some(Strength::Quaternary)
        } else {
            None
        }
    }
}

/// Lead primary for core Han unified ideographs.
const IMPLICIT_BASE_HAN_CORE: u16 = 0xFB40;
/// Lead primary for the Han extension blocks.
const IMPLICIT_BASE_HAN_OTHER: u16 = 0xFB80;
/// Lead primary for everything else without a mapping.
const IMPLICIT_BASE_UNASSIGNED: u16 = 0xFBC0;

/// Derive the implicit two-element weight sequence for an unmapped code
/// point (UTS #10 §10.1.3).
///
/// `AAAA = base + (cp >> 15)`, `BBBB = (cp & 0x7FFF) | 0x8000`; the second
/// element carries only the low primary so relative code-point order is
/// preserved exactly.
pub fn implicit_elements(cp: u32) -> [CollationElement; 2] {
    let base = if is_han_core(cp) {
        IMPLICIT_BASE_HAN_CORE
    } else if is_han_other(cp) {
        IMPLICIT_BASE_HAN_OTHER
    } else {
        IMPLICIT_BASE_UNASSIGNED
    };
    let aaaa = base + (cp >> 15) as u16;
    let bbbb = (cp & 0x7FFF) as u16 | 0x8000;
    [
        CollationElement::new(aaaa, COMMON_L2, COMMON_L3),
        CollationElement::new(bbbb, 0, 0),
    ]
}

/// Core Han unified ideographs: the base CJK block plus the twelve unified
/// ideographs that live in the compatibility block.
fn is_han_core(cp: u32) -> bool {
    (0x4E00..=0x9FFF).contains(&cp)
        || matches!(
            cp,
            0xFA0E | 0xFA0F
                | 0xFA11
                | 0xFA13
                | 0xFA14
                | 0xFA1F
                | 0xFA21
                | 0xFA23
                | 0xFA24
                | 0xFA27
                | 0xFA28
                | 0xFA29
        )
}

/// Han unified ideographs outside the core block (Extension A and the
/// supplementary-plane extensions).
fn is_han_other(cp: u32) -> bool {
    const RANGES: &[(u32, u32)] = &[
        (0x3400, 0x4DBF),
        (0x20000, 0x2A6DF),
        (0x2A700, 0x2B739),
        (0x2B740, 0x2B81D),
        (0x2B820, 0x2CEA1),
        (0x2CEB0, 0x2EBE0),
        (0x2EBF0, 0x2EE5D),
        (0x30000, 0x3134A),
        (0x31350, 0x323AF),
    ];
    RANGES.iter().any(|&(lo, hi)| (lo..=hi).contains(&cp))
}
