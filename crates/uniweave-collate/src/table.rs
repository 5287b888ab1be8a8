//! Collation tables.
//!
//! A [`CollationTable`] owns the shared collation-element vector, the
//! longest-match trie over it, the reorder groups, and the table's default
//! comparison options. Tables are immutable once constructed and safe to
//! share across threads; comparison functions borrow them, they are never
//! hidden global state.
//!
//! The element-derivation pipeline lives here too: trie longest match,
//! single-code-point lookup, implicit-weight fallback, then script
//! reordering, variable weighting, and case adjustment.

use std::io::{self, Read, Write};

use thiserror::Error;

use crate::element::{
    COMMON_L2, COMMON_L3, CollationElement, Strength, UPPER_L3, implicit_elements,
};
use crate::trie::{Key, MAX_KEY_LEN, Trie};

/// How variable code points (punctuation and symbols) weigh in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariableWeighting {
    /// Variables keep their weights and differ at the primary level.
    #[default]
    NonIgnorable,
    /// Variables are ignorable at levels 1-3; their primary weight moves to
    /// the quaternary level.
    Shifted,
}

/// Direction in which secondary weights are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum L2Order {
    /// Left to right.
    #[default]
    Forward,
    /// Right to left (French-style accent ordering).
    Backward,
}

/// Which case sorts first when case matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseFirst {
    /// Leave the table's tertiary order alone (lowercase first).
    #[default]
    Off,
    /// Uppercase forms sort before lowercase.
    Upper,
    /// Lowercase forms sort before uppercase.
    Lower,
}

/// Options controlling one comparison or sort-key extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollateParams {
    /// Coarsest level of difference that matters.
    pub strength: Strength,
    /// Variable weighting mode.
    pub weighting: VariableWeighting,
    /// Secondary comparison direction.
    pub l2_order: L2Order,
    /// Insert a dedicated case level between secondary and tertiary.
    pub case_level: bool,
    /// Case-first bias.
    pub case_first: CaseFirst,
}

/// A named script/category range of primary weights, used for reordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderGroup {
    /// Group name (script code or special group like `punct`).
    pub name: String,
    /// Lowest primary weight in the group.
    pub first_l1: u16,
    /// Highest primary weight in the group.
    pub last_l1: u16,
    /// Contiguous single-range group, remappable by plain offset arithmetic.
    pub simple: bool,
    /// Sparse weight range that may be collapsed when remapped.
    pub compressible: bool,
}

/// One trie key together with its range into the shared element vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Mapping {
    pub(crate) key: Key,
    pub(crate) elements: (u32, u32),
}

/// Lowest primary weight handed out by the built-in table.
pub(crate) const PRIMARY_BASE: u16 = 0x0200;
/// Lowest secondary weight used for combining marks (above [`COMMON_L2`]).
const MARK_L2_BASE: u16 = 0x0024;

/// An immutable collation table: elements, trie, reorder groups, defaults.
#[derive(Debug, Clone)]
pub struct CollationTable {
    elements: Vec<CollationElement>,
    /// Kept in weight order; this is the logical unit list that tailoring
    /// re-expands.
    mappings: Vec<Mapping>,
    trie: Trie,
    reorder_groups: Vec<ReorderGroup>,
    /// `(first_l1, last_l1, delta)` remaps applied to primaries at lookup.
    reorder_deltas: Vec<(u16, u16, i32)>,
    variable_max_l1: u16,
    defaults: CollateParams,
}

impl CollationTable {
    /// The built-in root table.
    ///
    /// A deterministic table covering space/punctuation (variable), digits,
    /// Latin and Greek letters with case pairs, a handful of combining
    /// marks, and the `ch` digraph as a contraction exercise. Everything
    /// else falls back to implicit weights, so every code point still gets a
    /// total order.
    pub fn default_table() -> CollationTable {
        let mut units: Vec<(Key, Vec<CollationElement>)> = Vec::new();
        let key1 = |cp: char| -> Key {
            let mut k = Key::new();
            k.push(cp as u32);
            k
        };
        let key_str = |s: &str| -> Key { s.chars().map(|c| c as u32).collect() };

        // Primary-ignorable combining marks, distinct at the secondary level.
        const MARKS: &[char] = &[
            '\u{0300}', '\u{0301}', '\u{0302}', '\u{0303}', '\u{0308}', '\u{030A}', '\u{0327}',
        ];
        for (i, &mark) in MARKS.iter().enumerate() {
            units.push((
                key1(mark),
                vec![CollationElement::new(0, MARK_L2_BASE + i as u16, COMMON_L3)],
            ));
        }

        let mut l1 = PRIMARY_BASE;
        let mut groups: Vec<ReorderGroup> = Vec::new();

        // Variable space/punctuation.
        const PUNCT: &[char] = &[
            ' ', '_', '-', ',', ';', ':', '!', '?', '.', '\'', '"', '(', ')', '[', ']', '{', '}',
            '/', '\\', '&', '#', '%', '\u{2010}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}',
        ];
        let punct_first = l1;
        for &p in PUNCT {
            units.push((key1(p), vec![CollationElement::new(l1, COMMON_L2, COMMON_L3)]));
            l1 += 1;
        }
        let variable_max_l1 = l1 - 1;
        groups.push(ReorderGroup {
            name: "punct".to_string(),
            first_l1: punct_first,
            last_l1: variable_max_l1,
            simple: true,
            compressible: true,
        });

        // Digits.
        let digit_first = l1;
        for d in '0'..='9' {
            units.push((key1(d), vec![CollationElement::new(l1, COMMON_L2, COMMON_L3)]));
            l1 += 1;
        }
        groups.push(ReorderGroup {
            name: "digit".to_string(),
            first_l1: digit_first,
            last_l1: l1 - 1,
            simple: true,
            compressible: false,
        });

        // Latin, with case pairs sharing l1/l2 and differing at l3, plus the
        // `ch` digraph sorted between `c` and `d` as its own primary.
        let latin_first = l1;
        for lower in 'a'..='z' {
            let upper = lower.to_ascii_uppercase();
            units.push((key1(lower), vec![CollationElement::new(l1, COMMON_L2, COMMON_L3)]));
            units.push((key1(upper), vec![CollationElement::new(l1, COMMON_L2, UPPER_L3)]));
            l1 += 1;
            if lower == 'c' {
                units.push((key_str("ch"), vec![CollationElement::new(l1, COMMON_L2, COMMON_L3)]));
                units.push((key_str("CH"), vec![CollationElement::new(l1, COMMON_L2, UPPER_L3)]));
                l1 += 1;
            }
        }
        groups.push(ReorderGroup {
            name: "Latn".to_string(),
            first_l1: latin_first,
            last_l1: l1 - 1,
            simple: true,
            compressible: false,
        });

        // Greek, lowercase alpha..omega (skipping final sigma) with their
        // uppercase pairs 0x20 below.
        let greek_first = l1;
        for cp in 0x03B1u32..=0x03C9 {
            if cp == 0x03C2 {
                continue;
            }
            let lower = char::from_u32(cp).expect("valid Greek code point");
            let upper = char::from_u32(cp - 0x20).expect("valid Greek code point");
            units.push((key1(lower), vec![CollationElement::new(l1, COMMON_L2, COMMON_L3)]));
            units.push((key1(upper), vec![CollationElement::new(l1, COMMON_L2, UPPER_L3)]));
            l1 += 1;
        }
        groups.push(ReorderGroup {
            name: "Grek".to_string(),
            first_l1: greek_first,
            last_l1: l1 - 1,
            simple: true,
            compressible: false,
        });

        Self::assemble(
            units,
            groups,
            Vec::new(),
            variable_max_l1,
            CollateParams::default(),
        )
    }

    /// Build a table from an ordered unit list (weight order).
    pub(crate) fn assemble(
        units: Vec<(Key, Vec<CollationElement>)>,
        reorder_groups: Vec<ReorderGroup>,
        reorder_deltas: Vec<(u16, u16, i32)>,
        variable_max_l1: u16,
        defaults: CollateParams,
    ) -> CollationTable {
        let mut elements = Vec::new();
        let mut mappings = Vec::with_capacity(units.len());
        for (key, els) in units {
            let first = elements.len() as u32;
            elements.extend(els);
            mappings.push(Mapping {
                key,
                elements: (first, elements.len() as u32),
            });
        }
        let trie = Trie::build(mappings.iter().map(|m| (m.key.clone(), m.elements)));
        CollationTable {
            elements,
            mappings,
            trie,
            reorder_groups,
            reorder_deltas,
            variable_max_l1,
            defaults,
        }
    }

    /// Re-expand the table into its ordered unit list.
    pub(crate) fn units(&self) -> Vec<(Key, Vec<CollationElement>)> {
        self.mappings
            .iter()
            .map(|m| {
                (
                    m.key.clone(),
                    self.elements[m.elements.0 as usize..m.elements.1 as usize].to_vec(),
                )
            })
            .collect()
    }

    /// The table's default comparison options.
    pub fn defaults(&self) -> CollateParams {
        self.defaults
    }

    /// The table's reorder groups.
    pub fn reorder_groups(&self) -> &[ReorderGroup] {
        &self.reorder_groups
    }

    pub(crate) fn is_variable(&self, l1: u16) -> bool {
        l1 != 0 && l1 <= self.variable_max_l1
    }

    pub(crate) fn group_of(&self, l1: u16) -> Option<usize> {
        self.reorder_groups
            .iter()
            .position(|g| (g.first_l1..=g.last_l1).contains(&l1))
    }

    fn reordered(&self, l1: u16) -> u16 {
        for &(first, last, delta) in &self.reorder_deltas {
            if (first..=last).contains(&l1) {
                return (l1 as i32 + delta) as u16;
            }
        }
        l1
    }

    /// Collation elements for a code-point sequence, fully weighted.
    pub fn collation_elements<I>(&self, cps: I, params: &CollateParams) -> Vec<CollationElement>
    where
        I: IntoIterator<Item = char>,
    {
        let mut out = Vec::new();
        self.copy_collation_elements(cps, &mut out, params);
        out
    }

    /// Append the fully-weighted collation elements for `cps` to `out`.
    ///
    /// Per input unit: greedy-longest trie match (contractions beat their
    /// prefixes), falling back to implicit weights when the starter has no
    /// entry. The raw elements then pass through script reordering, variable
    /// weighting (with the after-variable rule), and case-first adjustment.
    /// Levels above `params.strength` are left intact and selected by the
    /// comparison layer, never computed incorrectly.
    pub fn copy_collation_elements<I>(
        &self,
        cps: I,
        out: &mut Vec<CollationElement>,
        params: &CollateParams,
    ) where
        I: IntoIterator<Item = char>,
    {
        let cps: Vec<u32> = cps.into_iter().map(|c| c as u32).collect();
        let mut raw: Vec<CollationElement> = Vec::with_capacity(cps.len());
        // Variability is decided on table weights, before any reordering.
        let mut variable: Vec<bool> = Vec::with_capacity(cps.len());

        let mut i = 0;
        while i < cps.len() {
            let mut matched = None;
            if let Some(mut m) = self.trie.match_first(cps[i]) {
                let mut j = i + 1;
                while j < cps.len() {
                    match self.trie.extend(&m, cps[j]) {
                        Some(next) => {
                            m = next;
                            j += 1;
                        }
                        None => break,
                    }
                }
                if m.match_len > 0 {
                    matched = Some(m);
                }
            }
            match matched {
                Some(m) => {
                    let (first, last) = m.elements.expect("terminal match carries elements");
                    for el in &self.elements[first as usize..last as usize] {
                        variable.push(self.is_variable(el.l1));
                        raw.push(*el);
                    }
                    i += m.match_len;
                }
                None => {
                    for el in implicit_elements(cps[i]) {
                        variable.push(false);
                        raw.push(el);
                    }
                    i += 1;
                }
            }
        }

        if !self.reorder_deltas.is_empty() {
            for el in &mut raw {
                if el.l1 != 0 {
                    el.l1 = self.reordered(el.l1);
                }
            }
        }

        match params.weighting {
            VariableWeighting::NonIgnorable => {
                for el in &mut raw {
                    el.l4 = 0;
                }
            }
            VariableWeighting::Shifted => {
                let mut after_variable = false;
                for (el, &is_var) in raw.iter_mut().zip(&variable) {
                    if is_var {
                        el.l4 = el.l1;
                        el.l1 = 0;
                        el.l2 = 0;
                        el.l3 = 0;
                        after_variable = true;
                    } else if el.l1 == 0 && el.l2 == 0 && el.l3 == 0 {
                        el.l4 = 0;
                    } else if el.l1 == 0 && after_variable {
                        *el = CollationElement::IGNORABLE;
                    } else {
                        el.l4 = 0xFFFF;
                        after_variable = false;
                    }
                }
            }
        }

        if params.case_first == CaseFirst::Upper {
            for el in &mut raw {
                el.l3 = match el.l3 {
                    COMMON_L3 => UPPER_L3,
                    UPPER_L3 => COMMON_L3,
                    other => other,
                };
            }
        }

        out.extend(raw);
    }
}

/// Serialized-table format version; unrecognized versions are rejected.
pub const TABLE_VERSION: u32 = 1;
const TABLE_MAGIC: [u8; 4] = *b"UWCT";

/// Errors from loading or saving a serialized table.
#[derive(Debug, Error)]
pub enum TableError {
    /// Reading or writing the underlying stream failed (truncation included).
    #[error("unable to read or write table: {0}")]
    Io(#[from] io::Error),
    /// The stream does not start with the table magic.
    #[error("not a collation table (bad magic)")]
    BadMagic,
    /// The version field is not one this build understands.
    #[error("unknown table version {found} (supported: {TABLE_VERSION})")]
    UnknownVersion {
        /// The version found in the header.
        found: u32,
    },
    /// Structurally invalid content.
    #[error("corrupt table: {0}")]
    Corrupt(&'static str),
}

impl CollationTable {
    /// Serialize the table: a versioned header followed by fixed-width
    /// little-endian records for elements, reorder groups, and trie keys.
    pub fn save_to<W: Write>(&self, w: &mut W) -> Result<(), TableError> {
        w.write_all(&TABLE_MAGIC)?;
        write_u32(w, TABLE_VERSION)?;
        w.write_all(&[
            strength_code(self.defaults.strength),
            match self.defaults.weighting {
                VariableWeighting::NonIgnorable => 0,
                VariableWeighting::Shifted => 1,
            },
            match self.defaults.l2_order {
                L2Order::Forward => 0,
                L2Order::Backward => 1,
            },
            u8::from(self.defaults.case_level),
            match self.defaults.case_first {
                CaseFirst::Off => 0,
                CaseFirst::Upper => 1,
                CaseFirst::Lower => 2,
            },
        ])?;
        write_u16(w, self.variable_max_l1)?;

        write_u32(w, self.elements.len() as u32)?;
        for el in &self.elements {
            write_u16(w, el.l1)?;
            write_u16(w, el.l2)?;
            write_u16(w, el.l3)?;
            write_u16(w, el.l4)?;
        }

        write_u32(w, self.reorder_groups.len() as u32)?;
        for g in &self.reorder_groups {
            write_u16(w, g.name.len() as u16)?;
            w.write_all(g.name.as_bytes())?;
            write_u16(w, g.first_l1)?;
            write_u16(w, g.last_l1)?;
            w.write_all(&[u8::from(g.simple), u8::from(g.compressible)])?;
        }

        write_u32(w, self.reorder_deltas.len() as u32)?;
        for &(first, last, delta) in &self.reorder_deltas {
            write_u16(w, first)?;
            write_u16(w, last)?;
            write_i32(w, delta)?;
        }

        write_u32(w, self.mappings.len() as u32)?;
        for m in &self.mappings {
            write_u16(w, m.key.len() as u16)?;
            for &cp in &m.key {
                write_u32(w, cp)?;
            }
            write_u32(w, m.elements.0)?;
            write_u32(w, m.elements.1)?;
        }
        Ok(())
    }

    /// Load a table serialized by [`save_to`](CollationTable::save_to).
    ///
    /// Rejects bad magic, unknown versions, and structurally invalid
    /// content; a truncated stream fails outright rather than producing a
    /// partially-populated table.
    pub fn load_from<R: Read>(r: &mut R) -> Result<CollationTable, TableError> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if magic != TABLE_MAGIC {
            return Err(TableError::BadMagic);
        }
        let version = read_u32(r)?;
        if version != TABLE_VERSION {
            return Err(TableError::UnknownVersion { found: version });
        }

        let mut opts = [0u8; 5];
        r.read_exact(&mut opts)?;
        let defaults = CollateParams {
            strength: strength_from_code(opts[0])?,
            weighting: match opts[1] {
                0 => VariableWeighting::NonIgnorable,
                1 => VariableWeighting::Shifted,
                _ => return Err(TableError::Corrupt("invalid weighting flag")),
            },
            l2_order: match opts[2] {
                0 => L2Order::Forward,
                1 => L2Order::Backward,
                _ => return Err(TableError::Corrupt("invalid l2-order flag")),
            },
            case_level: match opts[3] {
                0 => false,
                1 => true,
                _ => return Err(TableError::Corrupt("invalid case-level flag")),
            },
            case_first: match opts[4] {
                0 => CaseFirst::Off,
                1 => CaseFirst::Upper,
                2 => CaseFirst::Lower,
                _ => return Err(TableError::Corrupt("invalid case-first flag")),
            },
        };
        let variable_max_l1 = read_u16(r)?;

        let element_count = read_u32(r)? as usize;
        let mut elements = Vec::with_capacity(element_count.min(1 << 20));
        for _ in 0..element_count {
            elements.push(CollationElement {
                l1: read_u16(r)?,
                l2: read_u16(r)?,
                l3: read_u16(r)?,
                l4: read_u16(r)?,
            });
        }

        let group_count = read_u32(r)? as usize;
        let mut reorder_groups = Vec::with_capacity(group_count.min(1 << 10));
        for _ in 0..group_count {
            let name_len = read_u16(r)? as usize;
            let mut name = vec![0u8; name_len];
            r.read_exact(&mut name)?;
            let name =
                String::from_utf8(name).map_err(|_| TableError::Corrupt("group name not UTF-8"))?;
            let first_l1 = read_u16(r)?;
            let last_l1 = read_u16(r)?;
            let mut flags = [0u8; 2];
            r.read_exact(&mut flags)?;
            reorder_groups.push(ReorderGroup {
                name,
                first_l1,
                last_l1,
                simple: flags[0] != 0,
                compressible: flags[1] != 0,
            });
        }

        let delta_count = read_u32(r)? as usize;
        let mut reorder_deltas = Vec::with_capacity(delta_count.min(1 << 10));
        for _ in 0..delta_count {
            let first = read_u16(r)?;
            let last = read_u16(r)?;
            let delta = read_i32(r)?;
            reorder_deltas.push((first, last, delta));
        }

        let mapping_count = read_u32(r)? as usize;
        let mut units = Vec::with_capacity(mapping_count.min(1 << 20));
        for _ in 0..mapping_count {
            let key_len = read_u16(r)? as usize;
            if key_len == 0 || key_len > MAX_KEY_LEN {
                return Err(TableError::Corrupt("trie key length out of range"));
            }
            let mut key = Key::new();
            for _ in 0..key_len {
                key.push(read_u32(r)?);
            }
            let first = read_u32(r)? as usize;
            let last = read_u32(r)? as usize;
            if first > last || last > elements.len() {
                return Err(TableError::Corrupt("element range out of bounds"));
            }
            units.push((key, elements[first..last].to_vec()));
        }

        Ok(Self::assemble(
            units,
            reorder_groups,
            reorder_deltas,
            variable_max_l1,
            defaults,
        ))
    }
}

fn strength_code(s: Strength) -> u8 {
    match s {
        Strength::Primary => 0,
        Strength::Secondary => 1,
        Strength::Tertiary => 2,
        Strength::Quaternary => 3,
        Strength::Identical => 4,
    }
}

fn strength_from_code(code: u8) -> Result<Strength, TableError> {
    Ok(match code {
        0 => Strength::Primary,
        1 => Strength::Secondary,
        2 => Strength::Tertiary,
        3 => Strength::Quaternary,
        4 => Strength::Identical,
        _ => return Err(TableError::Corrupt("invalid strength flag")),
    })
}

fn write_u16<W: Write>(w: &mut W, v: u16) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

fn write_u32<W: Write>(w: &mut W, v: u32) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

fn write_i32<W: Write>(w: &mut W, v: i32) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

fn read_u16<R: Read>(r: &mut R) -> io::Result<u16> {
    let mut b = [0u8; 2];
    r.read_exact(&mut b)?;
    Ok(u16::from_le_bytes(b))
}

fn read_u32<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b)?;
    Ok(u32::from_le_bytes(b))
}

fn read_i32<R: Read>(r: &mut R) -> io::Result<i32> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b)?;
    Ok(i32::from_le_bytes(b))
}

/// Build a reorder-delta set placing `order`ed groups first, spans intact.
pub(crate) fn reorder_deltas_for(
    groups: &[ReorderGroup],
    order: &[usize],
) -> Vec<(u16, u16, i32)> {
    let mut deltas = Vec::new();
    let mut cursor = groups.iter().map(|g| g.first_l1).min().unwrap_or(0);
    for &gi in order {
        let g = &groups[gi];
        let delta = cursor as i32 - g.first_l1 as i32;
        if delta != 0 {
            deltas.push((g.first_l1, g.last_l1, delta));
        }
        cursor += g.last_l1 - g.first_l1 + 1;
    }
    deltas
}
