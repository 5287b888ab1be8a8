//! Table tailoring.
//!
//! A [`TailoringBuilder`] records reset/relation rules, option overrides,
//! script reorderings, and contraction suppressions, then builds a new
//! [`CollationTable`] from a base table. The base is re-expanded into its
//! ordered unit list, the rules splice units in and out of that list, and a
//! renumbering pass assigns fresh weights: a unit keeps its original weight
//! where the list order still allows it, otherwise it takes the smallest
//! weight above its predecessor and the bump cascades.
//!
//! Rule errors abort the build with a [`TailoringError`]; the diagnostic
//! callback receives a human-readable message for each problem on the way,
//! so a caller driving many rules can report them all at once.

use thiserror::Error;

use crate::element::{COMMON_L2, COMMON_L3, CollationElement, Strength};
use crate::table::{
    CaseFirst, CollateParams, CollationTable, L2Order, ReorderGroup, VariableWeighting,
    reorder_deltas_for,
};
use crate::trie::{Key, MAX_KEY_LEN};

/// The strength at which a relation separates its unit from the anchor.
///
/// Ordered strongest-first, so `min` of two strengths is the stronger
/// (coarser) difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RelationStrength {
    /// `<`: a primary difference.
    Primary,
    /// `<<`: a secondary difference.
    Secondary,
    /// `<<<`: a tertiary difference.
    Tertiary,
    /// `=`: equal at every level.
    Equal,
}

#[derive(Debug, Clone)]
enum Rule {
    Reset { key: Key, before: bool },
    Relation { strength: RelationStrength, key: Key },
}

/// Errors detected while applying tailoring rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TailoringError {
    /// A relation was given before any reset established an anchor.
    #[error("relation appears before any reset")]
    RelationBeforeReset,
    /// The reset target has no table mapping and is not a single code point
    /// (single code points fall back to implicit weights).
    #[error("reset target has no mapping and is not a single code point")]
    UnknownReset,
    /// A rule key is empty or longer than [`MAX_KEY_LEN`] code points.
    #[error("rule key length out of range 1..={MAX_KEY_LEN}")]
    OversizedKey,
    /// A reorder name does not match any group in the base table.
    #[error("unknown reorder group `{0}`")]
    UnknownReorderGroup(String),
}

/// One unit of the working list during tailoring.
#[derive(Debug, Clone)]
struct Unit {
    key: Key,
    elements: Vec<CollationElement>,
    /// Original base-table elements; `None` for rule-inserted units.
    orig: Option<Vec<CollationElement>>,
    /// Strength of the difference from the preceding unit.
    diff: RelationStrength,
    variable: bool,
    group: Option<usize>,
}

/// Builder for tailored collation tables.
///
/// ```rust
/// use uniweave_collate::{CollationTable, RelationStrength, TailoringBuilder};
///
/// let base = CollationTable::default_table();
/// let mut builder = TailoringBuilder::new();
/// builder
///     .reset("z")
///     .relation(RelationStrength::Primary, "\u{e6}"); // &z < æ
/// let tailored = builder.build(&base, |_| {}).unwrap();
/// let params = tailored.defaults();
/// assert!(tailored.collate("\u{e6}on", "zoo", &params).is_gt());
/// ```
#[derive(Debug, Default)]
pub struct TailoringBuilder {
    rules: Vec<Rule>,
    strength: Option<Strength>,
    weighting: Option<VariableWeighting>,
    l2_order: Option<L2Order>,
    case_level: Option<bool>,
    case_first: Option<CaseFirst>,
    reorder: Vec<String>,
    suppressions: Vec<u32>,
}

impl TailoringBuilder {
    /// An empty builder; building it against a base returns an equivalent
    /// table.
    pub fn new() -> TailoringBuilder {
        TailoringBuilder::default()
    }

    /// Move the insertion anchor to just after `target`'s unit.
    pub fn reset(&mut self, target: &str) -> &mut Self {
        self.rules.push(Rule::Reset {
            key: str_key(target),
            before: false,
        });
        self
    }

    /// Move the insertion anchor to just before `target`'s unit; the next
    /// relation sorts immediately before the target at the given strength.
    pub fn reset_before(&mut self, target: &str) -> &mut Self {
        self.rules.push(Rule::Reset {
            key: str_key(target),
            before: true,
        });
        self
    }

    /// Order `target` after the current anchor at `strength`, and make it
    /// the new anchor. Any previous mapping of `target` is removed first.
    pub fn relation(&mut self, strength: RelationStrength, target: &str) -> &mut Self {
        self.rules.push(Rule::Relation {
            strength,
            key: str_key(target),
        });
        self
    }

    /// Override the table's default strength.
    pub fn strength(&mut self, strength: Strength) -> &mut Self {
        self.strength = Some(strength);
        self
    }

    /// Override the table's default variable weighting.
    pub fn variable_weighting(&mut self, weighting: VariableWeighting) -> &mut Self {
        self.weighting = Some(weighting);
        self
    }

    /// Override the table's default secondary direction.
    pub fn l2_order(&mut self, order: L2Order) -> &mut Self {
        self.l2_order = Some(order);
        self
    }

    /// Override the table's default case-level setting.
    pub fn case_level(&mut self, on: bool) -> &mut Self {
        self.case_level = Some(on);
        self
    }

    /// Override the table's default case-first setting.
    pub fn case_first(&mut self, case_first: CaseFirst) -> &mut Self {
        self.case_first = Some(case_first);
        self
    }

    /// Reorder the named groups to the front of the primary space, in the
    /// given order; unnamed groups follow in their base order.
    pub fn reorder(&mut self, names: &[&str]) -> &mut Self {
        self.reorder.extend(names.iter().map(|n| n.to_string()));
        self
    }

    /// Drop every contraction starting with `starter` from the table.
    pub fn suppress_contractions(&mut self, starter: char) -> &mut Self {
        self.suppressions.push(starter as u32);
        self
    }

    /// Build a tailored table from `base`.
    ///
    /// `diagnostic` receives a message for each rule problem before the
    /// corresponding error is returned. Reorderings given here replace any
    /// the base carried.
    pub fn build(
        &self,
        base: &CollationTable,
        mut diagnostic: impl FnMut(&str),
    ) -> Result<CollationTable, TailoringError> {
        let mut units = expand(base);

        let mut cursor: Option<usize> = None;
        let mut pending_before = false;
        for rule in &self.rules {
            match rule {
                Rule::Reset { key, before } => {
                    if key.is_empty() || key.len() > MAX_KEY_LEN {
                        diagnostic("reset key length out of range");
                        return Err(TailoringError::OversizedKey);
                    }
                    let at = match units.iter().position(|u| u.key == *key) {
                        Some(i) => i,
                        None if key.len() == 1 => insert_implicit(&mut units, key.clone()),
                        None => {
                            diagnostic(&format!(
                                "reset target {:?} has no mapping",
                                key_display(key)
                            ));
                            return Err(TailoringError::UnknownReset);
                        }
                    };
                    cursor = Some(if *before { at } else { at + 1 });
                    pending_before = *before;
                }
                Rule::Relation { strength, key } => {
                    let Some(mut cur) = cursor else {
                        diagnostic("relation appears before any reset");
                        return Err(TailoringError::RelationBeforeReset);
                    };
                    if key.is_empty() || key.len() > MAX_KEY_LEN {
                        diagnostic("relation key length out of range");
                        return Err(TailoringError::OversizedKey);
                    }

                    // A retailored unit leaves its old slot; its difference
                    // folds into the unit that followed it.
                    if let Some(old) = units.iter().position(|u| u.key == *key) {
                        let old_diff = units[old].diff;
                        units.remove(old);
                        if old < units.len() {
                            units[old].diff = units[old].diff.min(old_diff);
                        }
                        if old < cur {
                            cur -= 1;
                        }
                    }

                    if pending_before {
                        // Step back over units closer to the target than the
                        // relation strength, so the insertion lands before
                        // the whole cluster.
                        while cur > 0 && units[cur].diff > *strength {
                            cur -= 1;
                        }
                        let template = units[cur].clone();
                        units.insert(
                            cur,
                            Unit {
                                key: key.clone(),
                                elements: template.elements.clone(),
                                orig: None,
                                diff: template.diff,
                                variable: template.variable,
                                group: template.group,
                            },
                        );
                        units[cur + 1].diff = *strength;
                        pending_before = false;
                    } else {
                        // Skip units that sit closer to the anchor than the
                        // relation strength; a primary relation must not
                        // split a case pair.
                        while cur < units.len() && units[cur].diff > *strength {
                            cur += 1;
                        }
                        // cur can reach 0 when the relation retargets the
                        // unit the reset pointed at; fall back to the
                        // successor as the weight template.
                        let template = units[cur.saturating_sub(1)].clone();
                        units.insert(
                            cur,
                            Unit {
                                key: key.clone(),
                                elements: template.elements.clone(),
                                orig: None,
                                diff: *strength,
                                variable: template.variable,
                                group: template.group,
                            },
                        );
                        if cur + 1 < units.len() {
                            units[cur + 1].diff = units[cur + 1].diff.min(*strength);
                        }
                    }
                    cursor = Some(cur + 1);
                }
            }
        }

        if !self.suppressions.is_empty() {
            let mut i = 0;
            while i < units.len() {
                if units[i].key.len() > 1 && self.suppressions.contains(&units[i].key[0]) {
                    let d = units[i].diff;
                    units.remove(i);
                    if i < units.len() {
                        units[i].diff = units[i].diff.min(d);
                    }
                } else {
                    i += 1;
                }
            }
        }

        let groups = base.reorder_groups();
        let (new_units, new_groups, variable_max) = renumber(units, groups);

        let reorder_deltas = if self.reorder.is_empty() {
            Vec::new()
        } else {
            let mut order: Vec<usize> = Vec::new();
            for name in &self.reorder {
                match new_groups.iter().position(|g| g.name == *name) {
                    Some(i) => {
                        if !order.contains(&i) {
                            order.push(i);
                        }
                    }
                    None => {
                        diagnostic(&format!("unknown reorder group `{name}`"));
                        return Err(TailoringError::UnknownReorderGroup(name.clone()));
                    }
                }
            }
            for i in 0..new_groups.len() {
                if !order.contains(&i) {
                    order.push(i);
                }
            }
            reorder_deltas_for(&new_groups, &order)
        };

        let base_defaults = base.defaults();
        let defaults = CollateParams {
            strength: self.strength.unwrap_or(base_defaults.strength),
            weighting: self.weighting.unwrap_or(base_defaults.weighting),
            l2_order: self.l2_order.unwrap_or(base_defaults.l2_order),
            case_level: self.case_level.unwrap_or(base_defaults.case_level),
            case_first: self.case_first.unwrap_or(base_defaults.case_first),
        };

        Ok(CollationTable::assemble(
            new_units,
            new_groups,
            reorder_deltas,
            variable_max,
            defaults,
        ))
    }
}

/// Rule keys live in NFD space, matching the normalization applied to
/// comparison input; `å` as a rule target becomes the two-code-point
/// contraction `a` + combining ring.
fn str_key(s: &str) -> Key {
    use unicode_normalization::UnicodeNormalization;
    s.chars().nfd().map(|c| c as u32).collect()
}

fn key_display(key: &Key) -> String {
    key.iter()
        .map(|&cp| char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Expand a table into the working unit list, with per-unit diffs.
fn expand(base: &CollationTable) -> Vec<Unit> {
    let mut units: Vec<Unit> = Vec::new();
    for (key, els) in base.units() {
        let diff = match units.last() {
            None => RelationStrength::Primary,
            Some(prev) => diff_strength(&prev.elements, &els),
        };
        let lead_l1 = els.first().map_or(0, |e| e.l1);
        units.push(Unit {
            key,
            variable: base.is_variable(lead_l1),
            group: base.group_of(lead_l1),
            diff,
            orig: Some(els.clone()),
            elements: els,
        });
    }
    units
}

/// Strength of the difference between two element sequences.
fn diff_strength(a: &[CollationElement], b: &[CollationElement]) -> RelationStrength {
    let ne = |f: fn(&CollationElement) -> u16| {
        a.iter().map(f).ne(b.iter().map(f))
    };
    if ne(|e| e.l1) {
        RelationStrength::Primary
    } else if ne(|e| e.l2) {
        RelationStrength::Secondary
    } else if ne(|e| e.l3) {
        RelationStrength::Tertiary
    } else {
        RelationStrength::Equal
    }
}

/// Insert a unit for an unmapped single code point, weighted implicitly,
/// keeping the list in element order. Returns its index.
fn insert_implicit(units: &mut Vec<Unit>, key: Key) -> usize {
    let els: Vec<CollationElement> = crate::element::implicit_elements(key[0]).to_vec();
    let pos = units
        .iter()
        .position(|u| seq_greater(&u.elements, &els))
        .unwrap_or(units.len());
    let diff = if pos == 0 {
        RelationStrength::Primary
    } else {
        diff_strength(&units[pos - 1].elements, &els)
    };
    units.insert(
        pos,
        Unit {
            key,
            elements: els.clone(),
            orig: Some(els),
            diff,
            variable: false,
            group: None,
        },
    );
    if pos + 1 < units.len() {
        let d = diff_strength(&units[pos].elements, &units[pos + 1].elements);
        units[pos + 1].diff = d;
    }
    pos
}

fn seq_greater(a: &[CollationElement], b: &[CollationElement]) -> bool {
    let tup = |e: &CollationElement| (e.l1, e.l2, e.l3);
    a.iter().map(tup).gt(b.iter().map(tup))
}

/// Assign fresh weights down the unit list.
///
/// Original weights survive wherever they still exceed the running
/// predecessor; otherwise the unit takes predecessor-plus-one at its diff
/// level and the bump cascades. Multi-element base units (implicit-weight
/// anchors) keep their weights verbatim. Group bounds and the variable
/// ceiling are recomputed from the assignment.
#[allow(clippy::type_complexity)]
fn renumber(
    units: Vec<Unit>,
    groups: &[ReorderGroup],
) -> (Vec<(Key, Vec<CollationElement>)>, Vec<ReorderGroup>, u16) {
    let mut prev: Option<CollationElement> = None;
    let mut out: Vec<(Key, Vec<CollationElement>)> = Vec::with_capacity(units.len());
    let mut bounds: Vec<Option<(u16, u16)>> = vec![None; groups.len()];
    let mut variable_max: u16 = 0;

    for unit in units {
        let mut els = unit.elements;
        let verbatim = unit.orig.is_some() && els.len() > 1;
        if !verbatim {
            let first = match prev {
                None => els.first().copied().unwrap_or(CollationElement::IGNORABLE),
                Some(p) => {
                    let orig = unit.orig.as_ref().map(|o| o[0]);
                    match unit.diff {
                        RelationStrength::Primary => {
                            let l1 = match orig {
                                Some(o) if o.l1 > p.l1 => o.l1,
                                _ => p.l1 + 1,
                            };
                            CollationElement::new(
                                l1,
                                orig.map_or(COMMON_L2, |o| o.l2),
                                orig.map_or(COMMON_L3, |o| o.l3),
                            )
                        }
                        RelationStrength::Secondary => {
                            let l2 = match orig {
                                Some(o) if o.l2 > p.l2 => o.l2,
                                _ => p.l2 + 1,
                            };
                            CollationElement::new(p.l1, l2, orig.map_or(COMMON_L3, |o| o.l3))
                        }
                        RelationStrength::Tertiary => {
                            let l3 = match orig {
                                Some(o) if o.l3 > p.l3 => o.l3,
                                _ => p.l3 + 1,
                            };
                            CollationElement::new(p.l1, p.l2, l3)
                        }
                        RelationStrength::Equal => CollationElement::new(p.l1, p.l2, p.l3),
                    }
                }
            };
            if els.is_empty() {
                els.push(first);
            } else {
                els[0] = first;
            }
        }

        let lead = els[0];
        prev = Some(lead);
        if unit.variable {
            variable_max = variable_max.max(lead.l1);
        }
        if let (Some(g), true) = (unit.group, lead.l1 != 0) {
            bounds[g] = Some(match bounds[g] {
                None => (lead.l1, lead.l1),
                Some((lo, hi)) => (lo.min(lead.l1), hi.max(lead.l1)),
            });
        }
        out.push((unit.key, els));
    }

    let new_groups = groups
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let (first_l1, last_l1) = bounds[i].unwrap_or((g.first_l1, g.last_l1));
            ReorderGroup {
                name: g.name.clone(),
                first_l1,
                last_l1,
                simple: g.simple,
                compressible: g.compressible,
            }
        })
        .collect();

    (out, new_groups, variable_max)
}
