use super::error::Error;
use crate::model::permutation::Permutation;
use crate::model::residue::is_protein;
use crate::model::selection::Selection;
use crate::model::table::{Assignment, AtomTable};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A protein chain end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Terminus {
    N,
    C,
}

impl Terminus {
    pub const BOTH: [Terminus; 2] = [Terminus::N, Terminus::C];

    /// Atom names that can be turned into the cap anchor. The XPLOR spellings
    /// `HT1..3` and `OT1` are accepted next to the PDB ones.
    pub fn replaceable_names(self) -> &'static [&'static str] {
        match self {
            Terminus::N => &["H1", "H2", "H3", "HT1", "HT2", "HT3"],
            Terminus::C => &["OXT", "OT1"],
        }
    }

    /// The only cap residue supported at this terminus.
    pub fn cap_residue(self) -> &'static str {
        match self {
            Terminus::N => "ACE",
            Terminus::C => "NME",
        }
    }

    /// Name the converted atom takes inside the cap residue.
    pub fn anchor_atom(self) -> &'static str {
        match self {
            Terminus::N => "C",
            Terminus::C => "N",
        }
    }

    fn residue_offset(self) -> i32 {
        match self {
            Terminus::N => -1,
            Terminus::C => 1,
        }
    }
}

impl fmt::Display for Terminus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminus::N => f.write_str("N-terminal"),
            Terminus::C => f.write_str("C-terminal"),
        }
    }
}

/// Requested caps for the two ends of one segment; `None` means no cap.
///
/// Serialized as a two-element array of strings where `""` stands for no cap,
/// e.g. `["ACE", "NME"]` or `["", "NME"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[String; 2]", into = "[String; 2]")]
pub struct CapPair {
    pub n: Option<String>,
    pub c: Option<String>,
}

impl CapPair {
    pub fn new(n: Option<&str>, c: Option<&str>) -> Self {
        Self {
            n: n.filter(|s| !s.is_empty()).map(str::to_string),
            c: c.filter(|s| !s.is_empty()).map(str::to_string),
        }
    }

    /// `ACE` at the N-terminus and `NME` at the C-terminus.
    pub fn standard() -> Self {
        Self::new(
            Some(Terminus::N.cap_residue()),
            Some(Terminus::C.cap_residue()),
        )
    }

    pub fn get(&self, terminus: Terminus) -> Option<&str> {
        match terminus {
            Terminus::N => self.n.as_deref(),
            Terminus::C => self.c.as_deref(),
        }
    }
}

impl From<[String; 2]> for CapPair {
    fn from([n, c]: [String; 2]) -> Self {
        Self::new(Some(n.trim()), Some(c.trim()))
    }
}

impl From<CapPair> for [String; 2] {
    fn from(pair: CapPair) -> Self {
        [pair.n.unwrap_or_default(), pair.c.unwrap_or_default()]
    }
}

/// Cap requests keyed by segment id. Segments without an entry are left
/// uncapped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapSpec(BTreeMap<String, CapPair>);

impl CapSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard `ACE`/`NME` caps on every segment that contains protein.
    pub fn default_for<T: AtomTable + ?Sized>(structure: &T) -> Self {
        let mut spec = Self::new();
        for i in 0..structure.atom_count() {
            let atom = structure.atom(i);
            if is_protein(atom.residue_name) && !spec.0.contains_key(atom.segment_id) {
                spec.insert(atom.segment_id, CapPair::standard());
            }
        }
        spec
    }

    pub fn insert(&mut self, segment_id: impl Into<String>, pair: CapPair) {
        self.0.insert(segment_id.into(), pair);
    }

    pub fn get(&self, segment_id: &str) -> Option<&CapPair> {
        self.0.get(segment_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CapPair)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, CapPair)> for CapSpec {
    fn from_iter<I: IntoIterator<Item = (String, CapPair)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No cap was requested for the terminus.
    Omitted,
    /// The terminal residue already carries the cap.
    AlreadyApplied,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Omitted => f.write_str("no cap requested"),
            SkipReason::AlreadyApplied => f.write_str("already capped"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedCap {
    pub segment_id: String,
    pub terminus: Terminus,
    pub cap: String,
    /// Residue id given to the cap.
    pub residue_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCap {
    pub segment_id: String,
    pub terminus: Terminus,
    pub residue_id: i32,
    pub reason: SkipReason,
}

/// Outcome of [`apply_caps`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapReport {
    pub applied: Vec<AppliedCap>,
    pub skipped: Vec<SkippedCap>,
    /// Leftover terminal hydrogens removed after N-capping.
    pub removed_atoms: usize,
}

/// What capping will do to one segment, decided before anything is edited.
struct SegmentPlan<'a> {
    segment_id: &'a str,
    first_residue: i32,
    last_residue: i32,
    caps: Vec<(Terminus, &'a str)>,
}

impl SegmentPlan<'_> {
    fn terminal_residue(&self, terminus: Terminus) -> i32 {
        match terminus {
            Terminus::N => self.first_residue,
            Terminus::C => self.last_residue,
        }
    }
}

/// Caps the protein termini named in `spec`, editing `structure` in place.
///
/// For every requested terminus the lowest-index replaceable atom of the
/// terminal residue becomes the cap anchor (`ACE C` one residue before the
/// chain, `NME N` one residue after it) and is swapped to the first or last
/// position of its segment. Once an N-terminal cap is placed, the remaining
/// replaceable hydrogens of the old terminal residue are removed, so the
/// atom count never grows.
///
/// Missing segments, non-protein segments, unsupported cap names and
/// termini without a replaceable atom are all detected before the first
/// edit. Omitted and already applied caps are skipped with a warning, which
/// makes a repeated call a no-op.
pub fn apply_caps<T: AtomTable + ?Sized>(
    structure: &mut T,
    spec: &CapSpec,
) -> Result<CapReport, Error> {
    let mut report = CapReport::default();
    let mut plans = Vec::with_capacity(spec.len());

    for (segment_id, pair) in spec.iter() {
        plans.push(plan_segment(&*structure, segment_id, pair, &mut report)?);
    }

    for plan in &plans {
        apply_segment(structure, plan, &mut report)?;
    }

    Ok(report)
}

fn plan_segment<'a, T: AtomTable + ?Sized>(
    structure: &T,
    segment_id: &'a str,
    pair: &'a CapPair,
    report: &mut CapReport,
) -> Result<SegmentPlan<'a>, Error> {
    let members = structure.select(&Selection::segment(segment_id));
    if members.is_empty() {
        return Err(Error::MissingSegment {
            segment_id: segment_id.to_string(),
        });
    }
    let protein = Selection::Protein.and(Selection::segment(segment_id));
    if structure.select(&protein).is_empty() {
        return Err(Error::NonProteinSegment {
            segment_id: segment_id.to_string(),
        });
    }

    let (first_residue, last_residue) = members
        .iter()
        .map(|&i| structure.atom(i).residue_id)
        .fold((i32::MAX, i32::MIN), |(lo, hi), r| (lo.min(r), hi.max(r)));

    let mut plan = SegmentPlan {
        segment_id,
        first_residue,
        last_residue,
        caps: Vec::new(),
    };

    for terminus in Terminus::BOTH {
        let residue_id = plan.terminal_residue(terminus);
        let skip = |reason| SkippedCap {
            segment_id: segment_id.to_string(),
            terminus,
            residue_id,
            reason,
        };

        let Some(cap) = pair.get(terminus) else {
            warn!(
                "No {terminus} cap requested for residue {residue_id} of segment '{segment_id}'; not capping it"
            );
            report.skipped.push(skip(SkipReason::Omitted));
            continue;
        };
        if cap != terminus.cap_residue() {
            return Err(Error::UnsupportedCap {
                segment_id: segment_id.to_string(),
                terminus,
                cap: cap.to_string(),
                supported: terminus.cap_residue(),
            });
        }

        let residue = Selection::segment(segment_id).and(Selection::residue_id(residue_id));
        let existing = residue.clone().and(Selection::residue_name(cap));
        if !structure.select(&existing).is_empty() {
            warn!("Cap {cap} already exists on segment '{segment_id}'; not re-applying it");
            report.skipped.push(skip(SkipReason::AlreadyApplied));
            continue;
        }

        let replaceable =
            residue.and(Selection::names(terminus.replaceable_names().iter().copied()));
        if structure.select(&replaceable).is_empty() {
            return Err(Error::MissingTerminalAtom {
                segment_id: segment_id.to_string(),
                residue_id,
                terminus,
                candidates: terminus.replaceable_names().join(" "),
            });
        }

        plan.caps.push((terminus, cap));
    }

    Ok(plan)
}

fn apply_segment<T: AtomTable + ?Sized>(
    structure: &mut T,
    plan: &SegmentPlan<'_>,
    report: &mut CapReport,
) -> Result<(), Error> {
    let segment_id = plan.segment_id;
    let residue_atoms = |terminus: Terminus| {
        Selection::segment(segment_id)
            .and(Selection::residue_id(plan.terminal_residue(terminus)))
            .and(Selection::names(terminus.replaceable_names().iter().copied()))
    };

    let mut n_capped = false;
    for &(terminus, cap) in &plan.caps {
        let members = structure.select(&Selection::segment(segment_id));
        let candidates = structure.select(&residue_atoms(terminus));
        let (Some(&anchor), Some(&first), Some(&last)) =
            (candidates.first(), members.first(), members.last())
        else {
            return Err(Error::MissingTerminalAtom {
                segment_id: segment_id.to_string(),
                residue_id: plan.terminal_residue(terminus),
                terminus,
                candidates: terminus.replaceable_names().join(" "),
            });
        };

        let residue_id = plan.terminal_residue(terminus) + terminus.residue_offset();
        structure.assign(&[anchor], &Assignment::ResidueName(cap.to_string()));
        structure.assign(&[anchor], &Assignment::Name(terminus.anchor_atom().to_string()));
        structure.assign(&[anchor], &Assignment::ResidueId(residue_id));

        let target = match terminus {
            Terminus::N => first,
            Terminus::C => last,
        };
        structure.reorder(&Permutation::swap(structure.atom_count(), anchor, target))?;
        debug!("Moved {terminus} cap atom of segment '{segment_id}' from {anchor} to {target}");

        info!("Applied {terminus} cap {cap} to segment '{segment_id}' as residue {residue_id}");
        report.applied.push(AppliedCap {
            segment_id: segment_id.to_string(),
            terminus,
            cap: cap.to_string(),
            residue_id,
        });
        n_capped |= terminus == Terminus::N;
    }

    if n_capped {
        let leftovers = structure.select(&residue_atoms(Terminus::N));
        if !leftovers.is_empty() {
            debug!(
                "Removing {} leftover N-terminal hydrogens from segment '{segment_id}'",
                leftovers.len()
            );
            structure.remove(&leftovers);
            report.removed_atoms += leftovers.len();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::structure::{AtomRecord, Structure};

    fn single_residue() -> Structure {
        let mut s = Structure::new();
        for name in ["H1", "CA", "OXT"] {
            s.push(AtomRecord::new(name, "ALA", 7, "P"));
        }
        s
    }

    fn dipeptide() -> Structure {
        let mut s = Structure::new();
        for name in ["N", "H1", "H2", "H3", "CA", "C", "O"] {
            s.push(AtomRecord::new(name, "ALA", 1, "P").beta(1.0));
        }
        for name in ["N", "CA", "C", "OXT", "O"] {
            s.push(AtomRecord::new(name, "GLY", 2, "P").beta(2.0));
        }
        s.push(AtomRecord::new("OH2", "TIP3", 1, "W"));
        s
    }

    fn spec(segment: &str, pair: CapPair) -> CapSpec {
        let mut spec = CapSpec::new();
        spec.insert(segment, pair);
        spec
    }

    #[test]
    fn caps_a_single_residue_segment() {
        let mut s = single_residue();
        let report = apply_caps(&mut s, &spec("P", CapPair::standard())).unwrap();

        assert_eq!(s.atom_count(), 3);
        assert_eq!(s.names, vec!["C", "CA", "N"]);
        assert_eq!(s.residue_names, vec!["ACE", "ALA", "NME"]);
        assert_eq!(s.residue_ids, vec![6, 7, 8]);
        assert_eq!(report.applied.len(), 2);
        assert_eq!(report.removed_atoms, 0);
    }

    #[test]
    fn caps_move_to_chain_ends_and_drop_leftover_hydrogens() {
        let mut s = dipeptide();
        let report = apply_caps(&mut s, &spec("P", CapPair::standard())).unwrap();

        assert_eq!(report.removed_atoms, 2);
        assert_eq!(s.atom_count(), 11);

        assert_eq!((s.names[0].as_str(), s.residue_names[0].as_str()), ("C", "ACE"));
        assert_eq!(s.residue_ids[0], 0);
        assert_eq!(s.names[1], "N");
        assert!(!s.names.iter().any(|n| n == "H2" || n == "H3"));

        let last = 9;
        assert_eq!((s.names[last].as_str(), s.residue_names[last].as_str()), ("N", "NME"));
        assert_eq!(s.residue_ids[last], 3);
        assert_eq!(s.names[last - 1], "O");
        // the swapped-out O kept its own labels
        assert_eq!(s.betas[last - 1], 2.0);

        assert_eq!(s.segment_ids[10], "W");
    }

    #[test]
    fn capping_twice_is_a_no_op() {
        let mut s = dipeptide();
        let caps = spec("P", CapPair::standard());
        apply_caps(&mut s, &caps).unwrap();
        let once = s.clone();

        let report = apply_caps(&mut s, &caps).unwrap();
        assert_eq!(s, once);
        assert!(report.applied.is_empty());
        assert_eq!(report.skipped.len(), 2);
        assert!(report
            .skipped
            .iter()
            .all(|skip| skip.reason == SkipReason::AlreadyApplied));
    }

    #[test]
    fn omitted_cap_is_skipped_and_hydrogens_kept() {
        let mut s = dipeptide();
        let report = apply_caps(&mut s, &spec("P", CapPair::new(None, Some("NME")))).unwrap();

        assert_eq!(report.applied.len(), 1);
        assert_eq!(report.applied[0].terminus, Terminus::C);
        assert_eq!(report.skipped[0].reason, SkipReason::Omitted);
        assert_eq!(report.removed_atoms, 0);
        assert_eq!(s.atom_count(), 13);
        assert_eq!(s.names[1], "H1");
    }

    #[test]
    fn unsupported_cap_fails_before_editing() {
        let mut s = dipeptide();
        let before = s.clone();
        let err = apply_caps(&mut s, &spec("P", CapPair::new(Some("ACE"), Some("NHE")))).unwrap_err();

        match err {
            Error::UnsupportedCap {
                terminus,
                cap,
                supported,
                ..
            } => {
                assert_eq!(terminus, Terminus::C);
                assert_eq!(cap, "NHE");
                assert_eq!(supported, "NME");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(s, before);
    }

    #[test]
    fn missing_and_non_protein_segments_are_rejected() {
        let mut s = dipeptide();
        assert!(matches!(
            apply_caps(&mut s, &spec("X", CapPair::standard())),
            Err(Error::MissingSegment { .. })
        ));
        assert!(matches!(
            apply_caps(&mut s, &spec("W", CapPair::standard())),
            Err(Error::NonProteinSegment { .. })
        ));
    }

    #[test]
    fn terminus_without_replaceable_atom_is_rejected() {
        let mut s = Structure::new();
        for name in ["N", "CA", "C", "O"] {
            s.push(AtomRecord::new(name, "ALA", 1, "P"));
        }
        let err = apply_caps(&mut s, &spec("P", CapPair::standard())).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingTerminalAtom {
                terminus: Terminus::N,
                residue_id: 1,
                ..
            }
        ));
        assert_eq!(s.names, vec!["N", "CA", "C", "O"]);
    }

    #[test]
    fn xplor_names_are_accepted() {
        let mut s = Structure::new();
        for name in ["HT1", "HT2", "CA", "OT1", "OT2"] {
            s.push(AtomRecord::new(name, "ALA", 3, "P"));
        }
        let report = apply_caps(&mut s, &spec("P", CapPair::standard())).unwrap();
        assert_eq!(report.removed_atoms, 1);
        assert_eq!(s.names, vec!["C", "CA", "OT2", "N"]);
    }

    #[test]
    fn default_spec_covers_protein_segments_only() {
        let spec = CapSpec::default_for(&dipeptide());
        assert_eq!(spec.len(), 1);
        assert_eq!(spec.get("P"), Some(&CapPair::standard()));
        assert!(spec.get("W").is_none());
    }

    #[test]
    fn cap_pairs_deserialize_from_string_arrays() {
        #[derive(Deserialize)]
        struct Doc {
            caps: CapSpec,
        }
        let doc: Doc = toml::from_str("[caps]\nP = [\"ACE\", \"\"]\nQ = [\"\", \"NME\"]\n").unwrap();
        assert_eq!(doc.caps.get("P"), Some(&CapPair::new(Some("ACE"), None)));
        assert_eq!(doc.caps.get("Q").unwrap().get(Terminus::C), Some("NME"));
        assert_eq!(doc.caps.get("Q").unwrap().get(Terminus::N), None);
    }
}
