use super::error::Error;
use super::sequence::sequence_ids;
use crate::model::selection::Selection;
use crate::model::table::{Assignment, AtomTable};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Residue name of a cysteine taking part in a disulfide bridge.
pub const BONDED_CYSTEINE: &str = "CYX";
/// Atom the bridge is drawn between.
pub const BRIDGE_ATOM: &str = "SG";

/// One residue addressed by segment and residue id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResidueRef {
    pub segment_id: String,
    pub residue_id: i32,
}

impl ResidueRef {
    pub fn new(segment_id: impl Into<String>, residue_id: i32) -> Self {
        Self {
            segment_id: segment_id.into(),
            residue_id,
        }
    }
}

impl fmt::Display for ResidueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.segment_id, self.residue_id)
    }
}

/// Two cysteines known to be bridged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisulfidePair {
    pub first: ResidueRef,
    pub second: ResidueRef,
}

impl DisulfidePair {
    pub fn new(first: ResidueRef, second: ResidueRef) -> Self {
        Self { first, second }
    }

    /// Pair formed by the residues of two bonded atoms, as reported by a
    /// geometric detector.
    pub fn from_atoms<T: AtomTable + ?Sized>(structure: &T, a: usize, b: usize) -> Self {
        let side = |i: usize| {
            let atom = structure.atom(i);
            ResidueRef::new(atom.segment_id, atom.residue_id)
        };
        Self::new(side(a), side(b))
    }
}

/// A bridged residue resolved to its index in the tool's residue numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchSite {
    pub residue: ResidueRef,
    pub index: i32,
}

/// A bond command for the parameterization tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondDirective {
    pub first: PatchSite,
    pub second: PatchSite,
    pub atom: &'static str,
}

impl fmt::Display for BondDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bond mol.{}.{} mol.{}.{}",
            self.first.index, self.atom, self.second.index, self.atom
        )
    }
}

/// Resolves disulfide pairs to bond directives and renames both cysteines of
/// every pair to [`BONDED_CYSTEINE`].
///
/// The tool numbers residues consecutively by their order in the file,
/// starting from the first residue id of the structure. Residue boundaries
/// follow (residue id, insertion code, segment id) changes. Every side is
/// resolved before any residue is renamed, so an unresolvable pair leaves the
/// structure untouched.
pub fn resolve_patches<T: AtomTable + ?Sized>(
    structure: &mut T,
    pairs: &[DisulfidePair],
) -> Result<Vec<BondDirective>, Error> {
    if pairs.is_empty() {
        return Ok(Vec::new());
    }

    let labels = sequence_ids((0..structure.atom_count()).map(|i| {
        let atom = structure.atom(i);
        (atom.residue_id, atom.insertion_code, atom.segment_id)
    }));
    let first_residue = if structure.is_empty() {
        1
    } else {
        structure.atom(0).residue_id
    };

    let mut directives = Vec::with_capacity(pairs.len());
    let mut bridged = Vec::new();
    for pair in pairs {
        let mut resolve = |residue: &ResidueRef| -> Result<PatchSite, Error> {
            let atoms = structure.select(
                &Selection::segment(residue.segment_id.as_str())
                    .and(Selection::residue_id(residue.residue_id)),
            );
            let mut found: Vec<usize> = atoms.iter().map(|&i| labels[i]).collect();
            found.sort_unstable();
            found.dedup();
            let &[label] = found.as_slice() else {
                return Err(Error::ambiguous_disulfide_site(
                    residue.segment_id.as_str(),
                    residue.residue_id,
                    found.len(),
                ));
            };
            bridged.extend(atoms);
            Ok(PatchSite {
                residue: residue.clone(),
                index: label as i32 + first_residue,
            })
        };

        let first = resolve(&pair.first)?;
        let second = resolve(&pair.second)?;
        debug!(
            "Disulfide {} - {} resolved to residues {} and {}",
            pair.first, pair.second, first.index, second.index
        );
        directives.push(BondDirective {
            first,
            second,
            atom: BRIDGE_ATOM,
        });
    }

    structure.assign(&bridged, &Assignment::ResidueName(BONDED_CYSTEINE.to_string()));
    info!("Patched {} disulfide bridge(s)", directives.len());

    Ok(directives)
}
