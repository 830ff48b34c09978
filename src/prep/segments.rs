use super::error::Error;
use crate::model::residue::{ResidueCategory, is_protein};
use crate::model::table::AtomTable;
use log::warn;
use std::collections::BTreeMap;

/// Checks that every atom carries a segment id and warns about segments
/// mixing protein with other residues, which tleap would join into one
/// chain.
pub fn check_segments<T: AtomTable + ?Sized>(structure: &T) -> Result<(), Error> {
    let mut missing = (0..structure.atom_count()).filter(|&i| structure.atom(i).segment_id.is_empty());
    if let Some(first) = missing.next() {
        return Err(Error::MissingSegmentIds {
            count: missing.count() + 1,
            first,
        });
    }

    let mut kinds: BTreeMap<&str, (bool, bool)> = BTreeMap::new();
    for i in 0..structure.atom_count() {
        let atom = structure.atom(i);
        let entry = kinds.entry(atom.segment_id).or_default();
        if is_protein(atom.residue_name) {
            entry.0 = true;
        } else {
            entry.1 = true;
        }
    }
    for (segment_id, (protein, other)) in kinds {
        if protein && other {
            warn!(
                "Segment '{segment_id}' mixes protein and non-protein residues; consider splitting it"
            );
        }
    }

    Ok(())
}

/// Residue category counts per segment, in order of first appearance.
pub fn segment_summary<T: AtomTable + ?Sized>(
    structure: &T,
) -> Vec<(String, BTreeMap<ResidueCategory, usize>)> {
    let mut summary: Vec<(String, BTreeMap<ResidueCategory, usize>)> = Vec::new();
    let mut previous: Option<(&str, i32, char)> = None;

    for i in 0..structure.atom_count() {
        let atom = structure.atom(i);
        let key = (atom.segment_id, atom.residue_id, atom.insertion_code);
        if previous == Some(key) {
            continue;
        }
        previous = Some(key);

        let position = match summary.iter().position(|(s, _)| s == atom.segment_id) {
            Some(position) => position,
            None => {
                summary.push((atom.segment_id.to_string(), BTreeMap::new()));
                summary.len() - 1
            }
        };
        *summary[position]
            .1
            .entry(ResidueCategory::classify(atom.residue_name))
            .or_default() += 1;
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::structure::{AtomRecord, Structure};

    #[test]
    fn empty_segment_ids_are_rejected() {
        let mut s = Structure::new();
        s.push(AtomRecord::new("N", "ALA", 1, "P"));
        s.push(AtomRecord::new("O", "HOH", 2, ""));
        s.push(AtomRecord::new("O", "HOH", 3, ""));
        assert!(matches!(
            check_segments(&s),
            Err(Error::MissingSegmentIds { count: 2, first: 1 })
        ));
    }

    #[test]
    fn mixed_segments_only_warn() {
        let mut s = Structure::new();
        s.push(AtomRecord::new("N", "ALA", 1, "P"));
        s.push(AtomRecord::new("O", "HOH", 2, "P"));
        assert!(check_segments(&s).is_ok());
    }

    #[test]
    fn summary_counts_residues_per_segment() {
        let mut s = Structure::new();
        s.push(AtomRecord::new("N", "ALA", 1, "P"));
        s.push(AtomRecord::new("CA", "ALA", 1, "P"));
        s.push(AtomRecord::new("N", "GLY", 2, "P"));
        s.push(AtomRecord::new("OH2", "TIP3", 1, "W"));
        s.push(AtomRecord::new("P", "POPC", 1, "M"));

        let summary = segment_summary(&s);
        assert_eq!(summary.len(), 3);
        assert_eq!(summary[0].0, "P");
        assert_eq!(summary[0].1[&ResidueCategory::Protein], 2);
        assert_eq!(summary[1].1[&ResidueCategory::Water], 1);
        assert_eq!(summary[2].1[&ResidueCategory::Other], 1);
    }
}
