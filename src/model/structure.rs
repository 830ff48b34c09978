use super::permutation::{Permutation, PermutationError};
use super::table::{AtomTable, AtomView, Assignment};
use thiserror::Error;

/// PDB record type an atom was read from (and will be written as).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordKind {
    #[default]
    Atom,
    Hetatm,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("coordinate frame holds {found} positions but the structure has {expected} atoms")]
pub struct FrameLengthError {
    pub expected: usize,
    pub found: usize,
}

/// A column-oriented atom table.
///
/// Every per-atom column holds exactly [`atom_count`](Structure::atom_count)
/// entries, except `charges`, which may be empty when no charges are known.
/// `frames` holds one coordinate set per frame, each with one position per
/// atom. All bulk edits go through [`AtomTable`] so that no column can drift
/// out of step with the others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    pub names: Vec<String>,
    pub residue_names: Vec<String>,
    pub residue_ids: Vec<i32>,
    pub insertion_codes: Vec<char>,
    pub chain_ids: Vec<char>,
    pub segment_ids: Vec<String>,
    pub elements: Vec<String>,
    pub records: Vec<RecordKind>,
    pub occupancies: Vec<f64>,
    pub betas: Vec<f64>,
    pub charges: Vec<f64>,
    pub frames: Vec<Vec<[f64; 3]>>,
}

/// Row-wise description of one atom, used to build and inspect structures.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    pub name: String,
    pub residue_name: String,
    pub residue_id: i32,
    pub insertion_code: char,
    pub chain_id: char,
    pub segment_id: String,
    pub element: String,
    pub record: RecordKind,
    pub occupancy: f64,
    pub beta: f64,
    pub charge: Option<f64>,
    pub position: [f64; 3],
}

impl AtomRecord {
    pub fn new(
        name: impl Into<String>,
        residue_name: impl Into<String>,
        residue_id: i32,
        segment_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            residue_name: residue_name.into(),
            residue_id,
            insertion_code: ' ',
            chain_id: ' ',
            segment_id: segment_id.into(),
            element: String::new(),
            record: RecordKind::Atom,
            occupancy: 1.0,
            beta: 0.0,
            charge: None,
            position: [0.0; 3],
        }
    }

    pub fn insertion_code(mut self, code: char) -> Self {
        self.insertion_code = code;
        self
    }

    pub fn chain_id(mut self, chain_id: char) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn element(mut self, element: impl Into<String>) -> Self {
        self.element = element.into();
        self
    }

    pub fn hetero(mut self) -> Self {
        self.record = RecordKind::Hetatm;
        self
    }

    pub fn occupancy(mut self, occupancy: f64) -> Self {
        self.occupancy = occupancy;
        self
    }

    pub fn beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn charge(mut self, charge: f64) -> Self {
        self.charge = Some(charge);
        self
    }

    pub fn position(mut self, position: [f64; 3]) -> Self {
        self.position = position;
        self
    }
}

impl Structure {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Appends one atom to every column. The position is written to every
    /// existing frame (a first frame is created if there is none).
    pub fn push(&mut self, atom: AtomRecord) {
        let n = self.atom_count();

        match atom.charge {
            Some(q) => {
                if self.charges.len() < n {
                    self.charges.resize(n, 0.0);
                }
                self.charges.push(q);
            }
            None if !self.charges.is_empty() => self.charges.push(0.0),
            None => {}
        }

        if self.frames.is_empty() {
            self.frames.push(Vec::new());
        }
        for frame in &mut self.frames {
            frame.push(atom.position);
        }

        self.names.push(atom.name);
        self.residue_names.push(atom.residue_name);
        self.residue_ids.push(atom.residue_id);
        self.insertion_codes.push(atom.insertion_code);
        self.chain_ids.push(atom.chain_id);
        self.segment_ids.push(atom.segment_id);
        self.elements.push(atom.element);
        self.records.push(atom.record);
        self.occupancies.push(atom.occupancy);
        self.betas.push(atom.beta);
    }

    /// Adds a further coordinate frame.
    pub fn add_frame(&mut self, positions: Vec<[f64; 3]>) -> Result<(), FrameLengthError> {
        if positions.len() != self.atom_count() {
            return Err(FrameLengthError {
                expected: self.atom_count(),
                found: positions.len(),
            });
        }
        self.frames.push(positions);
        Ok(())
    }

    /// Row view of atom `index`, positioned at the first frame.
    pub fn record(&self, index: usize) -> AtomRecord {
        AtomRecord {
            name: self.names[index].clone(),
            residue_name: self.residue_names[index].clone(),
            residue_id: self.residue_ids[index],
            insertion_code: self.insertion_codes[index],
            chain_id: self.chain_ids[index],
            segment_id: self.segment_ids[index].clone(),
            element: self.elements[index].clone(),
            record: self.records[index],
            occupancy: self.occupancies[index],
            beta: self.betas[index],
            charge: self.charges.get(index).copied(),
            position: self
                .frames
                .first()
                .map(|f| f[index])
                .unwrap_or([0.0; 3]),
        }
    }

    /// Segment ids in order of first appearance.
    pub fn segments(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for segment_id in &self.segment_ids {
            if !seen.contains(segment_id) {
                seen.push(segment_id.clone());
            }
        }
        seen
    }

    /// Number of distinct contiguous residues, keyed on
    /// (residue id, insertion code, segment id).
    pub fn residue_count(&self) -> usize {
        crate::prep::sequence_ids(self.residue_keys())
            .last()
            .map_or(0, |&last| last + 1)
    }

    pub(crate) fn residue_keys(&self) -> impl Iterator<Item = (i32, char, &str)> + '_ {
        self.residue_ids
            .iter()
            .zip(&self.insertion_codes)
            .zip(&self.segment_ids)
            .map(|((&id, &icode), seg)| (id, icode, seg.as_str()))
    }

    /// `true` when every per-atom column has the expected length.
    pub fn is_consistent(&self) -> bool {
        let n = self.atom_count();
        self.residue_names.len() == n
            && self.residue_ids.len() == n
            && self.insertion_codes.len() == n
            && self.chain_ids.len() == n
            && self.segment_ids.len() == n
            && self.elements.len() == n
            && self.records.len() == n
            && self.occupancies.len() == n
            && self.betas.len() == n
            && (self.charges.is_empty() || self.charges.len() == n)
            && self.frames.iter().all(|f| f.len() == n)
    }
}

fn retain_column<T>(column: &mut Vec<T>, keep: &[bool]) {
    if column.is_empty() {
        return;
    }
    let mut flags = keep.iter();
    column.retain(|_| *flags.next().unwrap_or(&true));
}

impl AtomTable for Structure {
    fn atom_count(&self) -> usize {
        self.names.len()
    }

    fn atom(&self, index: usize) -> AtomView<'_> {
        AtomView {
            name: &self.names[index],
            residue_name: &self.residue_names[index],
            residue_id: self.residue_ids[index],
            insertion_code: self.insertion_codes[index],
            chain_id: self.chain_ids[index],
            segment_id: &self.segment_ids[index],
            beta: self.betas[index],
        }
    }

    fn assign(&mut self, indices: &[usize], value: &Assignment) {
        for &i in indices {
            match value {
                Assignment::Name(name) => self.names[i].clone_from(name),
                Assignment::ResidueName(name) => self.residue_names[i].clone_from(name),
                Assignment::ResidueId(id) => self.residue_ids[i] = *id,
                Assignment::SegmentId(seg) => self.segment_ids[i].clone_from(seg),
                Assignment::Beta(beta) => self.betas[i] = *beta,
            }
        }
    }

    fn remove(&mut self, indices: &[usize]) {
        if indices.is_empty() {
            return;
        }
        let mut keep = vec![true; self.atom_count()];
        for &i in indices {
            keep[i] = false;
        }

        retain_column(&mut self.names, &keep);
        retain_column(&mut self.residue_names, &keep);
        retain_column(&mut self.residue_ids, &keep);
        retain_column(&mut self.insertion_codes, &keep);
        retain_column(&mut self.chain_ids, &keep);
        retain_column(&mut self.segment_ids, &keep);
        retain_column(&mut self.elements, &keep);
        retain_column(&mut self.records, &keep);
        retain_column(&mut self.occupancies, &keep);
        retain_column(&mut self.betas, &keep);
        retain_column(&mut self.charges, &keep);
        for frame in &mut self.frames {
            retain_column(frame, &keep);
        }
    }

    fn reorder(&mut self, permutation: &Permutation) -> Result<(), PermutationError> {
        if permutation.len() != self.atom_count() {
            return Err(PermutationError::LengthMismatch {
                permutation: permutation.len(),
                atoms: self.atom_count(),
            });
        }

        permutation.apply(&mut self.names);
        permutation.apply(&mut self.residue_names);
        permutation.apply(&mut self.residue_ids);
        permutation.apply(&mut self.insertion_codes);
        permutation.apply(&mut self.chain_ids);
        permutation.apply(&mut self.segment_ids);
        permutation.apply(&mut self.elements);
        permutation.apply(&mut self.records);
        permutation.apply(&mut self.occupancies);
        permutation.apply(&mut self.betas);
        permutation.apply(&mut self.charges);
        for frame in &mut self.frames {
            permutation.apply(frame);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::selection::Selection;

    /// Each atom carries its creation index in `occupancies` and in the x
    /// coordinate so pairing can be checked after edits.
    fn tagged(n: usize) -> Structure {
        let mut s = Structure::new();
        for i in 0..n {
            s.push(
                AtomRecord::new(format!("A{i}"), "RES", i as i32 / 2, "S")
                    .occupancy(i as f64)
                    .charge(i as f64 * 0.1)
                    .position([i as f64, 0.0, 0.0]),
            );
        }
        s.add_frame((0..n).map(|i| [i as f64, 1.0, 0.0]).collect())
            .unwrap();
        s
    }

    fn assert_rows_paired(s: &Structure) {
        assert!(s.is_consistent());
        for i in 0..s.atom_count() {
            let tag = s.occupancies[i];
            assert_eq!(s.names[i], format!("A{}", tag as usize));
            assert_eq!(s.residue_ids[i], tag as i32 / 2);
            assert!((s.charges[i] - tag * 0.1).abs() < 1e-12);
            for frame in &s.frames {
                assert_eq!(frame[i][0], tag);
            }
        }
    }

    #[test]
    fn push_keeps_columns_aligned() {
        let s = tagged(4);
        assert_eq!(s.atom_count(), 4);
        assert_eq!(s.frame_count(), 2);
        assert!(s.is_consistent());
        assert_eq!(s.record(3).name, "A3");
        assert!((s.record(3).charge.unwrap() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn push_without_charge_leaves_charge_column_empty() {
        let mut s = Structure::new();
        s.push(AtomRecord::new("CA", "ALA", 1, "P"));
        s.push(AtomRecord::new("CB", "ALA", 1, "P"));
        assert!(s.charges.is_empty());
        assert!(s.is_consistent());
        assert_eq!(s.record(0).charge, None);
    }

    #[test]
    fn add_frame_rejects_wrong_length() {
        let mut s = tagged(3);
        let err = s.add_frame(vec![[0.0; 3]; 2]).unwrap_err();
        assert_eq!(err, FrameLengthError { expected: 3, found: 2 });
    }

    #[test]
    fn reorder_moves_every_column_together() {
        let mut s = tagged(6);
        let perm = Permutation::new(vec![5, 3, 1, 0, 2, 4]).unwrap();
        s.reorder(&perm).unwrap();

        assert_eq!(s.names[0], "A5");
        assert_eq!(s.names[3], "A0");
        assert_rows_paired(&s);

        let mut tags: Vec<usize> = s.occupancies.iter().map(|&t| t as usize).collect();
        tags.sort_unstable();
        assert_eq!(tags, (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn reorder_with_wrong_length_changes_nothing() {
        let mut s = tagged(4);
        let before = s.clone();
        let err = s.reorder(&Permutation::identity(3)).unwrap_err();
        assert_eq!(
            err,
            PermutationError::LengthMismatch {
                permutation: 3,
                atoms: 4
            }
        );
        assert_eq!(s, before);
    }

    #[test]
    fn remove_drops_rows_from_every_column() {
        let mut s = tagged(5);
        s.remove(&[1, 3]);
        assert_eq!(s.atom_count(), 3);
        assert_eq!(s.names, vec!["A0", "A2", "A4"]);
        assert_rows_paired(&s);
    }

    #[test]
    fn assign_and_select_round_through_the_table() {
        let mut s = tagged(4);
        let hits = s.select(&Selection::residue_id(1));
        assert_eq!(hits, vec![2, 3]);

        s.assign(&hits, &Assignment::ResidueName("XYZ".into()));
        s.assign(&hits, &Assignment::SegmentId("T".into()));
        assert_eq!(s.residue_names, vec!["RES", "RES", "XYZ", "XYZ"]);
        assert_eq!(s.segments(), vec!["S".to_string(), "T".to_string()]);
    }

    #[test]
    fn residue_count_uses_contiguous_keys() {
        let mut s = Structure::new();
        for (resid, seg) in [(1, "A"), (1, "A"), (2, "A"), (1, "B"), (1, "A")] {
            s.push(AtomRecord::new("X", "RES", resid, seg));
        }
        assert_eq!(s.residue_count(), 4);
        assert_eq!(Structure::new().residue_count(), 0);
    }
}
