//! The editing surface the preparation passes require from a structure.
//!
//! Every pass in [`crate::prep`] is written against [`AtomTable`] rather than
//! a concrete container: it reads atoms through borrowed [`AtomView`]s,
//! finds them through declarative [`Selection`]s, and writes back through
//! bulk [`Assignment`]s, removals, and whole-table reorders.

use super::permutation::{Permutation, PermutationError};
use super::selection::Selection;

/// Borrowed view of the labels of a single atom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtomView<'a> {
    pub name: &'a str,
    pub residue_name: &'a str,
    pub residue_id: i32,
    pub insertion_code: char,
    pub chain_id: char,
    pub segment_id: &'a str,
    pub beta: f64,
}

/// A single label written to every atom of an index set.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    Name(String),
    ResidueName(String),
    ResidueId(i32),
    SegmentId(String),
    Beta(f64),
}

pub trait AtomTable {
    fn atom_count(&self) -> usize;

    /// # Panics
    ///
    /// Panics if `index` is not below [`atom_count`](Self::atom_count).
    fn atom(&self, index: usize) -> AtomView<'_>;

    /// Writes `value` to every atom in `indices`.
    fn assign(&mut self, indices: &[usize], value: &Assignment);

    /// Deletes the atoms in `indices` from every per-atom column.
    fn remove(&mut self, indices: &[usize]);

    /// Reorders every per-atom column so that the atom formerly at
    /// `permutation[i]` ends up at position `i`.
    ///
    /// Fails without modifying anything if the permutation length differs
    /// from the atom count.
    fn reorder(&mut self, permutation: &Permutation) -> Result<(), PermutationError>;

    /// Ascending indices of all atoms matching `selection`.
    fn select(&self, selection: &Selection) -> Vec<usize> {
        (0..self.atom_count())
            .filter(|&i| selection.matches(&self.atom(i)))
            .collect()
    }

    fn is_empty(&self) -> bool {
        self.atom_count() == 0
    }
}
