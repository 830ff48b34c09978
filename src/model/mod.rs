//! Core data structures for molecular structures under preparation.
//!
//! - [`structure`] – Column-oriented atom table with coordinate frames.
//! - [`table`] – The [`AtomTable`](table::AtomTable) capability the preparation passes are written against.
//! - [`selection`] – Declarative atom predicates.
//! - [`permutation`] – Validated atom reorderings.
//! - [`residue`] – Residue classification by name.

pub mod permutation;
pub mod residue;
pub mod selection;
pub mod structure;
pub mod table;
