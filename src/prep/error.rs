//! Error types for topology preparation.
//!
//! Errors fall into three groups: configuration problems (a rule file that
//! is missing or malformed), structural preconditions that the input does not
//! meet (missing segments, unsupported caps, ambiguous disulfide sites,
//! residues that only partially match the rule table), and capacity limits of
//! the segment numbering scheme.

use crate::model::permutation::PermutationError;
use std::path::PathBuf;
use thiserror::Error;

use super::caps::Terminus;

/// Errors that can occur while rewriting, capping or patching a structure.
#[derive(Debug, Error)]
pub enum Error {
    /// The convention rule file does not exist.
    #[error("rule file '{}' does not exist", path.display())]
    RuleFileNotFound { path: PathBuf },

    /// The rule source could not be read.
    #[error("failed to read rule source: {0}")]
    RuleRead(#[from] std::io::Error),

    /// A row of the rule source is malformed.
    #[error("invalid rule at line {line}: {detail}")]
    RuleParse { line: u64, detail: String },

    /// A residue matched the rule table only in part, or its canonical
    /// positions do not tile the residue.
    #[error(
        "residue {residue_name} {residue_id} in segment '{segment_id}' does not match the rule table consistently: {detail}"
    )]
    InconsistentResidueLayout {
        residue_name: String,
        residue_id: i32,
        segment_id: String,
        detail: String,
    },

    /// Terminal begin and end markers could not be paired into instances.
    #[error("cannot pair {begins} terminal begin atoms with {ends} terminal end atoms: {detail}")]
    UnpairedTerminals {
        begins: usize,
        ends: usize,
        detail: String,
    },

    /// More molecule instances than the segment id scheme can number.
    #[error(
        "found {count} molecule instances; at most {limit} separate segments can be numbered"
    )]
    TooManyInstances { count: usize, limit: usize },

    /// A generated segment id does not fit the PDB segment field.
    #[error(
        "segment id '{segment_id}' is wider than {width} characters; use a shorter segment prefix"
    )]
    SegmentIdTooLong { segment_id: String, width: usize },

    /// Atoms without a segment id; every pass addresses atoms by segment.
    #[error("{count} atoms have no segment id (first at index {first})")]
    MissingSegmentIds { count: usize, first: usize },

    /// A requested segment is absent.
    #[error("there is no segment '{segment_id}' in the structure")]
    MissingSegment { segment_id: String },

    /// Capping was requested for a segment without protein atoms.
    #[error("segment '{segment_id}' is not protein; capping non-protein segments is not supported")]
    NonProteinSegment { segment_id: String },

    /// The requested cap is not the supported identity for its terminus.
    #[error(
        "in segment '{segment_id}', the {terminus} cap '{cap}' is not supported; use '{supported}' instead"
    )]
    UnsupportedCap {
        segment_id: String,
        terminus: Terminus,
        cap: String,
        supported: &'static str,
    },

    /// The terminal residue lacks every atom that could anchor the cap.
    #[error(
        "in segment '{segment_id}', residue {residue_id} has none of the atoms [{candidates}] needed to place a {terminus} cap"
    )]
    MissingTerminalAtom {
        segment_id: String,
        residue_id: i32,
        terminus: Terminus,
        candidates: String,
    },

    /// One side of a disulfide pair selected no residue or several residues.
    #[error(
        "disulfide site segment '{segment_id}' residue {residue_id} selects {found} residues; exactly one is required"
    )]
    AmbiguousDisulfideSite {
        segment_id: String,
        residue_id: i32,
        found: usize,
    },

    /// An internally computed reorder was rejected.
    #[error("invalid atom reordering: {0}")]
    Permutation(#[from] PermutationError),
}

impl Error {
    pub fn inconsistent_layout(
        residue_name: impl Into<String>,
        residue_id: i32,
        segment_id: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::InconsistentResidueLayout {
            residue_name: residue_name.into(),
            residue_id,
            segment_id: segment_id.into(),
            detail: detail.into(),
        }
    }

    pub fn rule_parse(line: u64, detail: impl Into<String>) -> Self {
        Self::RuleParse {
            line,
            detail: detail.into(),
        }
    }

    pub fn ambiguous_disulfide_site(
        segment_id: impl Into<String>,
        residue_id: i32,
        found: usize,
    ) -> Self {
        Self::AmbiguousDisulfideSite {
            segment_id: segment_id.into(),
            residue_id,
            found,
        }
    }
}
