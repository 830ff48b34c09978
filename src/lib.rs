//! A pure Rust library for preparing molecular structures for the AMBER
//! force field and building them with tleap.
//!
//! It rewrites CHARMM-style lipid naming into the AMBER split-residue
//! convention, caps protein termini with ACE/NME, patches disulfide bridges,
//! and drives tleap to produce a `.prmtop`/`.crd` pair.
//!
//! # Features
//!
//! - **Convention rewriting**: Table-driven renaming, reordering and
//!   re-segmentation of lipid residues ([`prep::convert`])
//! - **Terminal capping**: In-place ACE/NME caps without growing the atom
//!   count ([`prep::apply_caps`])
//! - **Disulfide patching**: `CYX` relabeling and tleap `bond` directives
//!   ([`prep::resolve_patches`])
//! - **Build orchestration**: Script generation, tool execution and the
//!   optional ionize-and-rebuild cycle ([`BuildSession`])
//! - **PDB I/O**: Multi-model PDB reading and writing with segment ids
//!   ([`io::pdb`])
//!
//! # Quick Start
//!
//! ```
//! use amber_forge::{AtomRecord, Structure};
//! use amber_forge::prep::{self, DisulfidePair, PrepareConfig, ResidueRef};
//!
//! let mut structure = Structure::new();
//! for (resid, resname) in [(1, "ALA"), (2, "CYS"), (3, "GLY"), (4, "CYS")] {
//!     let first = if resid == 1 { "H1" } else { "N" };
//!     for name in [first, "CA", "C", "O"] {
//!         structure.push(AtomRecord::new(name, resname, resid, "P"));
//!     }
//! }
//! structure.push(AtomRecord::new("OXT", "CYS", 4, "P"));
//!
//! let config = PrepareConfig {
//!     disulfides: vec![DisulfidePair::new(ResidueRef::new("P", 2), ResidueRef::new("P", 4))],
//!     ..PrepareConfig::default()
//! };
//! let prepared = prep::prepare(&structure, None, &config)?;
//!
//! // H1 became the ACE cap, OXT the NME cap
//! assert_eq!(prepared.structure.residue_names[0], "ACE");
//! assert_eq!(prepared.structure.residue_names.last().map(String::as_str), Some("NME"));
//! assert_eq!(prepared.caps.applied.len(), 2);
//!
//! // Both cysteines are now CYX and bridged
//! assert_eq!(prepared.bonds[0].to_string(), "bond mol.2.SG mol.4.SG");
//! # Ok::<(), amber_forge::PrepError>(())
//! ```
//!
//! # Module Organization
//!
//! - [`io`]: PDB reading and writing
//! - [`prep`]: Conversion, capping and disulfide passes
//! - [`build`]: tleap script generation and the build session
//!
//! # Data Types
//!
//! - [`Structure`]: Column-oriented atom table with coordinate frames
//! - [`AtomRecord`]: Row-wise atom description used to build structures
//! - [`AtomTable`]: Editing surface the preparation passes work on
//! - [`Selection`]: Declarative atom predicates
//! - [`Permutation`]: Validated atom reordering
//! - [`ResidueCategory`]: Protein, water or other residue

mod model;

pub mod build;
pub mod io;
pub mod prep;

pub use model::permutation::{Permutation, PermutationError};
pub use model::residue::{ResidueCategory, is_protein, is_water};
pub use model::selection::Selection;
pub use model::structure::{AtomRecord, FrameLengthError, RecordKind, Structure};
pub use model::table::{Assignment, AtomTable, AtomView};

pub use build::{
    BuildConfig, BuildOutcome, BuildProducts, BuildSession, BuildStage, Ionizer, LeapRunner,
    TleapProcess,
};

pub use build::Error as BuildError;
pub use io::Error as IoError;
pub use prep::Error as PrepError;
