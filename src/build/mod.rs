//! AMBER build orchestration.
//!
//! A [`BuildSession`] takes a structure through the preparation passes,
//! writes `input.pdb` and a tleap script into an output directory, and runs
//! tleap through a [`LeapRunner`]. With ionization enabled it builds twice:
//! once without ions so an [`Ionizer`] can read the net charge, and once
//! with the ions it placed.

mod config;
mod error;
mod script;
mod session;
mod tool;

pub use config::BuildConfig;
pub use error::Error;
pub use script::{INPUT_PDB, LeapScript, SCRIPT_NAME};
pub use session::{BuildOutcome, BuildProducts, BuildSession, BuildStage, Ionizer, LOG_FILE};
pub use tool::{
    AMBERHOME, LeapRunner, TleapProcess, amber_home, clean_outdir, forcefield_dir, list_forcefields,
};
