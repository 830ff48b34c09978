//! Error types for the build orchestrator.
//!
//! Configuration errors (unreadable build file, missing tleap, missing input
//! files) surface before anything is written. Failures of the preparation
//! passes and of PDB output are wrapped, and tool failures point at the log
//! file tleap wrote.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building AMBER inputs.
#[derive(Debug, Error)]
pub enum Error {
    /// The build configuration file could not be read.
    #[error("failed to read build configuration '{}': {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The build configuration is not valid TOML for [`BuildConfig`](super::BuildConfig).
    #[error("failed to parse build configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The tleap executable is not on `PATH`.
    #[error("could not find executable '{name}' in the PATH; cannot build for AMBER")]
    ToolNotFound { name: String },

    /// `$AMBERHOME` is not set, so the AmberTools data files cannot be found.
    #[error("{} environment variable is not defined", super::AMBERHOME)]
    AmberHomeUnset,

    /// A topology or parameter file named in the configuration is missing.
    #[error("input file '{}' does not exist", path.display())]
    MissingInput { path: PathBuf },

    /// Ionization was requested but no ionizer was supplied.
    #[error("ionization requested but no ionizer is configured")]
    MissingIonizer,

    /// A file system operation in the output directory failed.
    #[error("I/O error at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// tleap could not be started.
    #[error("tleap failed at execution: {source}")]
    ToolLaunch { source: std::io::Error },

    /// tleap ran but produced no usable topology.
    #[error("no topology/coordinate files were generated; check '{}' for errors in building", log.display())]
    MissingProducts { log: PathBuf },

    /// The ionizer rejected the structure.
    #[error("ionization failed: {0}")]
    Ionization(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A preparation pass failed.
    #[error(transparent)]
    Prepare(#[from] crate::prep::Error),

    /// The structure could not be written as PDB.
    #[error("failed to write the input structure: {0}")]
    Structure(#[from] crate::io::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
