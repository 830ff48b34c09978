//! Structure file I/O.
//!
//! Only PDB is supported: it is what tleap loads, and unlike most other
//! formats it carries segment ids (columns 73-76), which the preparation
//! passes key on.

pub mod error;
pub mod pdb;

pub use error::Error;
