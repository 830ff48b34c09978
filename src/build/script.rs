use crate::prep::BondDirective;
use std::fmt;

/// Name of the structure file the script loads.
pub const INPUT_PDB: &str = "input.pdb";
/// Name of the script file tleap is run on.
pub const SCRIPT_NAME: &str = "tleap.in";

/// A tleap input script.
///
/// Parameter and topology entries are bare file names: the files are copied
/// next to the script and tleap runs inside that directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeapScript {
    pub forcefields: Vec<String>,
    pub parameters: Vec<String>,
    pub topologies: Vec<String>,
    pub bonds: Vec<String>,
    pub prefix: String,
}

impl LeapScript {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    pub fn with_bonds<'a>(mut self, bonds: impl IntoIterator<Item = &'a BondDirective>) -> Self {
        self.bonds = bonds.into_iter().map(ToString::to_string).collect();
        self
    }

    pub fn topology_file(&self) -> String {
        format!("{}.prmtop", self.prefix)
    }

    pub fn coordinate_file(&self) -> String {
        format!("{}.crd", self.prefix)
    }
}

impl fmt::Display for LeapScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# tleap file generated by amber-forge")?;
        for forcefield in &self.forcefields {
            writeln!(f, "source {forcefield}")?;
        }
        writeln!(f)?;

        writeln!(f, "# Loading ions and TIP3P water parameters")?;
        writeln!(f, "loadamberparams frcmod.ionsjc_tip3p")?;
        writeln!(f)?;

        writeln!(f, "# Loading parameter files")?;
        for parameter in &self.parameters {
            writeln!(f, "loadamberparams {parameter}")?;
        }
        writeln!(f)?;

        writeln!(f, "# Loading prepi topologies")?;
        for topology in &self.topologies {
            writeln!(f, "loadamberprep {topology}")?;
        }
        writeln!(f)?;

        writeln!(f, "# Loading the system")?;
        writeln!(f, "mol = loadpdb {INPUT_PDB}")?;
        writeln!(f)?;

        if !self.bonds.is_empty() {
            writeln!(f, "# Adding disulfide bonds")?;
            for bond in &self.bonds {
                writeln!(f, "{bond}")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "# Writing out the results")?;
        writeln!(
            f,
            "saveamberparm mol {} {}",
            self.topology_file(),
            self.coordinate_file()
        )?;
        writeln!(f, "quit")
    }
}
