/// Broad classification of a residue by its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResidueCategory {
    Protein,
    Water,
    Other,
}

/// Amino acid residue names recognized as protein, covering the PDB standard
/// set, AMBER/CHARMM protonation and bonding variants, and terminal caps.
const PROTEIN_RESIDUES: &[&str] = &[
    "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HIS", "ILE", "LEU", "LYS", "MET",
    "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL", // standard
    "ASH", "CYM", "CYX", "GLH", "HID", "HIE", "HIP", "HSD", "HSE", "HSP", "LYN", "AR0", "TYM",
    "MSE", "SEC", "PYL", // variants
    "ACE", "NME", "NMA", // caps
];

const WATER_RESIDUES: &[&str] = &["HOH", "WAT", "TIP3", "TIP", "SOL", "H2O", "TP3", "SPC"];

impl ResidueCategory {
    pub fn classify(residue_name: &str) -> Self {
        let name = residue_name.trim();
        if PROTEIN_RESIDUES.iter().any(|r| r.eq_ignore_ascii_case(name)) {
            Self::Protein
        } else if WATER_RESIDUES.iter().any(|r| r.eq_ignore_ascii_case(name)) {
            Self::Water
        } else {
            Self::Other
        }
    }
}

#[inline]
pub fn is_protein(residue_name: &str) -> bool {
    ResidueCategory::classify(residue_name) == ResidueCategory::Protein
}

#[inline]
pub fn is_water(residue_name: &str) -> bool {
    ResidueCategory::classify(residue_name) == ResidueCategory::Water
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_standard_and_variant_amino_acids() {
        assert_eq!(ResidueCategory::classify("ALA"), ResidueCategory::Protein);
        assert_eq!(ResidueCategory::classify("CYX"), ResidueCategory::Protein);
        assert_eq!(ResidueCategory::classify("hie"), ResidueCategory::Protein);
        assert!(is_protein("NME"));
    }

    #[test]
    fn classifies_water_and_other() {
        assert!(is_water("TIP3"));
        assert!(is_water("HOH"));
        assert_eq!(ResidueCategory::classify("POPC"), ResidueCategory::Other);
        assert_eq!(ResidueCategory::classify(""), ResidueCategory::Other);
    }
}
