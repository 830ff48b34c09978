//! The topology transformation engine.
//!
//! A structure goes through three passes before it is handed to tleap:
//! convention rewriting ([`convert`]), terminal capping ([`apply_caps`]) and
//! disulfide patching ([`resolve_patches`]). [`prepare`] runs all three.

mod caps;
mod config;
mod convert;
mod disulfide;
mod error;
mod rules;
mod segments;
mod sequence;

pub use caps::{AppliedCap, CapPair, CapReport, CapSpec, SkipReason, SkippedCap, Terminus, apply_caps};
pub use config::PrepareConfig;
pub use convert::{
    ConversionReport, ConvertOptions, MAX_INSTANCES, SEGMENT_ID_WIDTH, convert, resegment,
};
pub use disulfide::{
    BONDED_CYSTEINE, BRIDGE_ATOM, BondDirective, DisulfidePair, PatchSite, ResidueRef,
    resolve_patches,
};
pub use error::Error;
pub use rules::{Rule, RuleTable};
pub use segments::{check_segments, segment_summary};
pub use sequence::sequence_ids;

use crate::model::table::AtomTable;
use log::info;

/// A prepared structure together with what each pass did to it.
#[derive(Debug, Clone)]
pub struct Prepared<T> {
    pub structure: T,
    pub conversion: ConversionReport,
    pub caps: CapReport,
    pub bonds: Vec<BondDirective>,
}

/// Rewrites, caps and patches a copy of `structure`.
///
/// Every atom must carry a segment id. Conversion is skipped when `rules`
/// is `None`.
pub fn prepare<T>(
    structure: &T,
    rules: Option<&RuleTable>,
    config: &PrepareConfig,
) -> Result<Prepared<T>, Error>
where
    T: AtomTable + Clone,
{
    check_segments(structure)?;

    let (mut structure, conversion) = match rules {
        Some(table) => {
            let options = ConvertOptions {
                segment_prefix: config.segment_prefix.clone(),
            };
            convert(structure, table, &options)?
        }
        None => {
            info!("No conversion rules given; keeping the input naming");
            (structure.clone(), ConversionReport::default())
        }
    };

    let caps = match &config.caps {
        Some(spec) => apply_caps(&mut structure, spec)?,
        None => {
            let spec = CapSpec::default_for(&structure);
            apply_caps(&mut structure, &spec)?
        }
    };

    let bonds = resolve_patches(&mut structure, &config.disulfides)?;

    Ok(Prepared {
        structure,
        conversion,
        caps,
        bonds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::structure::{AtomRecord, Structure};

    fn capped_cysteines() -> Structure {
        let mut s = Structure::new();
        for name in ["N", "H1", "H2", "CA", "SG"] {
            s.push(AtomRecord::new(name, "CYS", 1, "P"));
        }
        for name in ["N", "CA", "SG", "OXT"] {
            s.push(AtomRecord::new(name, "CYS", 2, "P"));
        }
        s
    }

    #[test]
    fn prepare_caps_by_default_and_patches_after_capping() {
        let s = capped_cysteines();
        let config = PrepareConfig {
            disulfides: vec![DisulfidePair::new(
                ResidueRef::new("P", 1),
                ResidueRef::new("P", 2),
            )],
            ..PrepareConfig::default()
        };

        let prepared = prepare(&s, None, &config).unwrap();
        let out = &prepared.structure;

        assert_eq!(prepared.caps.applied.len(), 2);
        assert_eq!(prepared.caps.removed_atoms, 1);
        assert_eq!(out.atom_count(), 8);
        assert_eq!(out.residue_names[0], "ACE");
        assert_eq!(out.residue_names[7], "NME");

        // numbering starts at the ACE residue id, 0
        assert_eq!(prepared.bonds[0].to_string(), "bond mol.1.SG mol.2.SG");
        assert!(out.residue_names[1..7].iter().all(|r| r == "CYX"));
    }

    #[test]
    fn explicit_empty_cap_spec_disables_capping() {
        let s = capped_cysteines();
        let config = PrepareConfig {
            caps: Some(CapSpec::new()),
            ..PrepareConfig::default()
        };
        let prepared = prepare(&s, None, &config).unwrap();
        assert_eq!(prepared.structure, s);
        assert!(prepared.caps.applied.is_empty());
    }
}
