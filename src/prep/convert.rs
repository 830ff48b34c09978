use super::error::Error;
use super::rules::{Rule, RuleTable};
use super::sequence::sequence_ids;
use crate::model::permutation::Permutation;
use crate::model::table::{Assignment, AtomTable};
use log::{debug, info};
use std::collections::HashMap;

/// Largest number of molecule instances the segment id scheme can number:
/// ids are a one-letter prefix followed by at most three digits.
pub const MAX_INSTANCES: usize = 999;

/// Width of the PDB segment id field (columns 73-76).
pub const SEGMENT_ID_WIDTH: usize = 4;

/// Options for [`convert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Prefix of the segment ids given to re-segmented molecule instances.
    pub segment_prefix: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            segment_prefix: "L".to_string(),
        }
    }
}

/// Summary of a convention rewrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionReport {
    /// Atoms renamed by a rule.
    pub matched_atoms: usize,
    /// Source residues rewritten and reordered.
    pub converted_residues: usize,
    /// Molecule instances given their own segment.
    pub instances: usize,
}

/// Rewrites `structure` from the source to the target naming convention.
///
/// Works on a copy; the input is never modified. Atoms whose residue and
/// atom name match a rule are renamed, each matched residue is reordered
/// into the canonical layout the rules prescribe, and every molecule
/// instance bounded by terminal rules becomes its own segment
/// (`<prefix>1`, `<prefix>2`, ...) with residues renumbered from 0.
///
/// A residue that matches the table must match it completely: every atom
/// needs a rule, every rule must declare the residue's actual atom count,
/// and the canonical positions must tile `0..count`. Anything else fails
/// with [`Error::InconsistentResidueLayout`].
pub fn convert<T>(
    structure: &T,
    table: &RuleTable,
    options: &ConvertOptions,
) -> Result<(T, ConversionReport), Error>
where
    T: AtomTable + Clone,
{
    let n = structure.atom_count();
    let mut converted = structure.clone();

    let plan: Vec<Option<&Rule>> = (0..n)
        .map(|i| {
            let atom = structure.atom(i);
            table.get(atom.residue_name, atom.name)
        })
        .collect();

    let matched_atoms = plan.iter().flatten().count();
    if matched_atoms == 0 {
        info!("No atoms match the conversion rules; structure left unchanged");
        return Ok((converted, ConversionReport::default()));
    }

    let labels = sequence_ids((0..n).map(|i| {
        let atom = structure.atom(i);
        (atom.segment_id, atom.residue_id)
    }));

    let mut targets: Vec<usize> = (0..n).collect();
    let mut converted_residues = 0;
    let mut start = 0;
    while start < n {
        let label = labels[start];
        let end = labels[start..]
            .iter()
            .position(|&l| l != label)
            .map_or(n, |offset| start + offset);

        if plan[start..end].iter().any(Option::is_some) {
            place_residue(structure, start, &plan[start..end], &mut targets[start..end])?;
            converted_residues += 1;
        }
        start = end;
    }

    let mut residue_renames: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut atom_renames: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, rule) in plan.iter().enumerate() {
        if let Some(rule) = rule {
            residue_renames
                .entry(rule.residue_name.as_str())
                .or_default()
                .push(i);
            atom_renames.entry(rule.atom_name.as_str()).or_default().push(i);
        }
    }
    for (name, indices) in residue_renames {
        converted.assign(&indices, &Assignment::ResidueName(name.to_string()));
    }
    for (name, indices) in atom_renames {
        converted.assign(&indices, &Assignment::Name(name.to_string()));
    }

    let permutation = Permutation::from_sort_keys(&targets);
    converted.reorder(&permutation)?;

    let new_position = permutation.inverse();
    let mut begins: Vec<usize> = boundary_positions(&plan, &new_position, Rule::opens_instance);
    let mut ends: Vec<usize> = boundary_positions(&plan, &new_position, Rule::closes_instance);
    begins.sort_unstable();
    ends.sort_unstable();

    let instances = resegment(&mut converted, &begins, &ends, &options.segment_prefix)?;

    info!(
        "Converted {} residues ({} atoms) into {} segment(s)",
        converted_residues, matched_atoms, instances
    );

    Ok((
        converted,
        ConversionReport {
            matched_atoms,
            converted_residues,
            instances,
        },
    ))
}

/// Writes the global target index of every atom of one matched residue.
fn place_residue<T: AtomTable>(
    structure: &T,
    start: usize,
    rules: &[Option<&Rule>],
    targets: &mut [usize],
) -> Result<(), Error> {
    let atom = structure.atom(start);
    let fail = |detail: String| {
        Error::inconsistent_layout(atom.residue_name, atom.residue_id, atom.segment_id, detail)
    };

    let size = rules.len();
    let unmatched = rules.iter().filter(|r| r.is_none()).count();
    if unmatched > 0 {
        return Err(fail(format!(
            "{unmatched} of {size} atoms have no conversion rule"
        )));
    }

    let mut taken = vec![false; size];
    for (offset, rule) in rules.iter().flatten().enumerate() {
        if rule.residue_atoms != size {
            return Err(fail(format!(
                "rule for atom {} expects {} atoms but the residue holds {size}",
                structure.atom(start + offset).name,
                rule.residue_atoms
            )));
        }
        if std::mem::replace(&mut taken[rule.position], true) {
            return Err(fail(format!(
                "canonical position {} is claimed by more than one atom",
                rule.position
            )));
        }
        targets[offset] = start + rule.position;
    }

    debug!(
        "Placed residue {} {} ({} atoms) at offset {start}",
        atom.residue_name, atom.residue_id, size
    );
    Ok(())
}

fn boundary_positions(
    plan: &[Option<&Rule>],
    new_position: &[usize],
    marks: fn(&Rule) -> bool,
) -> Vec<usize> {
    plan.iter()
        .enumerate()
        .filter(|(_, rule)| rule.is_some_and(marks))
        .map(|(i, _)| new_position[i])
        .collect()
}

/// Gives each molecule instance `begins[k]..=ends[k]` its own segment
/// `<prefix><k + 1>` and renumbers its residues from 0 by residue name runs.
///
/// Returns the number of instances. Fails with [`Error::SegmentIdTooLong`]
/// when the widest generated id would not fit the PDB segment field.
pub fn resegment<T: AtomTable>(
    structure: &mut T,
    begins: &[usize],
    ends: &[usize],
    prefix: &str,
) -> Result<usize, Error> {
    if begins.len() > MAX_INSTANCES {
        return Err(Error::TooManyInstances {
            count: begins.len(),
            limit: MAX_INSTANCES,
        });
    }
    let widest = format!("{prefix}{}", begins.len());
    if !begins.is_empty() && widest.chars().count() > SEGMENT_ID_WIDTH {
        return Err(Error::SegmentIdTooLong {
            segment_id: widest,
            width: SEGMENT_ID_WIDTH,
        });
    }
    let unpaired = |detail: String| Error::UnpairedTerminals {
        begins: begins.len(),
        ends: ends.len(),
        detail,
    };
    if begins.len() != ends.len() {
        return Err(unpaired("counts differ".to_string()));
    }

    let mut previous_end: Option<usize> = None;
    for (k, (&begin, &end)) in begins.iter().zip(ends).enumerate() {
        if end < begin || end >= structure.atom_count() {
            return Err(unpaired(format!(
                "instance {} spans atoms {begin}..={end}",
                k + 1
            )));
        }
        if previous_end.is_some_and(|prev| begin <= prev) {
            return Err(unpaired(format!(
                "instance {} overlaps the previous one",
                k + 1
            )));
        }
        previous_end = Some(end);

        let labels = sequence_ids((begin..=end).map(|i| structure.atom(i).residue_name));
        let mut by_label: Vec<Vec<usize>> = Vec::new();
        for (offset, label) in labels.into_iter().enumerate() {
            if label == by_label.len() {
                by_label.push(Vec::new());
            }
            by_label[label].push(begin + offset);
        }
        for (label, indices) in by_label.iter().enumerate() {
            structure.assign(indices, &Assignment::ResidueId(label as i32));
        }

        let members: Vec<usize> = (begin..=end).collect();
        structure.assign(&members, &Assignment::SegmentId(format!("{prefix}{}", k + 1)));
    }

    Ok(begins.len())
}
