use crate::io::error::Error;
use crate::model::structure::{RecordKind, Structure};
use std::io::Write;

/// Writes the first frame of `structure` as PDB.
pub fn write<W: Write>(writer: W, structure: &Structure) -> Result<(), Error> {
    write_frame(writer, structure, 0)
}

/// Writes one coordinate frame of `structure` as PDB.
///
/// A `TER` record closes every run of atoms sharing a segment id, so tleap
/// reads each segment as its own chain. A structure without frames is
/// written with zero coordinates.
pub fn write_frame<W: Write>(
    mut writer: W,
    structure: &Structure,
    frame: usize,
) -> Result<(), Error> {
    let positions = match structure.frames.get(frame) {
        Some(positions) => Some(positions),
        None if structure.frames.is_empty() && frame == 0 => None,
        None => {
            return Err(Error::MissingFrame {
                frame,
                count: structure.frame_count(),
            });
        }
    };

    let n = structure.atom_count();
    for i in 0..n {
        let [x, y, z] = positions.map_or([0.0; 3], |p| p[i]);
        let record = match structure.records[i] {
            RecordKind::Atom => "ATOM",
            RecordKind::Hetatm => "HETATM",
        };
        writeln!(
            writer,
            "{:<6}{:>5} {}{}{:<4}{}{:>4}{}   {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}      {:<4}{:>2}",
            record,
            (i + 1) % 100_000,
            format_atom_name(&structure.names[i], &structure.elements[i]),
            ' ',
            truncate(&structure.residue_names[i], 4),
            structure.chain_ids[i],
            wrap_residue_id(structure.residue_ids[i]),
            structure.insertion_codes[i],
            x,
            y,
            z,
            structure.occupancies[i],
            structure.betas[i],
            truncate(&structure.segment_ids[i], 4),
            truncate(&structure.elements[i], 2),
        )?;

        let segment_ends = i + 1 == n || structure.segment_ids[i + 1] != structure.segment_ids[i];
        if segment_ends {
            writeln!(writer, "TER")?;
        }
    }
    writeln!(writer, "END")?;
    Ok(())
}

/// Residue ids wrap modulo 10000 once they outgrow the four-column field.
/// Residues stay distinct in tleap since segments end with `TER`.
fn wrap_residue_id(residue_id: i32) -> i32 {
    if (-999..=9999).contains(&residue_id) {
        residue_id
    } else {
        residue_id.rem_euclid(10_000)
    }
}

/// Atom names shorter than four characters start in column 14 unless the
/// element symbol has two letters.
fn format_atom_name(name: &str, element: &str) -> String {
    if name.len() >= 4 || element.len() == 2 {
        format!("{:<4}", truncate(name, 4))
    } else {
        format!(" {name:<3}")
    }
}

fn truncate(value: &str, width: usize) -> &str {
    match value.char_indices().nth(width) {
        Some((end, _)) => &value[..end],
        None => value,
    }
}
