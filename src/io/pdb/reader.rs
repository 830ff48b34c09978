use crate::io::error::Error;
use crate::model::structure::{AtomRecord, RecordKind, Structure};
use log::debug;
use std::io::BufRead;
use std::ops::Range;

/// Reads `ATOM`/`HETATM` records into a [`Structure`].
///
/// The first `MODEL` defines the atoms; every further model only contributes
/// a coordinate frame and must hold the same number of atoms. Residue names
/// are read from columns 18-21 so the four-letter names of lipids and water
/// (`POPC`, `TIP3`) survive. Records other than atoms are ignored.
pub fn read<R: BufRead>(reader: R) -> Result<Structure, Error> {
    let mut structure = Structure::new();
    let mut model = 0usize;
    let mut frame: Vec<[f64; 3]> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;

        if line.starts_with("MODEL") {
            model += 1;
            frame.clear();
            continue;
        }
        if line.starts_with("ENDMDL") {
            if model > 1 {
                finish_model(&mut structure, model, std::mem::take(&mut frame))?;
            }
            continue;
        }
        if line.starts_with("END") && !line.starts_with("ENDMDL") {
            break;
        }

        let record = if line.starts_with("ATOM") {
            RecordKind::Atom
        } else if line.starts_with("HETATM") {
            RecordKind::Hetatm
        } else {
            continue;
        };

        let position = parse_position(&line, line_no)?;
        if model > 1 {
            frame.push(position);
            continue;
        }

        structure.push(parse_atom(&line, line_no, record, position)?);
    }

    if model > 1 && !frame.is_empty() {
        finish_model(&mut structure, model, frame)?;
    }

    debug!(
        "Read {} atoms in {} frame(s)",
        structure.atom_count(),
        structure.frame_count()
    );
    Ok(structure)
}

fn finish_model(
    structure: &mut Structure,
    model: usize,
    frame: Vec<[f64; 3]>,
) -> Result<(), Error> {
    let found = frame.len();
    structure.add_frame(frame).map_err(|e| Error::ModelSize {
        model,
        expected: e.expected,
        found,
    })
}

fn field(line: &str, range: Range<usize>) -> &str {
    let end = range.end.min(line.len());
    let start = range.start.min(end);
    line.get(start..end).unwrap_or("").trim()
}

fn single_char(line: &str, column: usize) -> char {
    line.get(column..column + 1)
        .and_then(|s| s.chars().next())
        .unwrap_or(' ')
}

fn parse_position(line: &str, line_no: usize) -> Result<[f64; 3], Error> {
    let coordinate = |range: Range<usize>, axis: &str| {
        field(line, range)
            .parse::<f64>()
            .map_err(|_| Error::parse(line_no, format!("invalid {axis} coordinate")))
    };
    Ok([
        coordinate(30..38, "x")?,
        coordinate(38..46, "y")?,
        coordinate(46..54, "z")?,
    ])
}

fn parse_optional_f64(
    line: &str,
    range: Range<usize>,
    default: f64,
    line_no: usize,
    what: &str,
) -> Result<f64, Error> {
    let raw = field(line, range);
    if raw.is_empty() {
        return Ok(default);
    }
    raw.parse::<f64>()
        .map_err(|_| Error::parse(line_no, format!("invalid {what} '{raw}'")))
}

fn parse_atom(
    line: &str,
    line_no: usize,
    record: RecordKind,
    position: [f64; 3],
) -> Result<AtomRecord, Error> {
    let name = field(line, 12..16);
    if name.is_empty() {
        return Err(Error::parse(line_no, "missing atom name"));
    }
    let residue_id = field(line, 22..26)
        .parse::<i32>()
        .map_err(|_| Error::parse(line_no, "invalid residue number"))?;
    let occupancy = parse_optional_f64(line, 54..60, 1.0, line_no, "occupancy")?;
    let beta = parse_optional_f64(line, 60..66, 0.0, line_no, "temperature factor")?;

    let mut atom = AtomRecord::new(name, field(line, 17..21), residue_id, field(line, 72..76))
        .insertion_code(single_char(line, 26))
        .chain_id(single_char(line, 21))
        .element(field(line, 76..78))
        .occupancy(occupancy)
        .beta(beta)
        .position(position);
    if record == RecordKind::Hetatm {
        atom = atom.hetero();
    }
    Ok(atom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const MEMBRANE: &str = "\
REMARK  two frames of a tiny membrane patch
MODEL        1
ATOM      1  N   ALA A   1      11.104   6.134  -6.504  1.00  0.00      PROT N
ATOM      2  CA  ALA A   1A     11.639   6.071  -5.147  1.00 12.50      PROT C
HETATM    3  N   POPC    1       0.000   1.000   2.000  0.50  0.00      MEMB N
ATOM      4  OH2 TIP3    7      -1.500   0.250   3.125                  WT1  O
ENDMDL
MODEL        2
ATOM      1  N   ALA A   1      12.104   6.134  -6.504  1.00  0.00      PROT N
ATOM      2  CA  ALA A   1A     12.639   6.071  -5.147  1.00 12.50      PROT C
HETATM    3  N   POPC    1       1.000   1.000   2.000  0.50  0.00      MEMB N
ATOM      4  OH2 TIP3    7      -0.500   0.250   3.125                  WT1  O
ENDMDL
END
";

    #[test]
    fn reads_columns_and_frames() {
        let s = read(Cursor::new(MEMBRANE)).unwrap();

        assert_eq!(s.atom_count(), 4);
        assert_eq!(s.frame_count(), 2);
        assert!(s.is_consistent());

        assert_eq!(s.names, vec!["N", "CA", "N", "OH2"]);
        assert_eq!(s.residue_names, vec!["ALA", "ALA", "POPC", "TIP3"]);
        assert_eq!(s.residue_ids, vec![1, 1, 1, 7]);
        assert_eq!(s.insertion_codes, vec![' ', 'A', ' ', ' ']);
        assert_eq!(s.chain_ids, vec!['A', 'A', ' ', ' ']);
        assert_eq!(s.segment_ids, vec!["PROT", "PROT", "MEMB", "WT1"]);
        assert_eq!(s.elements, vec!["N", "C", "N", "O"]);
        assert_eq!(s.records[2], RecordKind::Hetatm);
        assert_eq!(s.occupancies[2], 0.5);
        assert_eq!(s.occupancies[3], 1.0);
        assert_eq!(s.betas[1], 12.5);

        assert_eq!(s.frames[0][0], [11.104, 6.134, -6.504]);
        assert_eq!(s.frames[1][0], [12.104, 6.134, -6.504]);
        assert_eq!(s.frames[1][3], [-0.5, 0.25, 3.125]);
    }

    #[test]
    fn reads_files_without_models() {
        let src = "ATOM      1  SG  CYS P  10       1.000   2.000   3.000\n";
        let s = read(Cursor::new(src)).unwrap();
        assert_eq!(s.atom_count(), 1);
        assert_eq!(s.frame_count(), 1);
        assert_eq!(s.segment_ids[0], "");
        assert_eq!(s.residue_ids[0], 10);
    }

    #[test]
    fn reports_the_offending_line() {
        let src = "REMARK\nATOM      1  SG  CYS P  10       1.000   abc     3.000\n";
        match read(Cursor::new(src)).unwrap_err() {
            Error::Parse { line, details } => {
                assert_eq!(line, 2);
                assert!(details.contains("y coordinate"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_models_of_different_size() {
        let src = "\
MODEL        1
ATOM      1  N   ALA A   1       0.000   0.000   0.000
ATOM      2  CA  ALA A   1       0.000   0.000   0.000
ENDMDL
MODEL        2
ATOM      1  N   ALA A   1       0.000   0.000   0.000
ENDMDL
";
        assert!(matches!(
            read(Cursor::new(src)),
            Err(Error::ModelSize {
                model: 2,
                expected: 2,
                found: 1
            })
        ));
    }
}
