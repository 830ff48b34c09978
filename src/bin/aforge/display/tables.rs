use std::io::{self, Write};
use std::path::Path;

use amber_forge::prep::{BondDirective, CapReport, segment_summary};
use amber_forge::{BuildOutcome, ResidueCategory, Structure};

use crate::util::text::truncate;

const INDENT: &str = "      ";

const BOX_INNER_WIDTH: usize = 62;
const SAFE_TABLE_WIDTH: usize = BOX_INNER_WIDTH - INDENT.len();

/// Column alignment in [`print_table`].
#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Column {
    header: &'static str,
    width: usize,
    align: Align,
}

impl Column {
    const fn left(header: &'static str, width: usize) -> Self {
        Self {
            header,
            width,
            align: Align::Left,
        }
    }

    const fn right(header: &'static str, width: usize) -> Self {
        Self {
            header,
            width,
            align: Align::Right,
        }
    }

    fn cell(&self, text: &str) -> String {
        let text = truncate(text, self.width);
        match self.align {
            Align::Left => format!("{:<w$}", text, w = self.width),
            Align::Right => format!("{:>w$}", text, w = self.width),
        }
    }
}

pub fn print_structure_info(structure: &Structure) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let mut rows = vec![
        ("Total Atoms", structure.atom_count().to_string()),
        ("Residues", structure.residue_count().to_string()),
        ("Segments", structure.segments().len().to_string()),
    ];
    if structure.frame_count() > 1 {
        rows.push(("Frames", structure.frame_count().to_string()));
    }
    let hetero = structure
        .records
        .iter()
        .filter(|r| **r == amber_forge::RecordKind::Hetatm)
        .count();
    if hetero > 0 {
        rows.push(("HETATM Records", hetero.to_string()));
    }

    print_kv_table(&mut out, "Structure Summary", &rows);
}

pub fn print_segment_breakdown(structure: &Structure) {
    let summary = segment_summary(structure);
    if summary.is_empty() {
        return;
    }

    let count = |counts: &std::collections::BTreeMap<ResidueCategory, usize>, category: ResidueCategory| {
        counts.get(&category).copied().unwrap_or(0).to_string()
    };
    let rows: Vec<Vec<String>> = summary
        .iter()
        .map(|(segment, counts)| {
            let label = if segment.is_empty() {
                "(none)".to_string()
            } else {
                segment.clone()
            };
            vec![
                label,
                count(counts, ResidueCategory::Protein),
                count(counts, ResidueCategory::Water),
                count(counts, ResidueCategory::Other),
            ]
        })
        .collect();

    let columns = [
        Column::left("Segment", 10),
        Column::right("Protein", 10),
        Column::right("Water", 10),
        Column::right("Other", SAFE_TABLE_WIDTH.saturating_sub(10 + 10 + 10 + 12)),
    ];

    let stderr = io::stderr();
    let mut out = stderr.lock();
    print_table(&mut out, "Segment Breakdown (residues)", &columns, &rows);
}

pub fn print_cap_report(report: &CapReport) {
    if report.applied.is_empty() && report.skipped.is_empty() {
        return;
    }

    let mut rows: Vec<Vec<String>> = report
        .applied
        .iter()
        .map(|cap| {
            vec![
                cap.segment_id.clone(),
                cap.terminus.to_string(),
                cap.residue_id.to_string(),
                format!("applied {}", cap.cap),
            ]
        })
        .collect();
    rows.extend(report.skipped.iter().map(|cap| {
        vec![
            cap.segment_id.clone(),
            cap.terminus.to_string(),
            cap.residue_id.to_string(),
            cap.reason.to_string(),
        ]
    }));

    let columns = [
        Column::left("Segment", 8),
        Column::left("Terminus", 10),
        Column::right("Residue", 8),
        Column::left("Status", SAFE_TABLE_WIDTH.saturating_sub(8 + 10 + 8 + 12)),
    ];

    let stderr = io::stderr();
    let mut out = stderr.lock();
    print_table(&mut out, "Terminal Caps", &columns, &rows);
    if report.removed_atoms > 0 {
        let _ = writeln!(
            out,
            "{}  {} leftover terminal hydrogen(s) removed",
            INDENT, report.removed_atoms
        );
    }
}

pub fn print_bonds(bonds: &[BondDirective]) {
    if bonds.is_empty() {
        return;
    }

    let rows: Vec<Vec<String>> = bonds
        .iter()
        .map(|bond| {
            vec![
                bond.first.residue.to_string(),
                bond.second.residue.to_string(),
                bond.to_string(),
            ]
        })
        .collect();

    let columns = [
        Column::left("First", 9),
        Column::left("Second", 9),
        Column::left("Directive", SAFE_TABLE_WIDTH.saturating_sub(9 + 9 + 10)),
    ];

    let stderr = io::stderr();
    let mut out = stderr.lock();
    print_table(&mut out, "Disulfide Bridges", &columns, &rows);
}

pub fn print_build_summary(outdir: &Path, outcome: &BuildOutcome) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let file_name = |path: &Path| {
        path.file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned()
    };

    let mut rows = vec![
        ("Directory", outdir.display().to_string()),
        ("Script", file_name(&outcome.script)),
        ("Input PDB", file_name(&outcome.pdb)),
        ("Atoms", outcome.structure.atom_count().to_string()),
    ];
    match &outcome.products {
        Some(products) => {
            rows.push(("Topology", file_name(&products.topology)));
            rows.push(("Coordinates", file_name(&products.coordinates)));
            rows.push(("Log", file_name(&products.log)));
        }
        None => rows.push(("tleap", "not run (dry run)".to_string())),
    }

    print_kv_table(&mut out, "Build Output", &rows);
}

pub fn print_forcefields(dir: &Path, count: usize) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let rows = [
        ("Directory", dir.display().to_string()),
        ("Files", count.to_string()),
    ];
    print_kv_table(&mut out, "Force Fields", &rows);
}

fn print_table(out: &mut impl Write, title: &str, columns: &[Column], rows: &[Vec<String>]) {
    let rule = |left: &str, mid: &str, right: &str| {
        let parts: Vec<String> = columns.iter().map(|c| "─".repeat(c.width + 2)).collect();
        format!("{}{}{}{}", INDENT, left, parts.join(mid), right)
    };
    let line = |cells: Vec<String>| format!("{}│ {} │", INDENT, cells.join(" │ "));

    let _ = writeln!(
        out,
        "{}┌─ {} ─┐",
        INDENT,
        truncate(title, SAFE_TABLE_WIDTH - 6)
    );
    let _ = writeln!(out, "{}", rule("┌", "┬", "┐"));
    let _ = writeln!(
        out,
        "{}",
        line(columns.iter().map(|c| c.cell(c.header)).collect())
    );
    let _ = writeln!(out, "{}", rule("├", "┼", "┤"));

    for row in rows.iter().take(20) {
        let cells = columns
            .iter()
            .enumerate()
            .map(|(i, c)| c.cell(row.get(i).map(String::as_str).unwrap_or("")))
            .collect();
        let _ = writeln!(out, "{}", line(cells));
    }

    if rows.len() > 20 {
        let more = format!("({} more)", rows.len() - 20);
        let cells = columns
            .iter()
            .enumerate()
            .map(|(i, c)| c.cell(if i == 0 { "..." } else if i == 1 { more.as_str() } else { "" }))
            .collect();
        let _ = writeln!(out, "{}", line(cells));
    }

    let _ = writeln!(out, "{}", rule("└", "┴", "┘"));
}

fn print_kv_table(out: &mut impl Write, title: &str, rows: &[(&str, String)]) {
    let key_w = 16usize;
    let sep_overhead = 6;
    let columns = [
        Column::left("Metric", key_w),
        Column::right("Value", SAFE_TABLE_WIDTH.saturating_sub(key_w + sep_overhead)),
    ];
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|(key, value)| vec![key.to_string(), value.clone()])
        .collect();

    print_table(out, title, &columns, &rows);
}
