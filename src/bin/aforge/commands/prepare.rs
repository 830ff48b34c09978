use std::io::{self, Write};

use anyhow::{Context, Result, bail};

use amber_forge::Structure;
use amber_forge::prep::{self, PrepareConfig, Prepared};

use crate::cli::PrepareArgs;
use crate::config::{build_prepare_config, load_rules};
use crate::display::{
    Context as DisplayContext, Progress, print_bonds, print_cap_report, print_segment_breakdown,
    print_structure_info,
};
use crate::io::{read_structure, stdin_is_tty, stdout_is_tty, write_structure};
use crate::util::text::plural;

const TOTAL_STEPS: u8 = 3;

pub fn run_prepare(args: PrepareArgs, ctx: DisplayContext) -> Result<()> {
    if args.io.input.is_none() && stdin_is_tty() {
        bail!(
            "No input file specified and stdin is a terminal.\n\nUsage: aforge prepare -i <INPUT> or pipe data via stdin."
        );
    }
    if args.output.is_none() && stdout_is_tty() {
        bail!(
            "No output file specified and stdout is a terminal.\n\nUsage: aforge prepare -i <INPUT> -o <OUTPUT> or pipe output."
        );
    }

    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    progress.step("Reading structure");
    let structure = read_structure(args.io.input.as_deref())?;
    let read_substeps = build_read_substeps(&structure);
    let read_substeps_ref: Vec<&str> = read_substeps.iter().map(|s| s.as_str()).collect();
    progress.complete_step("Reading structure", &read_substeps_ref);

    if ctx.interactive {
        print_structure_info(&structure);
        print_segment_breakdown(&structure);
    }

    progress.step("Preparing topology");
    let config = build_prepare_config(&args.prep);
    let rules = load_rules(args.prep.rules.as_deref())?;
    let prepared =
        prep::prepare(&structure, rules.as_ref(), &config).context("Preparation failed")?;

    let prep_substeps = build_prep_substeps(&config, &prepared);
    let prep_substeps_ref: Vec<&str> = prep_substeps.iter().map(|s| s.as_str()).collect();
    progress.complete_step("Preparing topology", &prep_substeps_ref);

    if ctx.interactive {
        print_cap_report(&prepared.caps);
    }

    progress.step("Writing output");
    write_structure(args.output.as_deref(), &prepared.structure)?;
    let target = args
        .output
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());
    let write_substep = format!("Write PDB → {target}");
    progress.complete_step("Writing output", &[write_substep.as_str()]);

    progress.finish();

    if ctx.interactive {
        print_bonds(&prepared.bonds);
    } else if !prepared.bonds.is_empty() {
        // stdout may carry the PDB itself
        let mut out: Box<dyn Write> = if args.output.is_some() {
            Box::new(io::stdout().lock())
        } else {
            Box::new(io::stderr().lock())
        };
        for bond in &prepared.bonds {
            writeln!(out, "{bond}")?;
        }
    }

    Ok(())
}

fn build_read_substeps(structure: &Structure) -> Vec<String> {
    let mut steps = vec!["Parse PDB file".to_string()];
    steps.push(format!(
        "{}, {}, {}",
        plural(structure.atom_count(), "atom"),
        plural(structure.residue_count(), "residue"),
        plural(structure.segments().len(), "segment")
    ));
    if structure.frame_count() > 1 {
        steps.push(format!("{} coordinate frames", structure.frame_count()));
    }
    steps
}

fn build_prep_substeps(config: &PrepareConfig, prepared: &Prepared<Structure>) -> Vec<String> {
    let mut steps = Vec::new();

    let conversion = &prepared.conversion;
    if conversion.matched_atoms > 0 {
        steps.push(format!(
            "Convert {} residue(s) to AMBER naming ({} atoms)",
            conversion.converted_residues, conversion.matched_atoms
        ));
        steps.push(format!(
            "Re-segment {} instance(s) as {}1..{}{}",
            conversion.instances,
            config.segment_prefix,
            config.segment_prefix,
            conversion.instances
        ));
    } else {
        steps.push("Keep input naming (no conversion rules applied)".to_string());
    }

    let caps = &prepared.caps;
    steps.push(format!(
        "Apply {} cap(s), skip {}",
        caps.applied.len(),
        caps.skipped.len()
    ));
    if caps.removed_atoms > 0 {
        steps.push(format!(
            "Remove {} leftover terminal hydrogen(s)",
            caps.removed_atoms
        ));
    }

    if !prepared.bonds.is_empty() {
        steps.push(format!("Patch {}", plural(prepared.bonds.len(), "disulfide bridge")));
    }

    steps
}
