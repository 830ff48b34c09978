use std::path::Path;

use anyhow::{Context, Result, bail};

use amber_forge::{
    BuildConfig, BuildError, BuildOutcome, BuildSession, LeapRunner, Structure, TleapProcess,
};

use crate::cli::BuildArgs;
use crate::config::build_build_config;
use crate::display::{
    Context as DisplayContext, Progress, print_bonds, print_build_summary, print_cap_report,
    print_segment_breakdown, print_structure_info,
};
use crate::io::{read_structure, stdin_is_tty};
use crate::util::text::plural;

const TOTAL_STEPS: u8 = 3;

/// Stands in for tleap on dry runs, where the session never starts the tool.
struct DryRun;

impl LeapRunner for DryRun {
    fn run(&mut self, _workdir: &Path, _script: &str, _log: &Path) -> Result<(), BuildError> {
        Err(BuildError::ToolNotFound {
            name: "tleap".to_string(),
        })
    }
}

pub fn run_build(args: BuildArgs, ctx: DisplayContext) -> Result<()> {
    if args.io.input.is_none() && stdin_is_tty() {
        bail!(
            "No input file specified and stdin is a terminal.\n\nUsage: aforge build -i <INPUT> -d <OUTDIR> or pipe data via stdin."
        );
    }

    let config = build_build_config(&args)?;

    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    progress.step("Reading structure");
    let structure = read_structure(args.io.input.as_deref())?;
    let read_substeps = [
        "Parse PDB file".to_string(),
        format!(
            "{}, {}, {}",
            plural(structure.atom_count(), "atom"),
            plural(structure.residue_count(), "residue"),
            plural(structure.segments().len(), "segment")
        ),
    ];
    let read_substeps_ref: Vec<&str> = read_substeps.iter().map(|s| s.as_str()).collect();
    progress.complete_step("Reading structure", &read_substeps_ref);

    if ctx.interactive {
        print_structure_info(&structure);
        print_segment_breakdown(&structure);
    }

    progress.step("Locating tleap");
    let tleap = if config.execute {
        Some(TleapProcess::locate(&config.tleap)?)
    } else {
        None
    };
    let tool_substep = match &tleap {
        Some(tool) => format!("Use {}", tool.executable().display()),
        None => "Dry run: tleap will not be executed".to_string(),
    };
    progress.complete_step("Locating tleap", &[tool_substep.as_str()]);

    progress.step("Building AMBER topology");
    let build_substeps = build_session_substeps(&config);
    let outcome = match tleap {
        Some(tool) => run_session(structure, config, &args.outdir, tool)?,
        None => run_session(structure, config, &args.outdir, DryRun)?,
    };
    let build_substeps_ref: Vec<&str> = build_substeps.iter().map(|s| s.as_str()).collect();
    progress.complete_step("Building AMBER topology", &build_substeps_ref);

    if ctx.interactive {
        print_cap_report(&outcome.caps);
        print_bonds(&outcome.bonds);
        print_build_summary(&args.outdir, &outcome);
    }

    progress.finish();

    Ok(())
}

fn run_session<R: LeapRunner>(
    structure: Structure,
    config: BuildConfig,
    outdir: &Path,
    runner: R,
) -> Result<BuildOutcome> {
    BuildSession::new(structure, config, outdir, runner)
        .context("Failed to start the build")?
        .run()
        .context("Build failed")
}

fn build_session_substeps(config: &BuildConfig) -> Vec<String> {
    let mut steps = Vec::new();

    match &config.rules {
        Some(rules) => steps.push(format!(
            "Convert lipids using {}",
            rules
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
        )),
        None => steps.push("Keep input naming".to_string()),
    }

    match &config.prepare.caps {
        Some(spec) if spec.is_empty() => steps.push("Skip terminal capping".to_string()),
        Some(spec) => steps.push(format!("Cap {}", plural(spec.len(), "segment"))),
        None => steps.push("Cap every protein segment with ACE/NME".to_string()),
    }

    if !config.prepare.disulfides.is_empty() {
        steps.push(format!(
            "Patch {} disulfide bridge(s)",
            config.prepare.disulfides.len()
        ));
    }

    steps.push(format!("Source {}", config.forcefields.join(", ")));

    if config.execute {
        steps.push(format!(
            "Write {0}.prmtop and {0}.crd",
            config.prefix
        ));
    } else {
        steps.push("Write tleap.in and input.pdb".to_string());
    }

    steps
}
