use std::io::{self, Write};

use anyhow::Error;

use amber_forge::{BuildError, IoError, PrepError};

use crate::util::text::wrap;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    let msg = err.to_string();
    for line in wrap(&msg, 59) {
        let _ = writeln!(stderr, "   ║  {:<59} ║", line);
    }

    let mut source = err.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap(&cause.to_string(), 59) {
            let _ = writeln!(stderr, "   ║    {:<57} ║", line);
        }
        source = cause.source();
    }

    if let Some(hints) = HintCollector::collect(err) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in hints {
            let wrapped = wrap(&hint, 55);
            if let Some((first, rest)) = wrapped.split_first() {
                let _ = writeln!(stderr, "   ║    • {:<55} ║", first);
                for line in rest {
                    let _ = writeln!(stderr, "   ║      {:<55} ║", line);
                }
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

struct HintCollector {
    hints: Vec<String>,
    has_typed_hints: bool,
}

impl HintCollector {
    fn new() -> Self {
        Self {
            hints: Vec::new(),
            has_typed_hints: false,
        }
    }

    fn collect(err: &Error) -> Option<Vec<String>> {
        let mut collector = Self::new();

        if let Some(build_err) = find::<BuildError>(err) {
            collector.collect_build_hints(build_err);
        } else if let Some(prep_err) = find::<PrepError>(err) {
            collector.collect_prep_hints(prep_err);
        } else if let Some(io_err) = find::<IoError>(err) {
            collector.collect_io_hints(io_err);
        }

        if !collector.has_typed_hints {
            collector.collect_fallback_hints(err);
        }

        if collector.hints.is_empty() {
            None
        } else {
            Some(collector.hints)
        }
    }

    fn add(&mut self, hint: impl Into<String>) {
        self.hints.push(hint.into());
    }

    fn mark_typed(&mut self) {
        self.has_typed_hints = true;
    }

    fn collect_io_hints(&mut self, io_err: &IoError) {
        self.mark_typed();

        match io_err {
            IoError::Io { source } => self.collect_std_io_hints(source),

            IoError::Parse { line, .. } => {
                self.add(format!("The PDB parser stopped near line {}", line));
                self.add("Check ATOM/HETATM record formatting (columns 1-80)");
                self.add("Coordinates belong in columns 31-54, segment ids in 73-76");
            }

            IoError::ModelSize { model, .. } => {
                self.add(format!(
                    "MODEL {} lists a different set of atoms than the first model",
                    model
                ));
                self.add("Every model of a trajectory PDB must describe the same atoms");
            }

            IoError::MissingFrame { frame, count } => {
                self.add(format!(
                    "Frame {} was requested but the structure holds {}",
                    frame, count
                ));
            }
        }
    }

    fn collect_std_io_hints(&mut self, source: &std::io::Error) {
        use std::io::ErrorKind;

        match source.kind() {
            ErrorKind::NotFound => {
                self.add("File or directory not found");
                self.add("Check the path spelling and ensure the file exists");
            }

            ErrorKind::PermissionDenied => {
                self.add("Permission denied accessing the file");
                self.add("Check file permissions with `ls -la`");
            }

            ErrorKind::InvalidData => {
                self.add("File contains invalid or corrupt data");
                self.add("Verify the file is plain-text PDB and not truncated");
            }

            ErrorKind::BrokenPipe => {
                self.add("Broken pipe: the output consumer terminated");
                self.add("This may occur when piping to commands like `head`");
            }

            _ => {
                self.add("I/O operation failed");
                self.add("Check file path, permissions, and disk space");
            }
        }
    }

    fn collect_prep_hints(&mut self, prep_err: &PrepError) {
        self.mark_typed();

        match prep_err {
            PrepError::RuleFileNotFound { .. } => {
                self.add("Point --rules at a charmmlipid2amber-style CSV file");
                self.add("Omit --rules to keep the input naming unchanged");
            }

            PrepError::RuleRead(source) => self.collect_std_io_hints(source),

            PrepError::RuleParse { line, .. } => {
                self.add(format!("Inspect line {} of the rule file", line));
                self.add("Rows need: \"ATOM RES\",\"ATOM RES\",position,atom count,TER flag");
                self.add("The first line is a comment and the second the header");
            }

            PrepError::InconsistentResidueLayout { residue_name, .. } => {
                self.add(format!(
                    "Every atom of {} must appear in the rule table",
                    residue_name
                ));
                self.add("Check for missing or renamed atoms (e.g. hydrogens)");
                self.add("The rule table may target a different lipid topology version");
            }

            PrepError::UnpairedTerminals { .. } => {
                self.add("Each lipid instance needs one head and one tail residue in order");
                self.add("Look for truncated lipids at the edges of the system");
            }

            PrepError::TooManyInstances { limit, .. } => {
                self.add(format!(
                    "Segment ids can number at most {} lipid instances",
                    limit
                ));
                self.add("Split the membrane into smaller systems");
            }
            PrepError::SegmentIdTooLong { width, .. } => {
                self.add(format!(
                    "PDB segment ids hold {width} characters, prefix included"
                ));
                self.add("Pass a one-letter prefix with --seg-prefix");
            }

            PrepError::MissingSegmentIds { .. } => {
                self.add("Every atom needs a segment id in PDB columns 73-76");
                self.add("Assign segment ids with your structure editor before preparing");
            }

            PrepError::MissingSegment { segment_id } => {
                self.add(format!(
                    "Check the segment id '{}' given to --cap",
                    segment_id
                ));
                self.add("Segment ids are case-sensitive and read from PDB columns 73-76");
            }

            PrepError::NonProteinSegment { .. } => {
                self.add("Only protein segments can be capped");
                self.add("Use --cap only for protein segments, or --no-caps");
            }

            PrepError::UnsupportedCap { supported, .. } => {
                self.add(format!("Use '{}' for this terminus", supported));
                self.add("Leave the cap empty (e.g. --cap P:ACE:) to skip a terminus");
            }

            PrepError::MissingTerminalAtom { candidates, .. } => {
                self.add(format!(
                    "The terminal residue needs one of: {}",
                    candidates
                ));
                self.add("Add hydrogens / terminal oxygens, or skip this cap");
            }

            PrepError::AmbiguousDisulfideSite { found, .. } => {
                if *found == 0 {
                    self.add("No residue matches this --ss site; check segment and residue id");
                } else {
                    self.add("Several residues share this id (insertion codes?)");
                    self.add("Renumber the residues so each site is unique");
                }
            }

            PrepError::Permutation(_) => {
                self.add("An internal atom reordering was rejected");
                self.add("This may indicate a bug; please report if reproducible");
            }
        }
    }

    fn collect_build_hints(&mut self, build_err: &BuildError) {
        self.mark_typed();

        match build_err {
            BuildError::ConfigRead { .. } => {
                self.add("Check the path given to --config");
            }

            BuildError::ConfigParse(_) => {
                self.add("The build file has invalid TOML or unknown value types");
                self.add("Caps are two-element arrays, e.g. P = [\"ACE\", \"NME\"]");
            }

            BuildError::ToolNotFound { name } => {
                self.add(format!("Install AmberTools so that '{}' is on PATH", name));
                self.add("Or pass its location with --tleap");
                self.add("Use --dry-run to only write tleap.in and input.pdb");
            }

            BuildError::AmberHomeUnset => {
                self.add("Source amber.sh from your AmberTools installation");
                self.add("Or pass the installation directory with --amberhome");
            }

            BuildError::MissingInput { .. } => {
                self.add("Check the paths given to --topo and --param");
            }

            BuildError::MissingIonizer => {
                self.add("No ionizer ships with aforge; set ionize = false");
            }

            BuildError::Io { source, .. } => self.collect_std_io_hints(source),

            BuildError::ToolLaunch { .. } => {
                self.add("tleap was found but could not be started");
                self.add("Check that the executable is not corrupt and is runnable");
            }

            BuildError::MissingProducts { .. } => {
                self.add("tleap ran but wrote no topology; its log lists the cause");
                self.add("Common causes: unknown residues, missing frcmod/prepi files");
            }

            BuildError::Ionization(_) => {
                self.add("The ionizer rejected the structure");
            }

            BuildError::Prepare(prep_err) => self.collect_prep_hints(prep_err),

            BuildError::Structure(io_err) => self.collect_io_hints(io_err),
        }
    }

    fn collect_fallback_hints(&mut self, err: &Error) {
        let msg = error_chain_text(err);

        if msg.contains("terminal") || msg.contains("stdin") || msg.contains("tty") {
            self.add("Input appears to be from a terminal");
            self.add("Provide input via -i/--input or pipe data to stdin");
            return;
        }

        if msg.contains("no such file") || msg.contains("not found") {
            self.add("Check that the file path is correct");
            self.add("Verify the file exists and is readable");
            return;
        }

        if msg.contains("permission denied") {
            self.add("Check file permissions with `ls -la`");
            self.add("Ensure you have the required access rights");
        }
    }
}

fn find<T: std::error::Error + 'static>(err: &Error) -> Option<&T> {
    err.chain().find_map(|cause| cause.downcast_ref::<T>())
}

fn error_chain_text(err: &Error) -> String {
    let mut text = String::new();

    text.push_str(&err.to_string());

    let mut source = err.source();
    while let Some(cause) = source {
        text.push('\n');
        text.push_str(&cause.to_string());
        source = cause.source();
    }

    text.to_lowercase()
}
