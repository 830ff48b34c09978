use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "aforge",
    about = "AMBER topology preparation and tleap builds",
    version,
    author,
    before_help = crate::display::banner_for_help(),
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert, cap and patch a structure and write the prepared PDB
    #[command(visible_alias = "p")]
    Prepare(PrepareArgs),

    /// Prepare a structure and build AMBER topology/coordinates with tleap
    #[command(visible_alias = "b")]
    Build(BuildArgs),

    /// List the force field leaprc files shipped with AmberTools
    #[command(name = "list-ff")]
    ListFf(ListFfArgs),
}

impl Command {
    pub fn log(&self) -> &LogOptions {
        match self {
            Command::Prepare(args) => &args.io.log,
            Command::Build(args) => &args.io.log,
            Command::ListFf(args) => &args.log,
        }
    }
}

/// I/O options shared by the structure commands.
#[derive(Args)]
pub struct IoOptions {
    /// Input PDB file (stdin if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    #[command(flatten)]
    pub log: LogOptions,
}

/// Output verbosity shared by all commands.
#[derive(Args)]
pub struct LogOptions {
    /// Suppress progress output (for scripting)
    #[arg(short, long)]
    pub quiet: bool,

    /// Log each preparation stage (repeat for debug output)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Structure preparation options shared by both commands.
#[derive(Args)]
#[command(next_help_heading = "Preparation")]
pub struct PrepOptions {
    /// Lipid conversion rule file (charmmlipid2amber CSV)
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Prefix of the segment ids given to converted lipid instances
    #[arg(long = "seg-prefix", value_name = "PREFIX")]
    pub segment_prefix: Option<String>,

    /// Terminal caps for a segment (SEG:NCAP:CCAP, empty cap to skip), repeatable
    ///
    /// Without any --cap, every protein segment gets ACE:NME.
    #[arg(long = "cap", value_name = "SEG:N:C", action = clap::ArgAction::Append)]
    pub caps: Vec<CapArg>,

    /// Do not cap any terminus
    #[arg(long = "no-caps", conflicts_with = "caps")]
    pub no_caps: bool,

    /// Disulfide bridge between two residues (SEG:RES:SEG:RES), repeatable
    #[arg(long = "ss", value_name = "SEG:RES:SEG:RES", action = clap::ArgAction::Append)]
    pub disulfides: Vec<DisulfideArg>,
}

#[derive(Args)]
pub struct PrepareArgs {
    #[command(flatten)]
    pub io: IoOptions,

    /// Output PDB file (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub prep: PrepOptions,
}

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub io: IoOptions,

    /// Output directory for the script, input PDB and build products
    #[arg(short = 'd', long = "outdir", value_name = "DIR")]
    pub outdir: PathBuf,

    /// Build configuration (TOML); command-line options take precedence
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub prep: PrepOptions,

    #[command(flatten)]
    pub leap: LeapOptions,
}

#[derive(Args)]
pub struct ListFfArgs {
    /// AmberTools installation to search (defaults to $AMBERHOME)
    #[arg(long, value_name = "DIR")]
    pub amberhome: Option<PathBuf>,

    #[command(flatten)]
    pub log: LogOptions,
}

#[derive(Args)]
#[command(next_help_heading = "tleap")]
pub struct LeapOptions {
    /// Force field leaprc to source, repeatable (replaces the defaults)
    #[arg(long = "ff", value_name = "LEAPRC", action = clap::ArgAction::Append)]
    pub forcefields: Vec<String>,

    /// prepi topology to load, repeatable
    #[arg(long = "topo", value_name = "FILE", action = clap::ArgAction::Append)]
    pub topologies: Vec<PathBuf>,

    /// frcmod parameter file to load, repeatable
    #[arg(long = "param", value_name = "FILE", action = clap::ArgAction::Append)]
    pub parameters: Vec<PathBuf>,

    /// Stem of the generated .prmtop/.crd files
    #[arg(long, value_name = "NAME")]
    pub prefix: Option<String>,

    /// tleap executable name or path
    #[arg(long, value_name = "PATH")]
    pub tleap: Option<PathBuf>,

    /// Write tleap.in and input.pdb without running tleap
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

/// `SEG:NCAP:CCAP`, e.g. `P:ACE:NME` or `P:ACE:`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapArg {
    pub segment_id: String,
    pub n: Option<String>,
    pub c: Option<String>,
}

impl FromStr for CapArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let [segment_id, n, c] = parts.as_slice() else {
            return Err(format!("invalid cap '{s}' (expected SEG:NCAP:CCAP)"));
        };
        if segment_id.is_empty() {
            return Err(format!("invalid cap '{s}': segment id is empty"));
        }
        let cap = |name: &str| (!name.is_empty()).then(|| name.to_uppercase());
        Ok(Self {
            segment_id: segment_id.to_string(),
            n: cap(n),
            c: cap(c),
        })
    }
}

/// `SEG:RES:SEG:RES`, e.g. `P:10:P:40`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisulfideArg {
    pub first: (String, i32),
    pub second: (String, i32),
}

impl FromStr for DisulfideArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let [seg_a, res_a, seg_b, res_b] = parts.as_slice() else {
            return Err(format!("invalid disulfide '{s}' (expected SEG:RES:SEG:RES)"));
        };
        let residue = |value: &str| {
            value
                .trim()
                .parse::<i32>()
                .map_err(|_| format!("invalid residue id '{value}' in disulfide '{s}'"))
        };
        Ok(Self {
            first: (seg_a.to_string(), residue(res_a)?),
            second: (seg_b.to_string(), residue(res_b)?),
        })
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_arg_with_both_caps() {
        let cap: CapArg = "P:ace:NME".parse().unwrap();
        assert_eq!(cap.segment_id, "P");
        assert_eq!(cap.n.as_deref(), Some("ACE"));
        assert_eq!(cap.c.as_deref(), Some("NME"));
    }

    #[test]
    fn cap_arg_with_empty_cap() {
        let cap: CapArg = "A::NME".parse().unwrap();
        assert_eq!(cap.n, None);
        assert_eq!(cap.c.as_deref(), Some("NME"));
    }

    #[test]
    fn cap_arg_rejects_wrong_shape() {
        assert!("P:ACE".parse::<CapArg>().is_err());
        assert!(":ACE:NME".parse::<CapArg>().is_err());
    }

    #[test]
    fn disulfide_arg_parses_residues() {
        let ss: DisulfideArg = "P:10:Q:-2".parse().unwrap();
        assert_eq!(ss.first, ("P".to_string(), 10));
        assert_eq!(ss.second, ("Q".to_string(), -2));
    }

    #[test]
    fn disulfide_arg_rejects_bad_residue() {
        assert!("P:x:P:40".parse::<DisulfideArg>().is_err());
        assert!("P:10:P".parse::<DisulfideArg>().is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
