use std::io::{self, Write};

use anyhow::{Context, Result};

use amber_forge::build::{amber_home, forcefield_dir, list_forcefields};

use crate::cli::ListFfArgs;
use crate::display::{Context as DisplayContext, print_forcefields};

pub fn run_list_ff(args: ListFfArgs, ctx: DisplayContext) -> Result<()> {
    let home = match args.amberhome {
        Some(dir) => dir,
        None => amber_home()?,
    };
    let names = list_forcefields(&home).context("Failed to list force field files")?;

    if ctx.interactive {
        print_forcefields(&forcefield_dir(&home), names.len());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for name in &names {
        writeln!(out, "{name}")?;
    }
    Ok(())
}
