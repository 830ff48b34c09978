mod build;
mod list_ff;
mod prepare;

use build::run_build;
use list_ff::run_list_ff;
use prepare::run_prepare;

use anyhow::Result;

use crate::cli::Command;
use crate::display::Context;

pub fn dispatch(command: Command, ctx: Context) -> Result<()> {
    match command {
        Command::Prepare(args) => run_prepare(args, ctx),
        Command::Build(args) => run_build(args, ctx),
        Command::ListFf(args) => run_list_ff(args, ctx),
    }
}
