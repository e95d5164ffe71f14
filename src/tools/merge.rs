use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Error};
use clap::{Parser, ValueHint};
use itertools::Itertools;

use hazmat_exec::{resolve_program, Invocation, OutputTarget, RunError};
use hazmat_format::ui::Reporter;

use crate::context::RuntimeContext;
use crate::error::CliError;

#[derive(Parser, Debug, Clone)]
pub struct MergeOpt {
    /// Source file of the solution
    #[clap(value_hint = ValueHint::FilePath)]
    pub solution: PathBuf,

    /// Where to write the merged source
    #[clap(value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Overwrite the output if it exists
    #[clap(long, short)]
    pub force: bool,
}

pub fn main_merge(opt: MergeOpt, config: Option<&Path>) -> Result<(), Error> {
    let context = RuntimeContext::new(config)?;
    let profile = context.config.profile_for(&opt.solution)?;
    let command = profile.merge_command(&opt.solution, &opt.output)?;
    if !opt.solution.is_file() {
        return Err(CliError::MissingSource(opt.solution).into());
    }
    if opt.output.exists() && !opt.force {
        return Err(CliError::TargetExists(opt.output).into());
    }

    let mut invocation = Invocation::new(resolve_program(&command[0]));
    invocation
        .args(&command[1..])
        .stdout(OutputTarget::Inherit)
        .stderr(OutputTarget::Inherit);
    debug!("Merge command: {}", command.iter().join(" "));
    let outcome = match context.runner.run(&invocation) {
        Ok(outcome) => outcome,
        Err(RunError::Interrupted) => return Err(CliError::Interrupted.into()),
        Err(e) => return Err(e).context("Merging failed"),
    };
    if !outcome.status.is_ok() {
        bail!("Merging failed: the merge command exited with {}", outcome.status);
    }
    Reporter::stdout(3).success(format!(
        "Merged {} into {}",
        opt.solution.display(),
        opt.output.display()
    ));
    Ok(())
}
