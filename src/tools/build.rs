use std::path::{Path, PathBuf};

use anyhow::Error;
use clap::{Parser, ValueHint};

use hazmat_format::ui::Reporter;
use hazmat_lang::{CompileStatus, Solution, DEFAULT_SOLUTION_TIMEOUT};

use crate::context::RuntimeContext;
use crate::error::CliError;
use crate::tools::compiler_flags;

#[derive(Parser, Debug, Clone)]
pub struct BuildOpt {
    /// Source file of the solution
    #[clap(value_hint = ValueHint::FilePath)]
    pub solution: PathBuf,

    /// Compile even if the executable is newer than the source
    #[clap(long, short)]
    pub force: bool,

    /// Flags for the compiler, replacing the default ones of the language
    #[clap(long, allow_hyphen_values = true)]
    pub flags: Option<String>,
}

pub fn main_build(opt: BuildOpt, config: Option<&Path>) -> Result<(), Error> {
    let context = RuntimeContext::new(config)?;
    let flags = compiler_flags(opt.flags.as_deref())?;
    let mut solution = Solution::new(&opt.solution, &context.config, DEFAULT_SOLUTION_TIMEOUT)?;
    let mut reporter = Reporter::stdout(3);
    match solution.compile(&context.runner, flags.as_deref(), opt.force)? {
        CompileStatus::NotRequired | CompileStatus::UpToDate => {
            reporter.info(format!("No need to compile {}", solution.name()));
        }
        CompileStatus::Compiled => {
            reporter.success(format!(
                "Compiled {} into {}",
                solution.name(),
                solution.executable.display()
            ));
        }
        CompileStatus::Failed => {
            return Err(CliError::CompilationFailed(solution.source).into());
        }
    }
    Ok(())
}
