use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Error};
use clap::{Parser, ValueHint};

use hazmat_exec::{Generator, Validator};
use hazmat_lang::Solution;

use crate::case_source::{default_zero_fill, numeric_range};
use crate::context::RuntimeContext;
use crate::opt::parse_seconds;
use crate::orchestrator::{LoopOutcome, TestOrchestrator};

#[derive(Parser, Debug, Clone)]
#[clap(trailing_var_arg = true)]
pub struct GenerateOpt {
    /// The solution that writes the outputs
    #[clap(value_hint = ValueHint::FilePath)]
    pub solution: PathBuf,

    /// Time limit of the solution, in seconds
    #[clap(long, short, default_value = "5", value_parser = parse_seconds)]
    pub timeout: Duration,

    /// Program that writes a new input on its standard output
    #[clap(long, short, value_hint = ValueHint::CommandName)]
    pub generator: PathBuf,

    /// Text written to the standard input of the generator
    #[clap(long, short, default_value = "")]
    pub message: String,

    /// Time limit of the generator, in seconds
    #[clap(long, value_parser = parse_seconds)]
    pub timeout_generator: Option<Duration>,

    /// Common prefix of the names of the tests
    #[clap(long)]
    pub prefix: String,

    /// First and last (excluded) number of the tests
    #[clap(long, num_args = 2, value_names = ["START", "END"], required = true)]
    pub range: Vec<u64>,

    /// Pad the numbers with zeros to this many digits. Defaults to the digits of the end of the
    /// range
    #[clap(long, short)]
    pub zero_fill: Option<usize>,

    /// Directory for both the inputs and the outputs
    #[clap(long, default_value = "Tests/", value_hint = ValueHint::DirPath)]
    pub dir: PathBuf,

    /// Separate directories for the inputs and the outputs
    #[clap(long, num_args = 2, value_names = ["IN", "OUT"], conflicts_with = "dir")]
    pub in_and_out: Option<Vec<PathBuf>>,

    /// Arguments to pass to the generator. The value '{}' will be replaced with a random seed.
    #[clap(num_args = 0..)]
    pub generator_args: Vec<String>,
}

impl GenerateOpt {
    /// The directories of the inputs and of the outputs.
    fn directories(&self) -> (PathBuf, PathBuf) {
        match self.in_and_out.as_deref() {
            Some([inputs, outputs]) => (inputs.clone(), outputs.clone()),
            _ => (self.dir.clone(), self.dir.clone()),
        }
    }
}

pub fn main_generate(opt: GenerateOpt, config: Option<&Path>) -> Result<(), Error> {
    let (start, end) = match opt.range.as_slice() {
        [start, end] => (*start, *end),
        _ => bail!("The range needs a start and an end"),
    };
    if start >= end {
        bail!("Given range is not valid: {} is not less than {}", start, end);
    }
    let (in_dir, out_dir) = opt.directories();
    for dir in [&in_dir, &out_dir] {
        if !dir.is_dir() {
            bail!("Directory {} does not exist", dir.display());
        }
    }
    let zero_fill = opt.zero_fill.unwrap_or_else(|| default_zero_fill(end));
    let cases = numeric_range(&opt.prefix, start..end, zero_fill, &in_dir, &out_dir);

    let context = RuntimeContext::new(config)?;
    let mut solution = Solution::new(&opt.solution, &context.config, opt.timeout)?;
    let mut orchestrator =
        TestOrchestrator::new(context.runner.clone(), Validator::default(), 3);
    orchestrator.prepare(&mut solution, None, false)?;
    let generator = Generator {
        program: opt.generator.clone(),
        message: opt.message.clone(),
        args: opt.generator_args.clone(),
        timeout: opt.timeout_generator,
    };
    let report = orchestrator.run_generate(&solution, &generator, &cases)?;
    if report.outcome == LoopOutcome::Interrupted {
        orchestrator
            .reporter
            .info("Running tests canceled due to KeyboardInterrupt");
    }
    orchestrator.reporter.success(format!(
        "Generated {} tests, skipped {}",
        report.generated.len(),
        report.skipped.len()
    ));
    Ok(())
}
