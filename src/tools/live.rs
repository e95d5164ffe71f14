use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Error;
use clap::{Parser, ValueHint};

use hazmat_exec::Generator;
use hazmat_format::ResultAggregator;
use hazmat_lang::Solution;

use crate::context::RuntimeContext;
use crate::opt::{parse_seconds, PrintOpt, SaveOpt, ValidatorOpt};
use crate::orchestrator::{BreakPolicy, LiveScratch, TestOrchestrator};
use crate::tools::print_results;

#[derive(Parser, Debug, Clone)]
#[clap(trailing_var_arg = true)]
pub struct LiveOpt {
    /// The solution to test
    #[clap(value_hint = ValueHint::FilePath)]
    pub solution: PathBuf,

    /// The solution that writes the correct outputs
    #[clap(value_hint = ValueHint::FilePath)]
    pub reference: PathBuf,

    /// Time limit of the solution, in seconds
    #[clap(long, short, default_value = "5", value_parser = parse_seconds)]
    pub timeout: Duration,

    /// Time limit of the reference solution, in seconds
    #[clap(long, alias = "timeout-checker", default_value = "10", value_parser = parse_seconds)]
    pub timeout_reference: Duration,

    /// Program that writes a new input on its standard output
    #[clap(long, short, value_hint = ValueHint::CommandName)]
    pub generator: PathBuf,

    /// Text written to the standard input of the generator
    #[clap(long, short, default_value = "")]
    pub message: String,

    /// Time limit of the generator, in seconds
    #[clap(long, value_parser = parse_seconds)]
    pub timeout_generator: Option<Duration>,

    /// How many tests to run, 0 to run until stopped with ^C
    #[clap(long = "number-of-runs", short = 'n', default_value = "10")]
    pub number_of_runs: usize,

    /// Stop at the first test that is not accepted
    #[clap(long = "break", short = 'b')]
    pub break_on_failure: bool,

    #[clap(flatten, next_help_heading = Some("VALIDATOR"))]
    pub validator: ValidatorOpt,

    #[clap(flatten, next_help_heading = Some("PRINTING"))]
    pub print: PrintOpt,

    #[clap(flatten)]
    pub save: SaveOpt,

    /// Arguments to pass to the generator. The value '{}' will be replaced with a random seed.
    #[clap(num_args = 0..)]
    pub generator_args: Vec<String>,
}

pub fn main_live(opt: LiveOpt, config: Option<&Path>) -> Result<(), Error> {
    let save_dir = opt.save.save_dir()?;
    let mut context = RuntimeContext::new(config)?;
    let mut solution = Solution::new(&opt.solution, &context.config, opt.timeout)?;
    let mut reference = Solution::new(&opt.reference, &context.config, opt.timeout_reference)?;
    let mut orchestrator = TestOrchestrator::new(
        context.runner.clone(),
        opt.validator.validator(),
        opt.print.print_level,
    )
    .break_policy(if opt.break_on_failure {
        BreakPolicy::Global
    } else {
        BreakPolicy::Never
    })
    .save_dir(save_dir)
    .progress(opt.print.progressbar);
    orchestrator.prepare(&mut solution, None, false)?;
    orchestrator.prepare(&mut reference, None, false)?;

    let generator = Generator {
        program: opt.generator.clone(),
        message: opt.message.clone(),
        args: opt.generator_args.clone(),
        timeout: opt.timeout_generator,
    };
    let scratch = LiveScratch {
        input: context.scratch.acquire()?,
        expected: context.scratch.acquire()?,
        actual: context.scratch.acquire()?,
    };
    let runs = match opt.number_of_runs {
        0 => None,
        runs => Some(runs),
    };
    let mut aggregator = ResultAggregator::new("LIVE", opt.print.summary > 0);
    let outcome = orchestrator.run_live(
        &solution,
        &reference,
        &generator,
        runs,
        &scratch,
        &mut aggregator,
    );
    print_results(
        &mut orchestrator.reporter,
        &aggregator,
        outcome.as_ref().ok().copied(),
        opt.print.summary,
    );
    outcome.map(|_| ())
}
