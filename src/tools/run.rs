use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Error};
use clap::{Parser, ValueHint};

use hazmat_exec::{RunError, Verdict};
use hazmat_format::CaseOutcome;
use hazmat_lang::Solution;

use crate::context::RuntimeContext;
use crate::error::CliError;
use crate::opt::{parse_seconds, ValidatorOpt};
use crate::orchestrator::TestOrchestrator;

#[derive(Parser, Debug, Clone)]
pub struct RunOpt {
    /// The solution to run
    #[clap(value_hint = ValueHint::FilePath)]
    pub solution: PathBuf,

    /// The input file
    #[clap(value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// The expected output. Defaults to the input with the `.out` extension
    #[clap(long, short, value_hint = ValueHint::FilePath)]
    pub out: Option<PathBuf>,

    /// Time limit of the solution, in seconds
    #[clap(long, short, default_value = "5", value_parser = parse_seconds)]
    pub timeout: Duration,

    /// Print the input file
    #[clap(long)]
    pub show_input: bool,

    /// Print the output of the solution, and the expected one if they differ
    #[clap(long)]
    pub show_output: bool,

    #[clap(flatten, next_help_heading = Some("VALIDATOR"))]
    pub validator: ValidatorOpt,
}

pub fn main_run(opt: RunOpt, config: Option<&Path>) -> Result<(), Error> {
    let mut context = RuntimeContext::new(config)?;
    let mut orchestrator =
        TestOrchestrator::new(context.runner.clone(), opt.validator.validator(), 3);
    if !opt.input.is_file() {
        return Err(CliError::MissingInput(opt.input).into());
    }
    let expected = match &opt.out {
        Some(out) => {
            if !out.is_file() {
                orchestrator
                    .reporter
                    .warning(format!("Given output file {} does not exist", out.display()));
            }
            out.clone()
        }
        None => opt.input.with_extension("out"),
    };

    let mut solution = Solution::new(&opt.solution, &context.config, opt.timeout)?;
    orchestrator.prepare(&mut solution, None, false)?;
    let actual = context.scratch.acquire()?;

    let outcome = match solution.run(&context.runner, &opt.input, &actual) {
        Ok(outcome) => outcome,
        Err(RunError::Interrupted) => return Err(CliError::Interrupted.into()),
        Err(e) => return Err(e).with_context(|| format!("Failed to run {}", solution.name())),
    };
    let mut case = CaseOutcome {
        status: outcome.status,
        case: opt.input.display().to_string(),
        duration: outcome.duration,
        accepted: false,
    };
    if !outcome.status.is_ok() {
        orchestrator.reporter.case_line(&case);
        if opt.show_input {
            orchestrator.reporter.info("Input");
            orchestrator.reporter.print_file(&opt.input)?;
        }
        return Err(CliError::SolutionFailed(outcome.status).into());
    }

    let reporter = &mut orchestrator.reporter;
    if !expected.is_file() {
        reporter.info(format!("{} {:.2}s", case.case, case.duration));
        if opt.show_input {
            reporter.info("Input");
            reporter.print_file(&opt.input)?;
        }
        if opt.show_output {
            reporter.info("Output");
            reporter.print_file(&actual)?;
        }
        return Ok(());
    }

    let verdict = match orchestrator.validator.validate(
        &orchestrator.runner,
        &opt.input,
        &expected,
        &actual,
    ) {
        Ok(verdict) => verdict,
        Err(RunError::Interrupted) => return Err(CliError::Interrupted.into()),
        Err(e) => return Err(e).context("Failed to validate the output"),
    };
    let reporter = &mut orchestrator.reporter;
    if verdict == Verdict::CheckerTimeout {
        reporter.warning("The validator timed out, the output is considered wrong");
    }
    case.accepted = verdict.is_accepted();
    reporter.case_line(&case);
    if opt.show_input {
        reporter.info("Input");
        reporter.print_file(&opt.input)?;
    }
    if opt.show_output {
        if case.accepted {
            reporter.info("Output common");
            reporter.print_file(&actual)?;
        } else {
            reporter.info("Expected output");
            reporter.print_file(&expected)?;
            reporter.info("Output");
            reporter.print_file(&actual)?;
        }
    }
    Ok(())
}
