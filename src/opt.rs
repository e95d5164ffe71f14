use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use hazmat_exec::Validator;

use crate::tools::build::BuildOpt;
use crate::tools::gen_autocompletion::GenAutocompletionOpt;
use crate::tools::generate::GenerateOpt;
use crate::tools::init::InitOpt;
use crate::tools::live::LiveOpt;
use crate::tools::merge::MergeOpt;
use crate::tools::run::RunOpt;
use crate::tools::test::TestOpt;

const VERSION: &str = include_str!(concat!(env!("OUT_DIR"), "/version.txt"));

#[derive(Parser, Debug)]
#[clap(
    name = "hazmat",
    version = env!("CARGO_PKG_VERSION"),
    long_version = VERSION,
    about = "Compile, run and stress-test solutions of competitive programming problems"
)]
pub struct Opt {
    #[clap(flatten, next_help_heading = Some("LOGGING"))]
    pub logger: LoggerOpt,

    /// Path of the language configuration file.
    ///
    /// When not given, $HAZMAT_CONFIG is used, then hazmat.json in the user configuration
    /// directory.
    #[clap(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Which tool to use
    #[clap(subcommand)]
    pub tool: Tool,
}

#[derive(Subcommand, Debug)]
pub enum Tool {
    /// Compile a solution
    Build(BuildOpt),
    /// Run a solution on a single test
    Run(RunOpt),
    /// Run a solution on the tests of a directory
    #[clap(alias = "check")]
    Test(TestOpt),
    /// Compare a solution against a reference one on generated tests
    Live(LiveOpt),
    /// Generate a numbered range of tests with a generator and a solution
    Generate(GenerateOpt),
    /// Merge a solution and its libraries into a single file
    Merge(MergeOpt),
    /// Create the skeleton of a new problem
    Init(InitOpt),
    /// Generate the autocompletion files for the shell
    GenAutocompletion(GenAutocompletionOpt),
}

#[derive(Parser, Debug, Clone)]
pub struct LoggerOpt {
    /// Verbose mode (-v, -vv, -vvv, etc.)
    #[clap(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl LoggerOpt {
    pub fn enable_log(&self) {
        if self.verbose > 0 {
            std::env::set_var("RUST_BACKTRACE", "1");
            match self.verbose {
                0 => unreachable!(),
                1 => std::env::set_var("RUST_LOG", "info"),
                2 => std::env::set_var("RUST_LOG", "debug"),
                _ => std::env::set_var("RUST_LOG", "trace"),
            }
        }

        env_logger::Builder::from_default_env()
            .format_timestamp_nanos()
            .init();
        better_panic::install();
    }
}

#[derive(Parser, Debug, Clone)]
pub struct ValidatorOpt {
    /// Program that checks the output, called as `validator [input] expected output`.
    ///
    /// By default the outputs are compared with `diff -w -q`.
    #[clap(long, value_hint = ValueHint::CommandName)]
    pub validator: Option<PathBuf>,

    /// Pass the input file to the validator as its first argument
    #[clap(long, requires = "validator")]
    pub validator_need_input: bool,

    /// Time limit of the validator, in seconds
    #[clap(long, default_value = "5", value_parser = parse_seconds)]
    pub validator_timeout: Duration,
}

impl ValidatorOpt {
    /// The validator selected on the command line.
    pub fn validator(&self) -> Validator {
        let mut validator = match &self.validator {
            Some(checker) => Validator::new(checker, self.validator_need_input),
            None => Validator::default(),
        };
        validator.timeout = self.validator_timeout;
        validator
    }
}

#[derive(Parser, Debug, Clone)]
pub struct PrintOpt {
    /// Which tests to show: 0 none, 1 failures, 2 also wrong answers, 3 everything
    #[clap(long, short = 'p', default_value = "3")]
    pub print_level: u8,

    /// Print a summary of the run at the end, with the same levels of --print-level
    #[clap(long, short = 's', default_value = "0")]
    pub summary: u8,

    /// Show a progress bar with the running test
    #[clap(long)]
    pub progressbar: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct SaveOpt {
    /// Copy the inputs of the failed tests inside this directory
    #[clap(long, value_hint = ValueHint::DirPath)]
    pub save: Option<PathBuf>,
}

impl SaveOpt {
    /// The directory for the failed inputs, which must exist.
    pub fn save_dir(&self) -> Result<Option<&Path>, crate::error::CliError> {
        match &self.save {
            Some(dir) if !dir.is_dir() => Err(crate::error::CliError::SaveDirMissing(dir.clone())),
            Some(dir) => Ok(Some(dir.as_path())),
            None => Ok(None),
        }
    }
}

/// Parse a number of seconds, possibly fractional.
pub fn parse_seconds(value: &str) -> Result<Duration, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|e| format!("Invalid number of seconds {value:?}: {e}"))?;
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(format!("The time limit must be positive, not {value}"));
    }
    Ok(Duration::from_secs_f64(seconds))
}
