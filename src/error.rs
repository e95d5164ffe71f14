//! The errors of the command line and their exit codes.

use std::path::PathBuf;

use anyhow::Error;
use thiserror::Error;

use hazmat_exec::{RunError, TerminationStatus};
use hazmat_lang::{ConfigError, SolutionError};

/// Failures of a subcommand that end the process with a specific exit code.
#[derive(Debug, Error)]
pub enum CliError {
    /// The solution under test did not exit cleanly in `hazmat run`.
    #[error("The solution failed ({0})")]
    SolutionFailed(TerminationStatus),
    /// `--save` points to a directory that does not exist.
    #[error("Given save directory {} does not exist", .0.display())]
    SaveDirMissing(PathBuf),
    /// The input of `hazmat run` does not exist.
    #[error("This test doesn't exist ({})", .0.display())]
    MissingInput(PathBuf),
    /// The source to merge does not exist.
    #[error("No valid source code given ({})", .0.display())]
    MissingSource(PathBuf),
    /// The compiler failed and there is no executable to fall back to.
    #[error("Could not compile {}", .0.display())]
    CompilationFailed(PathBuf),
    /// ^C during a single run.
    #[error("Running canceled due to KeyboardInterrupt")]
    Interrupted,
    /// The output of `hazmat merge` exists and `--force` was not given.
    #[error("File {} exists already, add --force / -f to overwrite", .0.display())]
    TargetExists(PathBuf),
}

impl CliError {
    /// The exit code of the process when this error ends it.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::SolutionFailed(_) => 1,
            CliError::SaveDirMissing(_) => 101,
            CliError::MissingInput(_) | CliError::MissingSource(_) => 102,
            CliError::CompilationFailed(_) => 103,
            CliError::Interrupted => 105,
            CliError::TargetExists(_) => 106,
        }
    }
}

/// The exit code for an error, looking for a known error in its chain of causes. Unknown errors
/// exit with `1`.
pub fn exit_code(error: &Error) -> i32 {
    for cause in error.chain() {
        if let Some(e) = cause.downcast_ref::<CliError>() {
            return e.exit_code();
        }
        if let Some(e) = cause.downcast_ref::<ConfigError>() {
            return match e {
                ConfigError::UnknownExtension { .. } => 110,
                ConfigError::MissingCompile { .. }
                | ConfigError::MissingInit { .. }
                | ConfigError::MissingInitType { .. }
                | ConfigError::MissingMerge { .. } => 104,
                _ => 1,
            };
        }
        if cause.downcast_ref::<SolutionError>().is_some() {
            return 141;
        }
        if let Some(RunError::Interrupted) = cause.downcast_ref::<RunError>() {
            return 105;
        }
    }
    1
}

/// Adds methods for failing without panic. Like `expect` but without panic.
pub trait NiceError<T> {
    /// Exit with the code of the error if the value is not present. Otherwise return the content.
    fn nice_unwrap(self) -> T;
}

fn print_error(error: &Error) {
    debug!("{:?}", error);
    let mut fail: &dyn std::error::Error = error.as_ref();
    eprintln!("Error: {fail}");
    while let Some(cause) = fail.source() {
        eprintln!("\nCaused by:\n    {cause}");
        fail = cause;
    }
}

impl<T> NiceError<T> for Result<T, Error> {
    fn nice_unwrap(self) -> T {
        match self {
            Ok(x) => x,
            Err(e) => {
                print_error(&e);
                std::process::exit(exit_code(&e));
            }
        }
    }
}
