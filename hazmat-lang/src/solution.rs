use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Error};
use thiserror::Error;

use hazmat_exec::{
    resolve_program, Invocation, OutputTarget, ProcessRunner, RunError, RunOutcome, StdinSource,
    TerminationStatus,
};

use crate::{LanguageConfig, LanguageProfile};

/// Time limit of a compilation.
pub const COMPILE_TIMEOUT: Duration = Duration::from_secs(10);
/// Time limit of a solution when nothing else is specified.
pub const DEFAULT_SOLUTION_TIMEOUT: Duration = Duration::from_secs(5);

/// The problems with the files of a solution.
#[derive(Debug, Error)]
pub enum SolutionError {
    /// Neither the source nor the executable exist.
    #[error("Non valid solution {path}: no executable and no source file")]
    NotFound {
        /// The path of the solution.
        path: PathBuf,
    },
}

/// The result of `Solution::compile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileStatus {
    /// The language has no compilation step.
    NotRequired,
    /// The executable is newer than the source, or there is only the executable: nothing has been
    /// done.
    UpToDate,
    /// The compiler succeeded.
    Compiled,
    /// The compiler failed or timed out, or a forced compilation has no source.
    Failed,
}

impl CompileStatus {
    /// Whether the executable can be used after the compilation.
    pub fn is_success(&self) -> bool {
        !matches!(self, CompileStatus::Failed)
    }
}

/// Whether an executable must be (re)built: when forced, when it does not exist, or when the source
/// has been modified after it.
pub fn needs_recompile(source: SystemTime, executable: Option<SystemTime>, force: bool) -> bool {
    match executable {
        _ if force => true,
        None => true,
        Some(executable) => source > executable,
    }
}

/// A program under test, or a reference one: its source, its executable and its language.
#[derive(Debug, Clone)]
pub struct Solution {
    /// The path given by the user.
    pub source: PathBuf,
    /// The path of the program to execute.
    pub executable: PathBuf,
    /// The language of the solution.
    pub profile: Arc<LanguageProfile>,
    /// Time limit of a run.
    pub timeout: Duration,
    /// Time limit of a compilation.
    pub compile_timeout: Duration,
    /// Whether the source file exists.
    pub has_source: bool,
    /// Whether the executable exists. Set by a successful compilation.
    pub has_executable: bool,
}

impl Solution {
    /// Bind `path` to its language. Fails if the extension is unknown or if neither the source nor
    /// the executable exist.
    pub fn new<P: Into<PathBuf>>(
        path: P,
        config: &LanguageConfig,
        timeout: Duration,
    ) -> Result<Solution, Error> {
        let source = path.into();
        let profile = config.profile_for(&source)?;
        let executable = profile.executable_path(&source);
        let has_source = source.is_file();
        let has_executable = executable.is_file();
        if !has_source && !has_executable {
            return Err(SolutionError::NotFound { path: source }.into());
        }
        Ok(Solution {
            source,
            executable,
            profile,
            timeout,
            compile_timeout: COMPILE_TIMEOUT,
            has_source,
            has_executable,
        })
    }

    /// A name for the reports.
    pub fn name(&self) -> String {
        self.source.display().to_string()
    }

    /// The path to execute: relative paths are prefixed with `./` so that they are not searched in
    /// `$PATH`.
    pub fn command_path(&self) -> PathBuf {
        if self.executable.is_absolute() {
            self.executable.clone()
        } else {
            Path::new(".").join(&self.executable)
        }
    }

    /// Compile the solution if its language needs it and the executable is not up to date.
    ///
    /// `flags` replace the default flags of the language. The output of the compiler is shown to
    /// the user. A compiler that fails, cannot be started or times out gives `Failed`; only a ^C is
    /// returned as an error.
    pub fn compile(
        &mut self,
        runner: &ProcessRunner,
        flags: Option<&[String]>,
        force: bool,
    ) -> Result<CompileStatus, Error> {
        if !self.profile.needs_compilation() {
            return Ok(CompileStatus::NotRequired);
        }
        if !self.has_source {
            if self.has_executable && !force {
                debug!(
                    "No source file {}, using {}",
                    self.source.display(),
                    self.executable.display()
                );
                return Ok(CompileStatus::UpToDate);
            }
            error!("No source file {}", self.source.display());
            return Ok(CompileStatus::Failed);
        }
        let source_time = modified(&self.source)?;
        let executable_time = if self.has_executable {
            Some(modified(&self.executable)?)
        } else {
            None
        };
        if !needs_recompile(source_time, executable_time, force) {
            debug!("{} is up to date", self.executable.display());
            return Ok(CompileStatus::UpToDate);
        }

        let args = self
            .profile
            .compile_command(&[self.source.as_path()], &self.executable, flags)?;
        let mut invocation = Invocation::new(resolve_program(&args[0]));
        invocation
            .args(&args[1..])
            .stdout(OutputTarget::Inherit)
            .stderr(OutputTarget::Inherit)
            .timeout(self.compile_timeout);
        info!("Compiling {}: {:?}", self.source.display(), args);
        let outcome = match runner.run(&invocation) {
            Ok(outcome) => outcome,
            Err(RunError::Spawn { program, source }) => {
                warn!("Cannot start the compiler {}: {}", program, source);
                return Ok(CompileStatus::Failed);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to compile {}", self.name()))
            }
        };
        match outcome.status {
            TerminationStatus::Ok => {
                self.has_executable = true;
                Ok(CompileStatus::Compiled)
            }
            TerminationStatus::Timeout => {
                warn!("Compile timeout on {}", self.source.display());
                Ok(CompileStatus::Failed)
            }
            status => {
                warn!("Error in compiling {} ({})", self.source.display(), status);
                Ok(CompileStatus::Failed)
            }
        }
    }

    /// The invocation that runs the solution on `input`, writing the output to `output` and
    /// discarding the standard error.
    pub fn invocation(&self, input: &Path, output: &Path) -> Invocation {
        let mut invocation = Invocation::new(self.command_path());
        invocation
            .stdin(StdinSource::File(input.to_owned()))
            .stdout(OutputTarget::File(output.to_owned()))
            .stderr(OutputTarget::Discard)
            .timeout(self.timeout);
        invocation
    }

    /// Run the solution on a case.
    pub fn run(
        &self,
        runner: &ProcessRunner,
        input: &Path,
        output: &Path,
    ) -> Result<RunOutcome, RunError> {
        runner.run(&self.invocation(input, output))
    }
}

fn modified(path: &Path) -> Result<SystemTime, Error> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .with_context(|| format!("Failed to get the modification time of {}", path.display()))
}
