use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::runner::resolve_program;
use crate::{Invocation, OutputTarget, ProcessRunner, RunError, StdinSource, TerminationStatus};

/// Argument of the generator replaced with a new random seed at every generation.
pub const SEED_PLACEHOLDER: &str = "{}";

/// The failures of a generation. They are faults of the test setup, never of the solution.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The generator did not exit with 0.
    #[error("Generator {program} crashed ({status}) on message {message:?}")]
    Crashed {
        /// The generator.
        program: String,
        /// How it ended.
        status: TerminationStatus,
        /// The message it was fed.
        message: String,
        /// The seed it was given, if any.
        seed: Option<u64>,
    },
    /// The generator could not be run.
    #[error(transparent)]
    Run(#[from] RunError),
}

/// An external program that writes a new input file on its standard output.
#[derive(Debug, Clone)]
pub struct Generator {
    /// The generator program.
    pub program: PathBuf,
    /// Text written to the standard input of the generator.
    pub message: String,
    /// Arguments of the generator. The ones equal to `{}` are replaced with a random seed.
    pub args: Vec<String>,
    /// Time limit of a generation, if any.
    pub timeout: Option<Duration>,
}

impl Generator {
    /// A generator without arguments nor time limit.
    pub fn new<P: Into<PathBuf>, S: Into<String>>(program: P, message: S) -> Generator {
        Generator {
            program: program.into(),
            message: message.into(),
            args: vec![],
            timeout: None,
        }
    }

    /// Whether some argument asks for a random seed.
    pub fn is_seeded(&self) -> bool {
        self.args.iter().any(|a| a == SEED_PLACEHOLDER)
    }

    /// The arguments with the placeholders replaced by `seed`.
    fn render_args(&self, seed: u64) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                if arg == SEED_PLACEHOLDER {
                    seed.to_string()
                } else {
                    arg.clone()
                }
            })
            .collect()
    }

    /// Run the generator writing its output into `output`, discarding its stderr.
    ///
    /// Returns the seed used, if the arguments asked for one.
    pub fn generate(
        &self,
        runner: &ProcessRunner,
        output: &Path,
    ) -> Result<Option<u64>, GeneratorError> {
        let seed = if self.is_seeded() {
            Some(fastrand::u64(..))
        } else {
            None
        };
        let mut invocation = Invocation::new(resolve_program(&self.program));
        invocation
            .args(self.render_args(seed.unwrap_or_default()))
            .stdin(StdinSource::Bytes(self.message.as_bytes().to_vec()))
            .stdout(OutputTarget::File(output.to_owned()))
            .stderr(OutputTarget::Discard);
        if let Some(timeout) = self.timeout {
            invocation.timeout(timeout);
        }
        let outcome = runner.run(&invocation)?;
        if !outcome.status.is_ok() {
            return Err(GeneratorError::Crashed {
                program: self.program.display().to_string(),
                status: outcome.status,
                message: self.message.clone(),
                seed,
            });
        }
        debug!(
            "Generated {} with {} (seed {:?})",
            output.display(),
            self.program.display(),
            seed
        );
        Ok(seed)
    }
}
