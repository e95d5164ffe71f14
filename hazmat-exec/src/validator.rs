use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::runner::{absolute_path, resolve_program};
use crate::{Invocation, OutputTarget, ProcessRunner, RunError, TerminationStatus};

/// Time limit of a comparator run.
pub const DEFAULT_CHECKER_TIMEOUT: Duration = Duration::from_secs(5);

/// The decision of a comparator on an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The comparator exited with 0.
    Accepted,
    /// The comparator exited with anything else.
    Rejected,
    /// The comparator did not finish in time. The output is rejected, but this is a problem of the
    /// comparator and not of the solution.
    CheckerTimeout,
}

impl Verdict {
    /// Whether the output is considered correct.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// An external program that decides whether an output is correct.
///
/// It's invoked as `checker [input] reference candidate [flags...]`.
#[derive(Debug, Clone)]
pub struct Validator {
    /// The comparator program.
    pub checker: PathBuf,
    /// Extra arguments, after the paths.
    pub flags: Vec<String>,
    /// Whether the comparator wants the input file as its first argument.
    pub need_input: bool,
    /// Time limit of the comparator.
    pub timeout: Duration,
}

impl Default for Validator {
    /// `diff` ignoring the whitespace amount.
    fn default() -> Self {
        Validator {
            checker: "diff".into(),
            flags: vec!["-w".into(), "-q".into()],
            need_input: false,
            timeout: DEFAULT_CHECKER_TIMEOUT,
        }
    }
}

impl Validator {
    /// A custom comparator without extra flags.
    pub fn new<P: Into<PathBuf>>(checker: P, need_input: bool) -> Validator {
        Validator {
            checker: checker.into(),
            flags: vec![],
            need_input,
            timeout: DEFAULT_CHECKER_TIMEOUT,
        }
    }

    /// Build the command line for checking `candidate` against `reference`. All the paths are made
    /// absolute.
    pub fn invocation(
        &self,
        input: &Path,
        reference: &Path,
        candidate: &Path,
    ) -> Result<Invocation, RunError> {
        let abs = |path: &Path| {
            absolute_path(path).map_err(|e| RunError::Io {
                context: format!("Failed to resolve {}", path.display()),
                source: e,
            })
        };
        let mut invocation = Invocation::new(resolve_program(&self.checker));
        if self.need_input {
            invocation.arg(abs(input)?);
        }
        invocation
            .arg(abs(reference)?)
            .arg(abs(candidate)?)
            .args(&self.flags)
            .stdout(OutputTarget::Discard)
            .stderr(OutputTarget::Discard)
            .timeout(self.timeout);
        Ok(invocation)
    }

    /// Run the comparator on a case.
    ///
    /// A timed out comparator is reported as `CheckerTimeout` and logged. Failing to start the
    /// comparator at all is an error.
    pub fn validate(
        &self,
        runner: &ProcessRunner,
        input: &Path,
        reference: &Path,
        candidate: &Path,
    ) -> Result<Verdict, RunError> {
        let invocation = self.invocation(input, reference, candidate)?;
        let outcome = runner.run(&invocation)?;
        Ok(match outcome.status {
            TerminationStatus::Ok => Verdict::Accepted,
            TerminationStatus::Timeout => {
                warn!(
                    "Validator {} got timeout on test {}",
                    self.checker.display(),
                    input.display()
                );
                Verdict::CheckerTimeout
            }
            _ => Verdict::Rejected,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_is_diff() {
        let validator = Validator::default();
        assert_eq!(validator.checker, PathBuf::from("diff"));
        assert_eq!(validator.flags, vec!["-w", "-q"]);
        assert!(!validator.need_input);
        assert_eq!(validator.timeout, DEFAULT_CHECKER_TIMEOUT);
    }

    #[test]
    fn test_invocation_argument_order() {
        let tmpdir = tempfile::TempDir::new().unwrap();
        let input = tmpdir.path().join("a.in");
        let reference = tmpdir.path().join("a.out");
        let candidate = tmpdir.path().join("out");
        let validator = Validator::default();
        let invocation = validator
            .invocation(&input, &reference, &candidate)
            .unwrap();
        let args: Vec<_> = invocation
            .args
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect();
        assert_eq!(args.len(), 4);
        assert!(args[0].ends_with("a.out"));
        assert!(args[1].ends_with("out"));
        assert_eq!(&args[2..], &["-w", "-q"]);
        assert_eq!(invocation.timeout, Some(DEFAULT_CHECKER_TIMEOUT));
    }

    #[test]
    fn test_invocation_with_input() {
        let validator = Validator::new("/usr/local/bin/checker", true);
        let invocation = validator
            .invocation(Path::new("x.in"), Path::new("x.out"), Path::new("y.out"))
            .unwrap();
        assert_eq!(invocation.program, PathBuf::from("/usr/local/bin/checker"));
        assert_eq!(invocation.args.len(), 3);
        assert!(Path::new(&invocation.args[0]).is_absolute());
        assert!(Path::new(&invocation.args[0]).ends_with("x.in"));
        assert!(Path::new(&invocation.args[2]).ends_with("y.out"));
    }

    #[test]
    fn test_verdict_is_accepted() {
        assert!(Verdict::Accepted.is_accepted());
        assert!(!Verdict::Rejected.is_accepted());
        assert!(!Verdict::CheckerTimeout.is_accepted());
    }
}
