//! The control loop of a run: it pushes every case through the solution, the reference and the
//! validator, and records the verdicts.
//!
//! Exactly one external program runs at a time. A ^C kills the running program and stops the loop
//! at the current case, which is not recorded: the caller still gets the aggregator filled with
//! the cases done so far.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Error};
use termcolor::{StandardStream, WriteColor};

use hazmat_exec::{
    Generator, GeneratorError, ProcessRunner, RunError, RunOutcome, TerminationStatus, Validator,
    Verdict,
};
use hazmat_format::ui::Reporter;
use hazmat_format::{CaseOutcome, FaultPhase, ResultAggregator};
use hazmat_lang::{CompileStatus, Solution};

use crate::case_source::{scan_directory, Case};
use crate::error::CliError;

/// When to stop after a case that is not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakPolicy {
    /// Run all the cases.
    Never,
    /// Skip the remaining cases of the directory, then move to the next one.
    Directory,
    /// Stop the whole run.
    Global,
}

/// How a loop over the cases ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    /// All the cases have been run.
    Completed,
    /// A case was not accepted and the break policy stopped the loop.
    Broken,
    /// ^C has been pressed.
    Interrupted,
}

/// What to do after a single case.
enum CaseStep {
    Continue,
    Failed,
    Interrupted,
}

/// The files of the case being judged.
struct CaseFiles<'a> {
    name: &'a str,
    input: &'a Path,
    expected: &'a Path,
    actual: &'a Path,
    /// File name of the copy of the input in the save directory.
    save_name: &'a str,
}

/// The scratch files of the live mode, reused by every case.
#[derive(Debug, Clone)]
pub struct LiveScratch {
    /// The generated input.
    pub input: PathBuf,
    /// The output of the reference solution.
    pub expected: PathBuf,
    /// The output of the solution under test.
    pub actual: PathBuf,
}

/// What `run_generate` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    /// The cases written.
    pub generated: Vec<String>,
    /// The cases left untouched because one of their files already existed.
    pub skipped: Vec<String>,
    /// Whether the loop got to the end.
    pub outcome: LoopOutcome,
}

/// Drives the solutions through the cases.
pub struct TestOrchestrator<W: WriteColor = StandardStream> {
    /// Runner of every program.
    pub runner: ProcessRunner,
    /// Decides whether an output is correct.
    pub validator: Validator,
    /// When to stop on failures.
    pub break_policy: BreakPolicy,
    /// Where to copy the inputs of the failed cases.
    pub save_dir: Option<PathBuf>,
    /// The saved inputs keep their path relative to this directory.
    pub input_root: Option<PathBuf>,
    /// Whether the loops show a progress bar.
    pub progress: bool,
    /// Where the cases are reported.
    pub reporter: Reporter<W>,
}

impl TestOrchestrator<StandardStream> {
    /// An orchestrator reporting on stdout.
    pub fn new(
        runner: ProcessRunner,
        validator: Validator,
        print_level: u8,
    ) -> TestOrchestrator<StandardStream> {
        TestOrchestrator::with_reporter(runner, validator, Reporter::stdout(print_level))
    }
}

impl<W: WriteColor> TestOrchestrator<W> {
    /// An orchestrator reporting with `reporter`, that never breaks and saves nothing.
    pub fn with_reporter(
        runner: ProcessRunner,
        validator: Validator,
        reporter: Reporter<W>,
    ) -> TestOrchestrator<W> {
        TestOrchestrator {
            runner,
            validator,
            break_policy: BreakPolicy::Never,
            save_dir: None,
            input_root: None,
            progress: false,
            reporter,
        }
    }

    /// Set the break policy.
    pub fn break_policy(mut self, policy: BreakPolicy) -> Self {
        self.break_policy = policy;
        self
    }

    /// Set the directory where the failed inputs are copied.
    pub fn save_dir<P: Into<PathBuf>>(mut self, dir: Option<P>) -> Self {
        self.save_dir = dir.map(Into::into);
        self
    }

    /// Set the directory of the tests, used to name the saved inputs of a walk.
    pub fn input_root<P: Into<PathBuf>>(mut self, root: Option<P>) -> Self {
        self.input_root = root.map(Into::into);
        self
    }

    /// Show a progress bar while running the cases.
    pub fn progress(mut self, enabled: bool) -> Self {
        self.progress = enabled;
        self
    }

    /// Compile the solution if needed. A failed compilation is fatal only when there is no older
    /// executable to use.
    pub fn prepare(
        &mut self,
        solution: &mut Solution,
        flags: Option<&[String]>,
        force: bool,
    ) -> Result<CompileStatus, Error> {
        let status = solution.compile(&self.runner, flags, force)?;
        match status {
            CompileStatus::Failed if solution.executable.is_file() => {
                self.reporter.warning(format!(
                    "Compilation of {} failed, using the old executable",
                    solution.name()
                ));
            }
            CompileStatus::Failed => {
                return Err(CliError::CompilationFailed(solution.source.clone()).into());
            }
            CompileStatus::Compiled => {
                self.reporter
                    .success(format!("Compiled {}", solution.name()));
            }
            CompileStatus::NotRequired | CompileStatus::UpToDate => {}
        }
        Ok(status)
    }

    /// Run `solution` on the stored `cases`, in order, writing its output in `actual`.
    pub fn run_cases(
        &mut self,
        solution: &Solution,
        cases: &[Case],
        actual: &Path,
        aggregator: &mut ResultAggregator,
    ) -> Result<LoopOutcome, Error> {
        if self.progress {
            self.reporter.start_progress(Some(cases.len() as u64))?;
        }
        for (done, case) in cases.iter().enumerate() {
            self.reporter.progress_step(done as u64, &case.name);
            let save_name = self.save_name(&case.input).unwrap_or_else(|| case.name.clone());
            let files = CaseFiles {
                name: &case.name,
                input: &case.input,
                expected: &case.output,
                actual,
                save_name: &save_name,
            };
            let outcome = self.run_solution(solution, &case.input, actual, &case.name)?;
            let step = self.judge(outcome, &files, aggregator)?;
            if let Some(outcome) = self.stop_after(step) {
                return Ok(outcome);
            }
        }
        Ok(LoopOutcome::Completed)
    }

    /// Run `solution` on the cases of many directories, given as (inputs, outputs) pairs. Every
    /// directory has its own aggregator, merged into `aggregator` when it's done.
    ///
    /// A broken directory stops the walk only with `BreakPolicy::Global`.
    pub fn run_directories(
        &mut self,
        solution: &Solution,
        dirs: &[(PathBuf, PathBuf)],
        actual: &Path,
        aggregator: &mut ResultAggregator,
    ) -> Result<LoopOutcome, Error> {
        for (in_dir, out_dir) in dirs {
            self.reporter
                .info(format!("Running folder {}", in_dir.display()));
            let cases = scan_directory(in_dir, out_dir)?;
            if cases.is_empty() {
                self.reporter
                    .warning(format!("No valid tests in {}", in_dir.display()));
                self.reporter
                    .info("Some tests might not have output or input");
                continue;
            }
            let mut local = ResultAggregator::new(in_dir.display().to_string(), aggregator.store);
            let outcome = self.run_cases(solution, &cases, actual, &mut local);
            *aggregator = aggregator.merge(&local);
            match outcome? {
                LoopOutcome::Completed => {}
                LoopOutcome::Broken if self.break_policy == BreakPolicy::Directory => {}
                other => return Ok(other),
            }
        }
        Ok(LoopOutcome::Completed)
    }

    /// Compare `solution` with `reference` on generated inputs, `runs` times or until stopped.
    ///
    /// The reference runs first: when it or the generator fail the case is a harness fault and the
    /// solution is not run.
    pub fn run_live(
        &mut self,
        solution: &Solution,
        reference: &Solution,
        generator: &Generator,
        runs: Option<usize>,
        scratch: &LiveScratch,
        aggregator: &mut ResultAggregator,
    ) -> Result<LoopOutcome, Error> {
        if self.progress {
            self.reporter.start_progress(runs.map(|runs| runs as u64))?;
        }
        let mut index = 0;
        while runs.map_or(true, |runs| index < runs) {
            self.reporter
                .progress_step(index as u64, format!("Number {index}"));
            let save_name = format!("{index}.in");
            index += 1;
            let case_name = match generator.generate(&self.runner, &scratch.input) {
                Ok(Some(seed)) => format!("{save_name} (seed {seed})"),
                Ok(None) => save_name.clone(),
                Err(GeneratorError::Run(RunError::Interrupted)) => {
                    return Ok(LoopOutcome::Interrupted)
                }
                Err(GeneratorError::Run(e)) => {
                    return Err(e).context("Failed to run the generator");
                }
                Err(e @ GeneratorError::Crashed { .. }) => {
                    aggregator.record_harness_fault(
                        &save_name,
                        FaultPhase::Generator,
                        e.to_string(),
                    );
                    self.report_last_fault(aggregator);
                    continue;
                }
            };

            let expected =
                match self.run_solution(reference, &scratch.input, &scratch.expected, &case_name)? {
                    None => return Ok(LoopOutcome::Interrupted),
                    Some(outcome) => outcome,
                };
            if !expected.status.is_ok() {
                aggregator.record_harness_fault(
                    &case_name,
                    FaultPhase::Reference,
                    format!("{} exited with {}", reference.name(), expected.status),
                );
                self.report_last_fault(aggregator);
                continue;
            }

            let files = CaseFiles {
                name: &case_name,
                input: &scratch.input,
                expected: &scratch.expected,
                actual: &scratch.actual,
                save_name: &save_name,
            };
            let outcome = self.run_solution(solution, &scratch.input, &scratch.actual, &case_name)?;
            let step = self.judge(outcome, &files, aggregator)?;
            if let Some(outcome) = self.stop_after(step) {
                return Ok(outcome);
            }
        }
        Ok(LoopOutcome::Completed)
    }

    /// Write the input and the expected output of every case with the generator and the solution.
    ///
    /// Cases with an existing input or output file are skipped. Any failure of the generator or of
    /// the solution stops the whole generation, and the files of the case being written are removed.
    pub fn run_generate(
        &mut self,
        solution: &Solution,
        generator: &Generator,
        cases: &[Case],
    ) -> Result<GenerateReport, Error> {
        let mut report = GenerateReport {
            generated: vec![],
            skipped: vec![],
            outcome: LoopOutcome::Completed,
        };
        for case in cases {
            let name = case
                .input
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .unwrap_or_else(|| case.name.clone());
            if case.input.exists() || case.output.exists() {
                self.reporter
                    .info(format!("Skipping {name} due to filenames coverage"));
                report.skipped.push(name);
                continue;
            }
            let written = self.write_case(solution, generator, case, &name);
            let duration = match written {
                Ok(Some(duration)) => duration,
                Ok(None) => {
                    discard_case(case);
                    report.outcome = LoopOutcome::Interrupted;
                    return Ok(report);
                }
                Err(e) => {
                    discard_case(case);
                    return Err(e);
                }
            };
            self.reporter.case_line(&CaseOutcome {
                status: TerminationStatus::Ok,
                case: name.clone(),
                duration,
                accepted: true,
            });
            report.generated.push(name);
        }
        Ok(report)
    }

    /// Generate the input of a case and run the solution on it. Returns the duration of the
    /// solution, or `None` if ^C has been pressed.
    fn write_case(
        &mut self,
        solution: &Solution,
        generator: &Generator,
        case: &Case,
        name: &str,
    ) -> Result<Option<f64>, Error> {
        match generator.generate(&self.runner, &case.input) {
            Ok(_) => {}
            Err(GeneratorError::Run(RunError::Interrupted)) => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("Failed to generate {name}")),
        }
        let Some(outcome) = self.run_solution(solution, &case.input, &case.output, name)? else {
            return Ok(None);
        };
        if !outcome.status.is_ok() {
            return Err(anyhow!("Wrong return code {}", outcome.status))
                .with_context(|| format!("{} failed on {}", solution.name(), name));
        }
        Ok(Some(outcome.duration))
    }

    /// Run a solution on a case. `None` means that ^C has been pressed.
    fn run_solution(
        &self,
        solution: &Solution,
        input: &Path,
        output: &Path,
        case: &str,
    ) -> Result<Option<RunOutcome>, Error> {
        match solution.run(&self.runner, input, output) {
            Ok(outcome) => {
                trace!("{} on {}: {:?}", solution.name(), case, outcome);
                Ok(Some(outcome))
            }
            Err(RunError::Interrupted) => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to run {} on {}", solution.name(), case))
            }
        }
    }

    /// Record the run of the solution on a case: a failed run is an error, the output of a clean
    /// one goes to the validator. A validator timeout is a harness fault, and the case is rejected.
    fn judge(
        &mut self,
        outcome: Option<RunOutcome>,
        files: &CaseFiles,
        aggregator: &mut ResultAggregator,
    ) -> Result<CaseStep, Error> {
        let Some(outcome) = outcome else {
            return Ok(CaseStep::Interrupted);
        };
        if !outcome.status.is_ok() {
            let recorded = aggregator.record_error(files.name, outcome.duration, outcome.status);
            self.reporter.case(&recorded);
            self.save(files.input, files.save_name)?;
            return Ok(CaseStep::Failed);
        }
        let validation =
            self.validator
                .validate(&self.runner, files.input, files.expected, files.actual);
        let verdict = match validation {
            Ok(verdict) => verdict,
            Err(RunError::Interrupted) => return Ok(CaseStep::Interrupted),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to validate the output of {}", files.name))
            }
        };
        if verdict == Verdict::CheckerTimeout {
            aggregator.record_harness_fault(
                files.name,
                FaultPhase::Comparator,
                format!("{} timed out", self.validator.checker.display()),
            );
            self.report_last_fault(aggregator);
        }
        let recorded = aggregator.record_result(files.name, outcome.duration, verdict.is_accepted());
        self.reporter.case(&recorded);
        if recorded.accepted {
            Ok(CaseStep::Continue)
        } else {
            self.save(files.input, files.save_name)?;
            Ok(CaseStep::Failed)
        }
    }

    /// Whether the loop has to stop after a case.
    fn stop_after(&mut self, step: CaseStep) -> Option<LoopOutcome> {
        match step {
            CaseStep::Continue => None,
            CaseStep::Failed if self.break_policy == BreakPolicy::Never => None,
            CaseStep::Failed => {
                self.reporter.error("Breaking on RE or WA");
                Some(LoopOutcome::Broken)
            }
            CaseStep::Interrupted => Some(LoopOutcome::Interrupted),
        }
    }

    /// The name of the saved copy of `input`: its path inside the input root, or just the file
    /// name.
    fn save_name(&self, input: &Path) -> Option<String> {
        let relative = self
            .input_root
            .as_ref()
            .and_then(|root| input.strip_prefix(root).ok())
            .filter(|relative| !relative.as_os_str().is_empty());
        match relative {
            Some(relative) => Some(relative.to_string_lossy().to_string()),
            None => input
                .file_name()
                .map(|name| name.to_string_lossy().to_string()),
        }
    }

    fn report_last_fault(&mut self, aggregator: &ResultAggregator) {
        if let Some(fault) = aggregator.harness_faults().last() {
            self.reporter.harness_fault(fault);
        }
    }

    /// Copy a failed input in the save directory, if any.
    fn save(&mut self, input: &Path, name: &str) -> Result<(), Error> {
        let Some(dir) = &self.save_dir else {
            return Ok(());
        };
        let dest = dir.join(name);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        std::fs::copy(input, &dest).with_context(|| {
            format!("Failed to save {} into {}", input.display(), dest.display())
        })?;
        debug!("Saved {} into {}", input.display(), dest.display());
        Ok(())
    }
}

/// Remove the files of a case that has not been written completely.
fn discard_case(case: &Case) {
    for path in [&case.input, &case.output] {
        match std::fs::remove_file(path) {
            Ok(()) => debug!("Removed the partial file {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Cannot remove {}: {}", path.display(), e),
        }
    }
}
