use std::fmt::Display;
use std::path::Path;

use anyhow::{Context, Error};
use indicatif::{ProgressBar, ProgressStyle};
use termcolor::{ColorChoice, ColorSpec, StandardStream, WriteColor};

use hazmat_exec::TerminationStatus;

use crate::ui::{BLUE, BOLD, GREEN, RED, YELLOW};
use crate::{cwrite, cwriteln};
use crate::{CaseOutcome, HarnessFault, ResultAggregator, SectionKind, Summary};

lazy_static! {
    static ref PLAIN: ColorSpec = ColorSpec::new();
}

/// Like tqdm: the current case, then the bar and the counters.
const BAR_TEMPLATE: &str = "{msg}: {percent:>3}%|{wide_bar}| {pos}/{len} [{elapsed}<{eta}]";
const SPINNER_TEMPLATE: &str = "{msg}: {spinner} {pos} [{elapsed}]";

/// Whether the line of a case is shown at a given print level: failures with `level > 0`, rejected
/// outputs with `level > 1`, accepted ones with `level > 2`.
pub fn should_print(outcome: &CaseOutcome, level: u8) -> bool {
    if !outcome.status.is_ok() {
        level > 0
    } else if outcome.accepted {
        level > 2
    } else {
        level > 1
    }
}

/// Writes the per-case lines, the messages and the final tallies of a run.
///
/// While a progress bar is shown every line is written above it.
pub struct Reporter<W: WriteColor = StandardStream> {
    /// The actual stream.
    pub stream: W,
    /// How many case lines to show, see `should_print`.
    print_level: u8,
    /// The bar of the running loop, if enabled.
    progress: Option<ProgressBar>,
}

impl Reporter<StandardStream> {
    /// A reporter that writes to stdout, with colors if it's a terminal.
    pub fn stdout(print_level: u8) -> Reporter<StandardStream> {
        Reporter::with_stream(StandardStream::stdout(ColorChoice::Auto), print_level)
    }
}

impl<W: WriteColor> Reporter<W> {
    /// A reporter that writes to `stream`.
    pub fn with_stream(stream: W, print_level: u8) -> Reporter<W> {
        Reporter {
            stream,
            print_level,
            progress: None,
        }
    }

    /// Get back the stream.
    pub fn into_inner(mut self) -> W {
        self.finish_progress();
        self.stream
    }

    /// The print level of the case lines.
    pub fn print_level(&self) -> u8 {
        self.print_level
    }

    /// Show a progress bar of `len` steps, or a spinner if the length is not known. A bar already
    /// shown is removed.
    pub fn start_progress(&mut self, len: Option<u64>) -> Result<(), Error> {
        self.finish_progress();
        let (bar, template) = match len {
            Some(len) => (ProgressBar::new(len), BAR_TEMPLATE),
            None => (ProgressBar::new_spinner(), SPINNER_TEMPLATE),
        };
        let style = ProgressStyle::with_template(template).context("Invalid progress template")?;
        bar.set_style(style);
        self.progress = Some(bar);
        Ok(())
    }

    /// Move the bar to `done` steps, with `current` as description.
    pub fn progress_step<S: Into<String>>(&self, done: u64, current: S) {
        if let Some(bar) = &self.progress {
            bar.set_position(done);
            bar.set_message(current.into());
        }
    }

    /// Remove the progress bar, if any.
    pub fn finish_progress(&mut self) {
        if let Some(bar) = self.progress.take() {
            bar.finish_and_clear();
        }
    }

    /// The progress bar currently shown.
    pub fn progress(&self) -> Option<&ProgressBar> {
        self.progress.as_ref()
    }

    /// Write with the progress bar hidden. `body` must not call `emit` again.
    fn emit<F: FnOnce(&mut Self)>(&mut self, body: F) {
        match self.progress.clone() {
            Some(bar) => bar.suspend(|| body(self)),
            None => body(self),
        }
    }

    /// An informative message.
    pub fn info<D: Display>(&mut self, message: D) {
        self.emit(|r| cwriteln!(r, BLUE, "{}", message));
    }

    /// A positive message.
    pub fn success<D: Display>(&mut self, message: D) {
        self.emit(|r| cwriteln!(r, GREEN, "{}", message));
    }

    /// Something unexpected, but not fatal.
    pub fn warning<D: Display>(&mut self, message: D) {
        self.emit(|r| cwriteln!(r, YELLOW, "{}", message));
    }

    /// Something went wrong.
    pub fn error<D: Display>(&mut self, message: D) {
        self.emit(|r| cwriteln!(r, RED, "{}", message));
    }

    /// An empty line.
    pub fn newline(&mut self) {
        self.emit(|r| cwriteln!(r, PLAIN, ""));
    }

    /// Show the line of a case, if allowed by the print level.
    pub fn case(&mut self, outcome: &CaseOutcome) {
        if should_print(outcome, self.print_level) {
            self.case_line(outcome);
        }
    }

    /// Show the line of a case.
    pub fn case_line(&mut self, outcome: &CaseOutcome) {
        self.emit(|r| r.write_case_line(outcome));
    }

    fn write_case_line(&mut self, outcome: &CaseOutcome) {
        match outcome.status {
            TerminationStatus::Ok => {
                if outcome.accepted {
                    cwrite!(self, GREEN, "{:<7}", "AC");
                } else {
                    cwrite!(self, RED, "{:<7}", "WA");
                }
                cwrite!(self, PLAIN, " {} ", outcome.case);
                cwriteln!(self, BOLD, "{:.2}s", outcome.duration);
            }
            TerminationStatus::Timeout => {
                cwrite!(self, YELLOW, "{:<7}", outcome.status);
                cwriteln!(self, PLAIN, " {}", outcome.case);
            }
            status => {
                cwrite!(self, RED, "{:<7}", status);
                cwriteln!(self, PLAIN, " {}", outcome.case);
            }
        }
    }

    /// Show a failure of the test setup. They are always shown.
    pub fn harness_fault(&mut self, fault: &HarnessFault) {
        self.emit(|r| {
            cwrite!(r, YELLOW, "{:<7}", "FAULT");
            cwriteln!(
                r,
                PLAIN,
                " {} failed on {}: {}",
                fault.phase,
                fault.case,
                fault.detail
            );
        });
    }

    /// Show the counters of a run.
    pub fn status(&mut self, aggregator: &ResultAggregator) {
        self.emit(|r| {
            cwrite!(r, GREEN, "AC {}", aggregator.accepted());
            cwrite!(r, PLAIN, "  ");
            cwriteln!(r, RED, "WA {}", aggregator.rejected());
            for (status, count) in &aggregator.counts().errors {
                cwrite!(r, RED, "{:<7}", status);
                cwriteln!(r, PLAIN, " {}", count);
            }
            let faults = aggregator.harness_faults().len();
            if faults > 0 {
                cwrite!(r, YELLOW, "Harness faults");
                cwriteln!(r, PLAIN, " {} (not charged to the solution)", faults);
            }
        });
    }

    /// Show the summary of a run.
    pub fn summary(&mut self, summary: &Summary) {
        self.emit(|r| {
            cwriteln!(r, BLUE, "Summary of run");
            for section in &summary.sections {
                let title = match section.kind {
                    SectionKind::Accepted => "AC",
                    SectionKind::Rejected => "WA",
                    SectionKind::Timeout => "TLE",
                    SectionKind::Other => "Others",
                };
                cwriteln!(r, BOLD, "{}", title);
                for case in &section.cases {
                    r.write_case_line(case);
                }
            }
        });
    }

    /// Show the content of a file, without the trailing newlines.
    pub fn print_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        let content = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let content = String::from_utf8_lossy(&content);
        self.emit(|r| cwriteln!(r, PLAIN, "{}", content.trim_matches('\n')));
        Ok(())
    }
}
