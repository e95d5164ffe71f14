use std::fmt::{Display, Formatter};
use std::process::ExitStatus;

use nix::sys::signal::Signal;

/// How a child process ended.
///
/// The variants are ordered so that the error counters of a run are always reported in the same
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TerminationStatus {
    /// The program exited with status 0.
    Ok,
    /// The program did not exit within the time limit and has been killed.
    Timeout,
    /// The program has been killed by `SIGINT`.
    Interrupted,
    /// The program has been killed by `SIGABRT`, usually a failed assertion.
    Aborted,
    /// The program has been killed by `SIGSEGV`.
    Segfault,
    /// The program has been killed by `SIGFPE`, e.g. a division by zero.
    FloatingPointError,
    /// The program has been killed by `SIGTERM`.
    Terminated,
    /// Any other non-zero exit code or signal.
    Unknown,
}

/// The exit codes with a dedicated variant. Signals are stored negated, the way a child killed by a
/// signal is reported by the classic `wait` wrappers.
///
/// `Timeout` is missing on purpose: it's never an exit code, only the runner assigns it.
pub const SIGNAL_TABLE: [(i32, TerminationStatus); 6] = [
    (0, TerminationStatus::Ok),
    (-(Signal::SIGINT as i32), TerminationStatus::Interrupted),
    (-(Signal::SIGABRT as i32), TerminationStatus::Aborted),
    (-(Signal::SIGFPE as i32), TerminationStatus::FloatingPointError),
    (-(Signal::SIGSEGV as i32), TerminationStatus::Segfault),
    (-(Signal::SIGTERM as i32), TerminationStatus::Terminated),
];

impl TerminationStatus {
    /// Map an exit code (negative for signals) to its status. Unrecognized codes are `Unknown`.
    pub fn classify(exit_code: i32) -> TerminationStatus {
        SIGNAL_TABLE
            .iter()
            .find(|(code, _)| *code == exit_code)
            .map(|(_, status)| *status)
            .unwrap_or(TerminationStatus::Unknown)
    }

    /// Classify the `ExitStatus` of a process that exited on its own.
    pub fn from_exit_status(status: &ExitStatus) -> TerminationStatus {
        if let Some(code) = status.code() {
            return TerminationStatus::classify(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return TerminationStatus::classify(-signal);
            }
        }
        TerminationStatus::Unknown
    }

    /// Whether the program exited cleanly.
    pub fn is_ok(&self) -> bool {
        matches!(self, TerminationStatus::Ok)
    }

    /// Short name used in the reports.
    pub fn name(&self) -> &'static str {
        match self {
            TerminationStatus::Ok => "OK",
            TerminationStatus::Timeout => "TLE",
            TerminationStatus::Interrupted => "SIGINT",
            TerminationStatus::Aborted => "SIGABRT",
            TerminationStatus::Segfault => "SIGSEGV",
            TerminationStatus::FloatingPointError => "SIGFPE",
            TerminationStatus::Terminated => "SIGTERM",
            TerminationStatus::Unknown => "RE",
        }
    }
}

impl Display for TerminationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}
