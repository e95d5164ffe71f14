//! Execution of the external programs involved in testing a solution.
//!
//! Every program hazmat touches (the solution under test, the reference solution, the comparator,
//! the generator and the compilers) is started through a [`ProcessRunner`](struct.ProcessRunner.html).
//! The runner binds the standard streams, enforces a wall-clock timeout and reduces the way the
//! child ended to a [`TerminationStatus`](enum.TerminationStatus.html).
//!
//! Exactly one child is alive at a time: [`ProcessRunner::run`](struct.ProcessRunner.html#method.run)
//! blocks until the child exits, is killed by the timeout, or the run is cancelled through the
//! shared [`Interrupt`](struct.Interrupt.html).
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use hazmat_exec::{Interrupt, Invocation, ProcessRunner, TerminationStatus};
//!
//! let runner = ProcessRunner::new(Interrupt::new());
//! let mut invocation = Invocation::new("true");
//! invocation.timeout(Duration::from_secs(1));
//! let outcome = runner.run(&invocation).unwrap();
//! assert_eq!(outcome.status, TerminationStatus::Ok);
//! ```

#![deny(missing_docs)]

#[macro_use]
extern crate log;

mod generator;
mod interrupt;
mod runner;
mod scratch;
mod status;
mod validator;

pub use generator::{Generator, GeneratorError, SEED_PLACEHOLDER};
pub use interrupt::Interrupt;
pub use runner::{
    absolute_path, resolve_program, Invocation, OutputTarget, ProcessRunner, RunError, RunOutcome,
    StdinSource,
};
pub use scratch::TempFileManager;
pub use status::{TerminationStatus, SIGNAL_TABLE};
pub use validator::{Validator, Verdict, DEFAULT_CHECKER_TIMEOUT};
