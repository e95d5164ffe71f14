//! # hazmat
//!
//! This is both an application and a library: the library exposes the pieces used by the `hazmat`
//! binary (case sources, the test orchestrator and the subcommands) so that they can be driven from
//! another program or from the tests.

#[macro_use]
extern crate log;

pub mod case_source;
pub mod context;
pub mod error;
pub mod opt;
pub mod orchestrator;
pub mod tools;

pub use error::{exit_code, CliError, NiceError};
pub use opt::*;
