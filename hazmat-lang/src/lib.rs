//! Crate for managing the languages of the solutions and their source files.
//!
//! The languages are not hardcoded: they are described by the user in a JSON configuration file,
//! loaded into a [`LanguageConfig`](struct.LanguageConfig.html). Every language is a
//! [`LanguageProfile`](struct.LanguageProfile.html), keyed by the extension of its source files,
//! that tells how to compile a source (if at all), how to scaffold a new task and how to merge the
//! local dependencies of a source into a single file.
//!
//! A [`Solution`](struct.Solution.html) binds a path to its profile and exposes the functionalities
//! for compiling and running it.
//!
//! # Example
//!
//! ```
//! use hazmat_lang::LanguageConfig;
//!
//! let config = LanguageConfig::parse(r#"{"languages": [
//!     {"name": "C++", "extension": ".cpp",
//!      "compile": {"compiler": "g++", "format": "{} {} {} -o {}", "default-flags": ["-O2"]}},
//!     {"name": "Python", "extension": ".py"}
//! ]}"#).unwrap();
//! let cpp = config.profile_for("sol.cpp").unwrap();
//! assert!(cpp.needs_compilation());
//! assert_eq!(cpp.executable_path("sol.cpp").to_str(), Some("sol.bin"));
//! assert!(config.profile_for("sol.foobar").is_err());
//! ```

#![deny(missing_docs)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate lazy_static;

mod config;
mod profile;
mod scaffold;
mod solution;
mod template;

pub use config::{ConfigError, LanguageConfig, CONFIG_ENV_VAR, CONFIG_FILE_NAME};
pub use profile::{CompileSpec, InitFile, InitTemplate, LanguageProfile};
pub use scaffold::{scaffold, ScaffoldReport};
pub use solution::{
    needs_recompile, CompileStatus, Solution, SolutionError, COMPILE_TIMEOUT,
    DEFAULT_SOLUTION_TIMEOUT,
};
pub use template::{command_line, render};
