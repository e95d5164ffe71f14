//! The subcommands of `hazmat`, one module each. Every module has the options of its subcommand
//! and a `main_<tool>` function that runs it.

use anyhow::{Context, Error};
use termcolor::WriteColor;

use hazmat_format::ui::Reporter;
use hazmat_format::ResultAggregator;

use crate::orchestrator::LoopOutcome;

pub mod build;
pub mod gen_autocompletion;
pub mod generate;
pub mod init;
pub mod live;
pub mod merge;
pub mod run;

pub use build::main_build;
pub use gen_autocompletion::main_gen_autocompletion;
pub use generate::main_generate;
pub use init::main_init;
pub use live::main_live;
pub use merge::main_merge;
pub use run::main_run;
pub use test::main_test;

/// Split the `--flags` of the compiler like a shell would.
pub(crate) fn compiler_flags(flags: Option<&str>) -> Result<Option<Vec<String>>, Error> {
    flags
        .map(|flags| {
            shell_words::split(flags).with_context(|| format!("Invalid compiler flags {flags:?}"))
        })
        .transpose()
}

/// Print the end of a run: the tally and, if asked, the summary. `outcome` is `None` when the run
/// stopped because of an error.
pub(crate) fn print_results<W: WriteColor>(
    reporter: &mut Reporter<W>,
    aggregator: &ResultAggregator,
    outcome: Option<LoopOutcome>,
    summary: u8,
) {
    reporter.finish_progress();
    if outcome == Some(LoopOutcome::Interrupted) {
        reporter.info("Running tests canceled due to KeyboardInterrupt");
    }
    reporter.newline();
    reporter.status(aggregator);
    if summary > 0 {
        reporter.summary(&aggregator.summary(summary));
    }
}
