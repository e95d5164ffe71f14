//! The state shared by the subcommands for the duration of a run.

use std::path::Path;

use anyhow::{Context, Error};

use hazmat_exec::{Interrupt, ProcessRunner, TempFileManager};
use hazmat_lang::LanguageConfig;

/// Everything a subcommand needs: the languages, the process runner bound to the ^C handler and
/// the scratch files, removed when the context is dropped.
pub struct RuntimeContext {
    /// The known languages.
    pub config: LanguageConfig,
    /// The runner of every external program.
    pub runner: ProcessRunner,
    /// Owner of the scratch files of the run.
    pub scratch: TempFileManager,
}

impl RuntimeContext {
    /// Load the language configuration and bind the ^C handler to the runner.
    pub fn new(config_path: Option<&Path>) -> Result<RuntimeContext, Error> {
        let config =
            LanguageConfig::discover(config_path).context("Failed to load the configuration")?;
        let context = RuntimeContext::with_config(config)?;

        #[cfg(not(test))]
        {
            let interrupt = context.interrupt().clone();
            if let Err(e) = ctrlc::set_handler(move || {
                if interrupt.is_triggered() {
                    warn!("Already stopping, please wait");
                }
                interrupt.trigger();
            }) {
                warn!("Cannot bind control-C handler: {:?}", e);
            }
        }
        Ok(context)
    }

    /// A context with the given languages and no ^C handler.
    pub fn with_config(config: LanguageConfig) -> Result<RuntimeContext, Error> {
        Ok(RuntimeContext {
            config,
            runner: ProcessRunner::new(Interrupt::new()),
            scratch: TempFileManager::new()?,
        })
    }

    /// The token that stops the run.
    pub fn interrupt(&self) -> &Interrupt {
        self.runner.interrupt()
    }
}
