//! Writes the shell completion scripts of hazmat, by default inside target/autocompletion.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Error};
use clap::{CommandFactory, Parser, ValueHint};
use clap_complete::{Generator, Shell};

use crate::Opt;

const SHELLS: [Shell; 5] = [
    Shell::Bash,
    Shell::Zsh,
    Shell::Fish,
    Shell::Elvish,
    Shell::PowerShell,
];

#[derive(Parser, Debug, Clone)]
pub struct GenAutocompletionOpt {
    /// Where to write the autocompletion files
    #[clap(short = 't', long = "target", value_hint = ValueHint::DirPath)]
    pub target: Option<PathBuf>,
}

pub fn main_gen_autocompletion(opt: GenAutocompletionOpt) -> Result<(), Error> {
    let target = opt
        .target
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("target/autocompletion"));
    std::fs::create_dir_all(&target)
        .with_context(|| format!("Failed to create target dir: {}", target.display()))?;
    for shell in SHELLS {
        let path = target.join(shell.file_name("hazmat"));
        let mut file = File::create(&path).with_context(|| {
            format!("Failed to create the {} completion at {}", shell, path.display())
        })?;
        clap_complete::generate(shell, &mut Opt::command(), "hazmat", &mut file);
        debug!("Written {}", path.display());
    }
    Ok(())
}
