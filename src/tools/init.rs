use std::path::{Path, PathBuf};

use anyhow::{anyhow, Error};
use clap::{Parser, ValueHint};

use hazmat_format::ui::Reporter;
use hazmat_lang::{scaffold, LanguageConfig};

#[derive(Parser, Debug, Clone)]
pub struct InitOpt {
    /// Name of the problem, with the extension of its language (e.g. `lis.cpp`)
    pub name: PathBuf,

    /// Where to create the problem
    #[clap(long, default_value = "./", value_hint = ValueHint::DirPath)]
    pub path: PathBuf,

    /// Which template of the language to use
    #[clap(long = "type", short = 't', default_value = "default")]
    pub kind: String,
}

pub fn main_init(opt: InitOpt, config: Option<&Path>) -> Result<(), Error> {
    let config = LanguageConfig::discover(config)?;
    let profile = config.profile_for(&opt.name)?;
    let name = opt
        .name
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .ok_or_else(|| anyhow!("Invalid name {}", opt.name.display()))?;
    let report = scaffold(&config, &profile, &opt.kind, &name, &opt.path)?;

    let mut reporter = Reporter::stdout(3);
    for dir in &report.created_dirs {
        reporter.info(format!("Created {}", dir.display()));
    }
    for file in &report.copied {
        reporter.info(format!("Created {}", file.display()));
    }
    for file in &report.skipped {
        reporter.warning(format!("File {} already exists, skipping", file.display()));
    }
    reporter.success(format!(
        "Initialized {} ({}) in {}",
        name,
        profile.name,
        opt.path.display()
    ));
    Ok(())
}
