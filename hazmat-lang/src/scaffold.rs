use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Error};

use crate::{LanguageConfig, LanguageProfile};

/// What `scaffold` did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScaffoldReport {
    /// The directories that have been created.
    pub created_dirs: Vec<PathBuf>,
    /// The files that have been copied.
    pub copied: Vec<PathBuf>,
    /// The files that already existed and have been left untouched.
    pub skipped: Vec<PathBuf>,
}

/// Scaffold a new task named `name` inside `dir`, following the `kind` recipe of the language.
///
/// Every `{}` in the recipe paths is replaced with `name`. The template files are resolved with
/// `LanguageConfig::resolve_asset`. Existing files are never overwritten.
pub fn scaffold(
    config: &LanguageConfig,
    profile: &LanguageProfile,
    kind: &str,
    name: &str,
    dir: &Path,
) -> Result<ScaffoldReport, Error> {
    let template = profile.init_template(kind)?;
    if !dir.is_dir() {
        bail!("Directory {} does not exist", dir.display());
    }
    let mut report = ScaffoldReport::default();
    for folder in &template.dirs {
        let folder = dir.join(folder.replace("{}", name));
        if !folder.is_dir() {
            std::fs::create_dir_all(&folder)
                .with_context(|| format!("Failed to create directory {}", folder.display()))?;
            report.created_dirs.push(folder);
        }
    }
    for file in &template.files {
        let src = config.resolve_asset(&file.src);
        let dest = dir.join(file.dest.replace("{}", name));
        if dest.exists() {
            warn!("File {} already exists, skipping", dest.display());
            report.skipped.push(dest);
            continue;
        }
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        std::fs::copy(&src, &dest).with_context(|| {
            format!("Failed to copy {} to {}", src.display(), dest.display())
        })?;
        debug!("Copied {} to {}", src.display(), dest.display());
        report.copied.push(dest);
    }
    Ok(report)
}
