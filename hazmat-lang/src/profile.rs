use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::template::{command_line, quote};
use crate::ConfigError;

/// Extension given to the executables compiled from a source.
const EXECUTABLE_EXTENSION: &str = "bin";

/// How to compile the sources of a language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileSpec {
    /// The compiler program.
    pub compiler: String,
    /// The command template, with the placeholders for compiler, flags, sources and executable, in
    /// this order.
    pub format: String,
    /// The flags used when none are given explicitly.
    #[serde(rename = "default-flags", default)]
    pub default_flags: Vec<String>,
}

/// A file copied when scaffolding a new task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitFile {
    /// The template file.
    pub src: String,
    /// Where to copy it, relative to the task directory. `{}` is replaced with the task name.
    pub dest: String,
}

/// A recipe for scaffolding a new task.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InitTemplate {
    /// Directories to create, relative to the task directory. `{}` is replaced with the task name.
    #[serde(default)]
    pub dirs: Vec<String>,
    /// Files to copy.
    #[serde(default)]
    pub files: Vec<InitFile>,
}

/// A language, as described in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageProfile {
    /// Human readable name.
    pub name: String,
    /// Extension of the source files, with the leading dot.
    pub extension: String,
    /// How to compile a source. `None` for the languages executed directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile: Option<CompileSpec>,
    /// The scaffolding recipes, by type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<BTreeMap<String, InitTemplate>>,
    /// Command template that merges the local dependencies of a source: `{}` source, `{}` output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge: Option<String>,
}

impl LanguageProfile {
    /// Whether the sources must be compiled before running them.
    pub fn needs_compilation(&self) -> bool {
        self.compile.is_some()
    }

    /// The compilation step, failing if the language has none.
    pub fn compile_spec(&self) -> Result<&CompileSpec, ConfigError> {
        self.compile
            .as_ref()
            .ok_or_else(|| ConfigError::MissingCompile {
                language: self.name.clone(),
            })
    }

    /// The path of the program to execute for a source: the source itself for the languages without
    /// compilation, the source with the `.bin` extension otherwise.
    pub fn executable_path<P: AsRef<Path>>(&self, source: P) -> PathBuf {
        let source = source.as_ref();
        if self.needs_compilation() {
            source.with_extension(EXECUTABLE_EXTENSION)
        } else {
            source.to_owned()
        }
    }

    /// The command line that compiles `sources` into `executable`. Without `flags` the default ones
    /// are used.
    pub fn compile_command(
        &self,
        sources: &[&Path],
        executable: &Path,
        flags: Option<&[String]>,
    ) -> Result<Vec<String>, ConfigError> {
        let spec = self.compile_spec()?;
        let flags = flags.unwrap_or(spec.default_flags.as_slice()).join(" ");
        let sources = sources
            .iter()
            .map(|s| quote(s))
            .collect::<Vec<_>>()
            .join(" ");
        command_line(
            &spec.format,
            &[
                spec.compiler.as_str(),
                flags.as_str(),
                sources.as_str(),
                quote(executable).as_str(),
            ],
        )
    }

    /// The scaffolding recipe of the given type.
    pub fn init_template(&self, kind: &str) -> Result<&InitTemplate, ConfigError> {
        let init = self.init.as_ref().ok_or_else(|| ConfigError::MissingInit {
            language: self.name.clone(),
        })?;
        init.get(kind).ok_or_else(|| ConfigError::MissingInitType {
            language: self.name.clone(),
            kind: kind.to_string(),
        })
    }

    /// The command line that merges `source` into `output`.
    pub fn merge_command(&self, source: &Path, output: &Path) -> Result<Vec<String>, ConfigError> {
        let merge = self.merge.as_ref().ok_or_else(|| ConfigError::MissingMerge {
            language: self.name.clone(),
        })?;
        command_line(merge, &[quote(source).as_str(), quote(output).as_str()])
    }
}
