use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::LanguageProfile;

/// Environment variable with the path of the configuration file.
pub const CONFIG_ENV_VAR: &str = "HAZMAT_CONFIG";
/// Name of the configuration file inside the user configuration directory.
pub const CONFIG_FILE_NAME: &str = "hazmat.json";

/// The problems with the language configuration. They are fatal for the operation that hit them.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No profile handles the extension of a file.
    #[error("Non valid provider in config: no language with extension {extension:?}")]
    UnknownExtension {
        /// The extension, with the leading dot.
        extension: String,
    },
    /// Two profiles have the same extension.
    #[error("Extension {extension:?} is defined more than once in the config")]
    DuplicateExtension {
        /// The duplicated extension.
        extension: String,
    },
    /// The profile has no compilation step but one is required.
    #[error("No compile information for {language} in config")]
    MissingCompile {
        /// The name of the profile.
        language: String,
    },
    /// The profile has no initialization data.
    #[error("No initialization data for {language} in config")]
    MissingInit {
        /// The name of the profile.
        language: String,
    },
    /// The profile has initialization data, but not of the requested type.
    #[error("No initialization of type {kind:?} for {language} in config")]
    MissingInitType {
        /// The name of the profile.
        language: String,
        /// The requested type.
        kind: String,
    },
    /// The profile has no merge command.
    #[error("Unable to detect merge command for {language} in config")]
    MissingMerge {
        /// The name of the profile.
        language: String,
    },
    /// A command template cannot be rendered.
    #[error("Invalid command template {template:?}: {reason}")]
    InvalidTemplate {
        /// The template.
        template: String,
        /// What is wrong with it.
        reason: String,
    },
    /// The configuration file cannot be read.
    #[error("Failed to read the config file {path}")]
    Read {
        /// The configuration file.
        path: PathBuf,
        /// The error from the OS.
        #[source]
        source: std::io::Error,
    },
    /// The configuration file is not valid.
    #[error("Invalid config file {origin}")]
    Parse {
        /// Where the configuration comes from.
        origin: String,
        /// The error from the parser.
        #[source]
        source: serde_json::Error,
    },
}

/// The content of the configuration file.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    languages: Vec<LanguageProfile>,
}

/// All the known languages, keyed by extension. Immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct LanguageConfig {
    /// The profiles, keyed by extension (with the leading dot).
    profiles: BTreeMap<String, Arc<LanguageProfile>>,
    /// The file this configuration was loaded from, if any.
    origin: Option<PathBuf>,
}

impl LanguageConfig {
    /// Build a configuration from a list of profiles.
    pub fn from_profiles<I>(profiles: I) -> Result<LanguageConfig, ConfigError>
    where
        I: IntoIterator<Item = LanguageProfile>,
    {
        let mut map = BTreeMap::new();
        for profile in profiles {
            let extension = profile.extension.clone();
            if map.insert(extension.clone(), Arc::new(profile)).is_some() {
                return Err(ConfigError::DuplicateExtension { extension });
            }
        }
        Ok(LanguageConfig {
            profiles: map,
            origin: None,
        })
    }

    /// Parse the JSON content of a configuration file.
    pub fn parse(content: &str) -> Result<LanguageConfig, ConfigError> {
        Self::parse_with_origin(content, "<inline>")
    }

    fn parse_with_origin(content: &str, origin: &str) -> Result<LanguageConfig, ConfigError> {
        let file: ConfigFile =
            serde_json::from_str(content).map_err(|source| ConfigError::Parse {
                origin: origin.to_string(),
                source,
            })?;
        LanguageConfig::from_profiles(file.languages)
    }

    /// Load the configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<LanguageConfig, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let mut config = Self::parse_with_origin(&content, &path.display().to_string())?;
        config.origin = Some(path.to_owned());
        debug!(
            "Loaded {} languages from {}",
            config.profiles.len(),
            path.display()
        );
        Ok(config)
    }

    /// Where to look for the configuration: the explicit path if given, then the path in
    /// `$HAZMAT_CONFIG`, then `hazmat.json` in the user configuration directory.
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_owned());
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }
        directories::ProjectDirs::from("", "", "hazmat")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Load the configuration from the located path. A missing default file yields an empty
    /// configuration, a missing explicit file is an error.
    pub fn discover(explicit: Option<&Path>) -> Result<LanguageConfig, ConfigError> {
        match LanguageConfig::locate(explicit) {
            Some(path) if explicit.is_some() || path.exists() => LanguageConfig::load(path),
            Some(path) => {
                warn!(
                    "Config file {} not found, no language is known",
                    path.display()
                );
                Ok(LanguageConfig::default())
            }
            None => {
                warn!("Cannot find the user configuration directory, no language is known");
                Ok(LanguageConfig::default())
            }
        }
    }

    /// The file this configuration was loaded from.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Resolve a path written in the configuration: relative paths are relative to the directory of
    /// the configuration file.
    pub fn resolve_asset<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        let path = path.as_ref();
        match self.origin.as_ref().and_then(|o| o.parent()) {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_owned(),
        }
    }

    /// The profile for a given extension, with the leading dot.
    pub fn profile_by_extension(&self, extension: &str) -> Result<Arc<LanguageProfile>, ConfigError> {
        self.profiles
            .get(extension)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownExtension {
                extension: extension.to_string(),
            })
    }

    /// The profile of a file, detected from its extension.
    pub fn profile_for<P: AsRef<Path>>(&self, path: P) -> Result<Arc<LanguageProfile>, ConfigError> {
        let extension = path
            .as_ref()
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        self.profile_by_extension(&extension)
    }

    /// All the profiles, sorted by extension.
    pub fn profiles(&self) -> impl Iterator<Item = &LanguageProfile> {
        self.profiles.values().map(|p| p.as_ref())
    }
}
