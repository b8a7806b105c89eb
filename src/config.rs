//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/draftwork/draftwork.toml`
//! 3. Local config: `<dir>/.draftwork.toml`
//! 4. Environment variables: `DRAFTWORK_*` prefix

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Contract type directory for non-disclosure fragments.
pub const NONDISCLOSURE: &str = "nondisclosure";

/// Rendering of a generated contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text, blank-line separated
    #[default]
    Text,
    /// Full document tree as JSON
    Json,
    /// Section and clause titles only
    Outline,
}

impl OutputFormat {
    /// File extension used when writing to an output directory.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text | OutputFormat::Outline => "txt",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Outline => "outline",
        };
        f.write_str(name)
    }
}

/// Agreement clause selection for non-disclosure agreements.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NondisclosureConfig {
    /// Baseline clause fragment names, in document order
    pub baseline_clauses: Vec<String>,
    /// Title prefix of the clause that term and enforcement clauses precede
    pub anchor_prefix: String,
}

impl Default for NondisclosureConfig {
    fn default() -> Self {
        Self {
            baseline_clauses: [
                "definitions",
                "nonuse_and_nondisclosure",
                "use_and_treatment_of",
                "data_privacy",
                "rights_to",
                "return_or_destruction_of",
                "third_party_stipulation",
                "no_warranty",
                "miscellaneous",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            anchor_prefix: "no warranty".into(),
        }
    }
}

/// Raw non-disclosure config for intermediate parsing (`None` → not specified).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawNondisclosureConfig {
    pub baseline_clauses: Option<Vec<String>>,
    pub anchor_prefix: Option<String>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub fragments_dir: Option<PathBuf>,
    pub output_format: Option<OutputFormat>,
    pub nondisclosure: RawNondisclosureConfig,
}

impl NondisclosureConfig {
    /// Scalar and list options both REPLACE: clause order is significant,
    /// so lists are never unioned.
    pub fn merge(&self, overlay: &RawNondisclosureConfig) -> Self {
        Self {
            baseline_clauses: overlay
                .baseline_clauses
                .clone()
                .unwrap_or_else(|| self.baseline_clauses.clone()),
            anchor_prefix: overlay
                .anchor_prefix
                .clone()
                .unwrap_or_else(|| self.anchor_prefix.clone()),
        }
    }
}

/// Unified configuration for draftwork.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Root directory of the fragment library (default: ./fragments)
    pub fragments_dir: PathBuf,
    /// Default output format of `generate`
    pub output_format: OutputFormat,
    /// Non-disclosure agreement assembly
    pub nondisclosure: NondisclosureConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fragments_dir: PathBuf::from("fragments"),
            output_format: OutputFormat::default(),
            nondisclosure: NondisclosureConfig::default(),
        }
    }
}

/// Get the XDG config directory for draftwork.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "draftwork").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("draftwork.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".draftwork.toml")
}

/// Expand `~`, `$VAR` and `${VAR}`; unknown variables leave the input as is.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.fragments_dir.to_string_lossy().as_ref());
        self.fragments_dir = PathBuf::from(expanded);
    }

    /// Overlay wins for every field it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            fragments_dir: overlay
                .fragments_dir
                .clone()
                .unwrap_or_else(|| self.fragments_dir.clone()),
            output_format: overlay.output_format.unwrap_or(self.output_format),
            nondisclosure: self.nondisclosure.merge(&overlay.nondisclosure),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.draftwork.toml`
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/draftwork/draftwork.toml`
    /// 3. Local config: `<local_dir>/.draftwork.toml`
    /// 4. Environment variables: `DRAFTWORK_*` prefix
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply DRAFTWORK_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("DRAFTWORK")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("nondisclosure.baseline_clauses")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("fragments_dir") {
            settings.fragments_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("output_format") {
            settings.output_format =
                OutputFormat::from_str(&val, true).map_err(|e| ApplicationError::Config {
                    message: format!("DRAFTWORK_OUTPUT_FORMAT: {e}"),
                })?;
        }
        if let Ok(val) = config.get_string("nondisclosure.anchor_prefix") {
            settings.nondisclosure.anchor_prefix = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("nondisclosure.baseline_clauses") {
            settings.nondisclosure.baseline_clauses = val;
        }

        Ok(settings)
    }

    /// Render settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_clause_set_contains_anchor() {
        let cfg = NondisclosureConfig::default();
        assert_eq!(cfg.baseline_clauses.len(), 9);
        assert!(cfg.baseline_clauses.contains(&"no_warranty".to_string()));
    }

    #[test]
    fn test_merge_replaces_lists() {
        let base = NondisclosureConfig::default();
        let merged = base.merge(&RawNondisclosureConfig {
            baseline_clauses: Some(vec!["no_warranty".into()]),
            anchor_prefix: None,
        });
        assert_eq!(merged.baseline_clauses, vec!["no_warranty".to_string()]);
        assert_eq!(merged.anchor_prefix, "no warranty");
    }
}
