//! Project settings file.
//!
//! An optional `.archlint.yml` at the project root tunes thresholds and
//! defaults. Every key is optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ArchlintError, Result};
use crate::validate::output::OutputFormat;

/// File name of the project settings file.
pub const SETTINGS_FILE: &str = ".archlint.yml";

/// Default directory holding the layer documents.
pub const DEFAULT_KNOWLEDGE_ROOT: &str = "knowledge-base";

/// Tunable validation settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory holding the layer documents, relative to the project root.
    pub knowledge_root: PathBuf,

    /// Descriptions shorter than this many characters get a warning.
    pub min_description_length: usize,

    /// Share of `tight` component relations above which a warning is raised.
    pub tight_coupling_ratio: f64,

    /// Report format used when no `--format` flag is given.
    pub format: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            knowledge_root: PathBuf::from(DEFAULT_KNOWLEDGE_ROOT),
            min_description_length: 10,
            tight_coupling_ratio: 0.3,
            format: OutputFormat::Human,
        }
    }
}

impl Settings {
    /// Load settings from `<project_root>/.archlint.yml`.
    ///
    /// A missing or empty file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `SettingsParse` if the file is not valid settings YAML.
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join(SETTINGS_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let settings = Self::parse(&content).map_err(|message| {
            tracing::warn!(path = %path.display(), %message, "unusable settings file");
            ArchlintError::SettingsParse {
                path: path.clone(),
                message,
            }
        })?;
        tracing::debug!(path = %path.display(), ?settings, "loaded settings");
        Ok(settings)
    }

    /// Parse settings YAML.
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
        if !(0.0..=1.0).contains(&settings.tight_coupling_ratio) {
            return Err(format!(
                "tight_coupling_ratio must be between 0 and 1, got {}",
                settings.tight_coupling_ratio
            ));
        }
        Ok(settings)
    }
}
