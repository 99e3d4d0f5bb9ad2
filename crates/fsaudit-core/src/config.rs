//! Audit configuration and config-file loading.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SizeParseError};
use crate::size::{DEFAULT_THRESHOLD, parse_size};

/// How flagged files may be deleted after the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteMode {
    /// Never offer deletion.
    #[default]
    Never,
    /// One confirmation covers every flagged file of an analysis.
    Batch,
    /// Confirm each flagged file individually.
    OneByOne,
}

/// Configuration for one audit run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct AuditConfig {
    /// Root directory to audit.
    pub root: PathBuf,

    /// Large-file threshold as a human string (`None` = 1 MiB).
    #[builder(setter(into, strip_option), default)]
    #[serde(default)]
    pub size_threshold: Option<String>,

    /// Traverse symbolic links to directories.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub follow_symlinks: bool,

    /// Deletion behaviour after reporting.
    #[builder(default)]
    #[serde(default)]
    pub delete_mode: DeleteMode,

    /// File that receives logs and report output instead of the terminal.
    #[builder(setter(into, strip_option), default)]
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// JSON file replacing the built-in extension table.
    #[builder(setter(into, strip_option), default)]
    #[serde(default)]
    pub categories_file: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl AuditConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.root {
            Some(ref root) if root.as_os_str().is_empty() => {
                Err("Root path cannot be empty".to_string())
            }
            Some(_) => Ok(()),
            None => Err("Root path is required".to_string()),
        }
    }
}

impl AuditConfig {
    /// Create a new config builder.
    pub fn builder() -> AuditConfigBuilder {
        AuditConfigBuilder::default()
    }

    /// Create a config with defaults for everything but the root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            size_threshold: None,
            follow_symlinks: true,
            delete_mode: DeleteMode::Never,
            log_file: None,
            categories_file: None,
        }
    }

    /// The large-file threshold in bytes.
    pub fn threshold_bytes(&self) -> Result<u64, SizeParseError> {
        match self.size_threshold.as_deref() {
            Some(text) => parse_size(text),
            None => Ok(DEFAULT_THRESHOLD),
        }
    }

    /// Whether output is redirected to a log file.
    pub fn is_logging_to_file(&self) -> bool {
        self.log_file.is_some()
    }

    /// Overlay values from a config file. File values win.
    pub fn apply_settings(mut self, settings: &Settings) -> Self {
        if let Some(ref path) = settings.path {
            self.root = path.clone();
        }
        if let Some(ref size) = settings.size {
            self.size_threshold = Some(size.to_threshold_string());
        }
        if let Some(delete) = settings.delete {
            self.delete_mode = match (delete, self.delete_mode) {
                (false, _) => DeleteMode::Never,
                (true, DeleteMode::Never) => DeleteMode::Batch,
                (true, mode) => mode,
            };
        }
        if let Some(ref log) = settings.log {
            self.log_file = Some(log.clone());
        }
        self
    }
}

/// A size in a config file: either a byte count or a human string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SizeSetting {
    Bytes(u64),
    Text(String),
}

impl SizeSetting {
    fn to_threshold_string(&self) -> String {
        match self {
            Self::Bytes(bytes) => bytes.to_string(),
            Self::Text(text) => text.clone(),
        }
    }
}

/// The `[settings]` table of a config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub size: Option<SizeSetting>,
    #[serde(default)]
    pub delete: Option<bool>,
    #[serde(default)]
    pub log: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    settings: Settings,
}

impl Settings {
    /// Load the `[settings]` table from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse the `[settings]` table from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        let file: SettingsFile = toml::from_str(text)?;
        Ok(file.settings)
    }
}
