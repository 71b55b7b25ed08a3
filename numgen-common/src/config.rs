use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinningConfig {
    #[serde(default = "default_min_bin_size")]
    pub min_bin_size: u64,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_min_bin_size() -> u64 {
    25000
}
fn default_batch_size() -> usize {
    65536
}

impl Default for BinningConfig {
    fn default() -> Self {
        Self {
            min_bin_size: default_min_bin_size(),
            batch_size: default_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentinelConfig {
    #[serde(default = "default_marker")]
    pub marker: i64,
    #[serde(default)]
    pub neutral_value: i64,
}

fn default_marker() -> i64 {
    9999
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            neutral_value: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_format() -> String {
    "json".into()
}
fn default_output_dir() -> String {
    ".".into()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            output_dir: default_output_dir(),
        }
    }
}

/// How the "missing data" marker is treated for one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentinelPolicy {
    /// Marker means "no recorded value": strip it before binning, keep only its count.
    Exclude,
    /// Marker is binned like any other value but mapped to the neutral value on output.
    Include,
    #[default]
    None,
}

/// Per-attribute overrides; unset fields fall back to `[binning]` / `[sentinel]`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AttributeConfig {
    #[serde(default)]
    pub min_bin_size: Option<u64>,
    #[serde(default)]
    pub sentinel: SentinelPolicy,
    #[serde(default)]
    pub null_as_sentinel: bool,
}

/// Fully resolved settings for generalizing one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSpec {
    pub column: String,
    pub min_bin_size: u64,
    pub sentinel: SentinelPolicy,
    pub marker: i64,
    pub neutral_value: i64,
    pub null_as_sentinel: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub binning: BinningConfig,
    #[serde(default)]
    pub sentinel: SentinelConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeConfig>,
}

impl Config {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("numgen")
            .join("config.toml")
    }

    pub fn load() -> crate::Result<Self> {
        let path = if let Ok(env_path) = std::env::var("NUMGEN_CONFIG") {
            PathBuf::from(env_path) // $NUMGEN_CONFIG overrides default config path
        } else {
            Self::config_path()
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::NumgenError::Config(e.to_string()))
    }

    pub fn attribute_spec(&self, column: &str) -> AttributeSpec {
        let attr = self.attributes.get(column).cloned().unwrap_or_default();
        AttributeSpec {
            column: column.to_owned(),
            min_bin_size: attr.min_bin_size.unwrap_or(self.binning.min_bin_size),
            sentinel: attr.sentinel,
            marker: self.sentinel.marker,
            neutral_value: self.sentinel.neutral_value,
            null_as_sentinel: attr.null_as_sentinel,
        }
    }
}
