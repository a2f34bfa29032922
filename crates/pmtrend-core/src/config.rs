use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use pmtrend_parser::{FieldMap, ReaderOptions};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::quality::QualityPolicy;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSource {
    pub label: String,
    pub path: PathBuf,
}

/// Parses `LABEL=PATH`, the form accepted on the command line.
impl FromStr for PeriodSource {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let (label, path) = value
            .split_once('=')
            .ok_or_else(|| format!("expected LABEL=PATH, got '{value}'"))?;
        let label = label.trim();
        let path = path.trim();
        if label.is_empty() || path.is_empty() {
            return Err(format!("expected LABEL=PATH, got '{value}'"));
        }
        Ok(PeriodSource {
            label: label.to_string(),
            path: PathBuf::from(path),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub reader: ReaderOptions,
    #[serde(default)]
    pub fields: FieldMap,
    #[serde(default)]
    pub policy: QualityPolicy,
    #[serde(default)]
    pub periods: Vec<PeriodSource>,
}

impl PipelineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads a TOML file; relative period paths resolve against the file's directory.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    pub fn resolve_paths(&mut self, base: &Path) {
        for period in &mut self.periods {
            if period.path.is_relative() {
                period.path = base.join(&period.path);
            }
        }
    }
}
