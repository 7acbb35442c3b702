//! Configuration file support
//!
//! A config file names the data file and, optionally, a custom layout:
//!
//! ```toml
//! data_file = "custfile.dat"
//!
//! [[fields]]
//! name = "id"
//! width = 6
//!
//! [[fields]]
//! width = 14   # filler
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;

use custfile_engine::{FieldSpec, RecordLayout};

/// Data file used when neither the command line nor the config names one
pub const DEFAULT_DATA_FILE: &str = "custfile.dat";

/// Built-in customer layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LayoutPreset {
    /// id 6, name 30, address 30, city 20 (100-byte records)
    Customer,
    /// id 6, name 20, address 20, city 15 (100-byte records)
    Compact,
    /// customer fields plus state 2, zip 5, phone 10 (103-byte records)
    Extended,
}

impl LayoutPreset {
    pub fn layout(self) -> RecordLayout {
        match self {
            LayoutPreset::Customer => RecordLayout::customer(),
            LayoutPreset::Compact => RecordLayout::customer_compact(),
            LayoutPreset::Extended => RecordLayout::customer_extended(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub data_file: Option<PathBuf>,
    pub fields: Option<Vec<FieldSpec>>,
}

impl Config {
    /// Read and parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Layout described by the `[[fields]]` tables, if any
    pub fn layout(&self) -> Result<Option<RecordLayout>> {
        match &self.fields {
            Some(fields) => Ok(Some(RecordLayout::new(fields.clone())?)),
            None => Ok(None),
        }
    }

    /// Resolve the data file: command line, then config, then the default
    pub fn data_file(&self, cli: Option<&Path>) -> PathBuf {
        cli.map(Path::to_path_buf)
            .or_else(|| self.data_file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE))
    }

    /// Resolve the layout: command-line preset, then config, then `customer`
    pub fn resolve_layout(&self, cli: Option<LayoutPreset>) -> Result<RecordLayout> {
        if let Some(preset) = cli {
            return Ok(preset.layout());
        }
        Ok(self.layout()?.unwrap_or_else(RecordLayout::customer))
    }
}
