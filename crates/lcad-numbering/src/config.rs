//! `lcad.toml` handling.
//!
//! ```toml
//! [numbering]
//! starting-serial-no = 100
//! placeholder-spacing = 30
//! grid = 10
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::circuit::Circuit;
use crate::instance::SerialNo;

pub const CONFIG_FILE_NAME: &str = "lcad.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse lcad.toml: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid numbering config: {0}")]
    Invalid(String),
}

/// Knobs for a numbering run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct NumberingConfig {
    /// Overrides the circuit's own starting serial number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting_serial_no: Option<SerialNo>,
    /// Gap between placeholder components, in canvas units.
    pub placeholder_spacing: i32,
    /// Grid placeholders are snapped to.
    pub grid: i32,
}

impl Default for NumberingConfig {
    fn default() -> Self {
        Self {
            starting_serial_no: None,
            placeholder_spacing: 30,
            grid: 10,
        }
    }
}

impl NumberingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid <= 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must be positive, got {}",
                self.grid
            )));
        }
        if self.placeholder_spacing < 0 {
            return Err(ConfigError::Invalid(format!(
                "placeholder-spacing must not be negative, got {}",
                self.placeholder_spacing
            )));
        }
        Ok(())
    }

    pub fn starting_serial_no_for(&self, circuit: &Circuit) -> SerialNo {
        self.starting_serial_no.unwrap_or(circuit.starting_serial_no)
    }
}

/// Top-level `lcad.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LcadToml {
    #[serde(default)]
    pub numbering: NumberingConfig,
}

impl LcadToml {
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: LcadToml = toml::from_str(content)?;
        config.numbering.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Nearest `lcad.toml` in `start` or one of its ancestors.
    pub fn find(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = LcadToml::parse("").unwrap();
        assert_eq!(config.numbering, NumberingConfig::default());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = LcadToml::parse("[numbering]\nstarting-serial-no = 100\n").unwrap();
        assert_eq!(config.numbering.starting_serial_no, Some(100));
        assert_eq!(config.numbering.placeholder_spacing, 30);
        assert_eq!(config.numbering.grid, 10);
    }

    #[test]
    fn rejects_bad_grid() {
        let err = LcadToml::parse("[numbering]\ngrid = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_types() {
        let err = LcadToml::parse("[numbering]\ngrid = \"ten\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn override_beats_circuit_attribute() {
        let mut circuit = Circuit::new("main");
        circuit.starting_serial_no = 5;
        let mut config = NumberingConfig::default();
        assert_eq!(config.starting_serial_no_for(&circuit), 5);
        config.starting_serial_no = Some(40);
        assert_eq!(config.starting_serial_no_for(&circuit), 40);
    }

    #[test]
    fn find_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "").unwrap();
        assert_eq!(
            LcadToml::find(&nested),
            Some(dir.path().join(CONFIG_FILE_NAME))
        );
    }
}
