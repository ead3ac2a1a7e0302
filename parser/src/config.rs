use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::flags::FlagLayout;

/// Session configuration, loadable from a TOML file.
///
/// All fields default to their standard values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(default)]
#[builder(default, setter(into))]
pub struct SessionConfig {
    /// Capture read by `Session::run_configured`.
    pub input_path: Option<PathBuf>,
    /// Size in bytes of each compressed frame in the capture.
    pub chunk_size: usize,
    pub flag_layout: FlagLayout,
    /// Aim changes whose summed per-axis difference is below this are
    /// reported as consistent.
    pub aim_epsilon: f32,
    /// Aim samples kept per player. At least 2.
    pub aim_history_len: usize,
    /// Events handed to the sink between flushes.
    pub flush_batch_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            input_path: None,
            chunk_size: 64,
            flag_layout: FlagLayout::Standard,
            aim_epsilon: 0.01,
            aim_history_len: 32,
            flush_batch_size: 100,
        }
    }
}

impl SessionConfig {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be non-zero".into()));
        }
        if self.flush_batch_size == 0 {
            return Err(Error::InvalidConfig(
                "flush_batch_size must be non-zero".into(),
            ));
        }
        if self.aim_history_len < 2 {
            return Err(Error::InvalidConfig(format!(
                "aim_history_len must be at least 2, got {}",
                self.aim_history_len
            )));
        }
        if !self.aim_epsilon.is_finite() || self.aim_epsilon < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "aim_epsilon must be a finite non-negative number, got {}",
                self.aim_epsilon
            )));
        }
        Ok(())
    }

    /// Generate a commented default TOML config string.
    pub fn generate_default_toml() -> String {
        r#"# Demo analysis configuration

# Path to the capture file
# input_path = "demo.dm_84"

# Size in bytes of each compressed frame
chunk_size = 64

# Bit layout of the entity flags (only "standard" is supported:
# weapon in bits 8-15, player in bits 16-23)
flag_layout = "standard"

# Aim changes smaller than this (sum of per-axis differences) count as consistent
aim_epsilon = 0.01

# Aim samples kept per player
aim_history_len = 32

# Events written between sink flushes
flush_batch_size = 100
"#
        .to_string()
    }
}
