use eyre::{Result, WrapErr};
use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{cache::CacheConfig, error::SimError};

/// the options of one run, from a config file, the command line, or both
///
/// A config file is plain TOML:
/// ```toml
/// s = 4
/// E = 1
/// b = 4
/// trace = "traces/yi.trace"
/// verbose = true
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// set index bits
    pub s: Option<i64>,
    /// lines per set
    #[serde(rename = "E")]
    pub e: Option<i64>,
    /// block offset bits
    pub b: Option<i64>,
    pub trace: Option<PathBuf>,
    #[serde(default)]
    pub verbose: bool,
}

impl Config {
    pub fn from_config_file(config_file: impl AsRef<Path>) -> Result<Config> {
        let config_file =
            fs::read_to_string(config_file.as_ref()).wrap_err("cannot read config file")?;
        let config: Config =
            toml::from_str(&config_file).wrap_err("cannot deserialize to Config")?;
        Ok(config)
    }

    /// fill in anything `self` leaves unset from `base`
    pub fn or(self, base: Config) -> Config {
        Config {
            s: self.s.or(base.s),
            e: self.e.or(base.e),
            b: self.b.or(base.b),
            trace: self.trace.or(base.trace),
            verbose: self.verbose || base.verbose,
        }
    }

    pub fn cache_config(&self) -> Result<CacheConfig, SimError> {
        let missing = |flag: char| SimError::Config(format!("missing required option -{flag}"));
        let s = self.s.ok_or_else(|| missing('s'))?;
        let e = self.e.ok_or_else(|| missing('E'))?;
        let b = self.b.ok_or_else(|| missing('b'))?;
        CacheConfig::new(s, e, b)
    }

    pub fn trace_path(&self) -> Result<&Path, SimError> {
        self.trace
            .as_deref()
            .ok_or_else(|| SimError::Config("no trace file given (-t)".into()))
    }
}
