use std::path::{Path, PathBuf};

use serde::Deserialize;

use avail::engine::{DedicatedWindow, parse_dedicated_datetime, parse_dedicated_time};
use avail::snapshot::DecodeContext;

use crate::common::error::error;

pub const DEFAULT_CONFIG_FILE: &str = "horizon.toml";

/// Point in time written either as epoch seconds or as `MM/DD/YYYY HH:MM`
/// in local time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TimeDef {
    Epoch(i64),
    Local(String),
}

impl TimeDef {
    fn resolve(&self) -> crate::Result<i64> {
        match self {
            TimeDef::Epoch(timestamp) => Ok(*timestamp),
            TimeDef::Local(text) => Ok(parse_dedicated_datetime(text)?),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DedicatedWindowDef {
    pub start: TimeDef,
    pub end: TimeDef,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HorizonConfig {
    /// Bytes per word for `w` size units.
    #[serde(default)]
    pub word_size: Option<u64>,
    /// Attributes used to form equivalence classes.
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub require_non_zero: Option<bool>,
    /// Scheduler `dedicated_time` file.
    #[serde(default)]
    pub dedicated_time_file: Option<PathBuf>,
    #[serde(default)]
    pub dedicated: Vec<DedicatedWindowDef>,
}

impl HorizonConfig {
    pub fn parse(text: &str) -> crate::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads the configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] in
    /// the working directory when no path is given. Only an explicitly given
    /// file has to exist.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let path = match path {
            Some(path) => path,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    return Ok(HorizonConfig::default());
                }
                default
            }
        };
        log::debug!("Loading configuration from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn decode_context(&self, word_size: Option<u64>) -> DecodeContext {
        DecodeContext::new(word_size.or(self.word_size))
    }

    /// Command line attributes win over the configured list.
    pub fn attributes(&self, cli: &[String]) -> Vec<String> {
        if cli.is_empty() {
            self.attributes.clone()
        } else {
            cli.to_vec()
        }
    }

    /// All dedicated windows: the ones from the `dedicated_time` file
    /// (`file` overrides the configured path) followed by the inline ones.
    pub fn dedicated_windows(&self, file: Option<&Path>) -> crate::Result<Vec<DedicatedWindow>> {
        let mut windows = match file.or(self.dedicated_time_file.as_deref()) {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                parse_dedicated_time(&text)?
            }
            None => Vec::new(),
        };
        for def in &self.dedicated {
            let start = def.start.resolve()?;
            let end = def.end.resolve()?;
            if start > end {
                return error(format!(
                    "Dedicated window {def:?} ends before it starts"
                ));
            }
            windows.push(DedicatedWindow { start, end });
        }
        Ok(windows)
    }
}
