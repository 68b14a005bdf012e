//! Configuration loading and parsing.
//!
//! Reads `line-mover.toml` (or an override path provided by the binary). Every field
//! has a default, unknown fields are ignored, and a file that fails to parse falls back
//! to defaults with a warning so a bad config never blocks a command run.
//!
//! ```toml
//! [log]
//! filter = "info"            # EnvFilter directive used when RUST_LOG is unset
//! file = "line-mover.log"
//! directory = "."
//!
//! [output]
//! line_ending = "auto"       # auto | lf | crlf | cr
//! ```

use anyhow::Result;
use core_text::LineEnding;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "line-mover.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LogConfig {
    #[serde(default = "LogConfig::default_filter")]
    pub filter: String,
    #[serde(default = "LogConfig::default_file")]
    pub file: String,
    #[serde(default = "LogConfig::default_directory")]
    pub directory: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: Self::default_filter(),
            file: Self::default_file(),
            directory: Self::default_directory(),
        }
    }
}

impl LogConfig {
    fn default_filter() -> String {
        "info".to_string()
    }
    fn default_file() -> String {
        "line-mover.log".to_string()
    }
    fn default_directory() -> PathBuf {
        PathBuf::from(".")
    }
}

/// Line ending used when writing a buffer back out.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineEndingPreference {
    /// Keep whatever the file used when it was read.
    #[default]
    Auto,
    Lf,
    Crlf,
    Cr,
}

impl LineEndingPreference {
    /// Resolve against the style detected on read.
    pub fn resolve(self, detected: LineEnding) -> LineEnding {
        match self {
            LineEndingPreference::Auto => detected,
            LineEndingPreference::Lf => LineEnding::Lf,
            LineEndingPreference::Crlf => LineEnding::Crlf,
            LineEndingPreference::Cr => LineEnding::Cr,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    #[serde(default)]
    pub line_ending: LineEndingPreference,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// A config file that exists but could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub source: Option<PathBuf>, // file the values came from, if any
    pub file: ConfigFile,        // parsed (or default) data
    /// Kept so callers that install logging after loading can still report it.
    pub parse_failure: Option<ParseFailure>,
}

/// Best-effort config path: working directory first, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("line-mover").join(CONFIG_FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_absent_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config {
                source: Some(path),
                file,
                parse_failure: None,
            })
        }
        Err(e) => {
            warn!(
                target: "config",
                path = %path.display(),
                error = %e,
                "config_parse_failed_using_defaults"
            );
            Ok(Config {
                parse_failure: Some(ParseFailure {
                    path,
                    error: e.to_string(),
                }),
                ..Config::default()
            })
        }
    }
}
