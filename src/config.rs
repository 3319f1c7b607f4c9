use std::fmt::{Display, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::calendar::{CalendarView, WeekStart};

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    TomlDecode(toml::de::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "io error: {err}"),
            ConfigError::TomlDecode(err) => write!(f, "failed to parse config: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub data_path: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub default_view: CalendarView,
    pub week_start: WeekStart,
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Config::default()),
        Err(err) => return Err(ConfigError::Io(err)),
    };

    if raw.trim().is_empty() {
        return Ok(Config::default());
    }

    toml::from_str(&raw).map_err(ConfigError::TomlDecode)
}
