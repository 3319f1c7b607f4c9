use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use crate::config::Config;

const DEFAULT_DATA_PATH: &str = "assets/data/activity.json";
const CONFIG_FILE: &str = "config.toml";
const LOG_FILE: &str = "activity-calendar.log";
const APP_DIR: &str = "activity_calendar";

pub fn resolve_config_path(cli_path: Option<PathBuf>) -> PathBuf {
	if let Some(path) = cli_path {
		return absolutize(path);
	}

	if let Some(path) = non_empty_var("ACTIVITY_CALENDAR_CONFIG") {
		return absolutize(PathBuf::from(path));
	}

	state_dir().join(CONFIG_FILE)
}

pub fn resolve_data_path(cli_path: Option<PathBuf>, config: &Config) -> PathBuf {
	pick_data_path(cli_path, non_empty_var("ACTIVITY_CALENDAR_DATA"), config)
}

pub fn resolve_log_path(config: &Config) -> PathBuf {
	match &config.log_file {
		Some(path) => absolutize(path.clone()),
		None => state_dir().join(LOG_FILE),
	}
}

pub fn state_dir() -> PathBuf {
	if let Some(path) = env::var_os("ACTIVITY_CALENDAR_STATE_DIR") {
		return PathBuf::from(path);
	}

	#[cfg(target_os = "windows")]
	{
		if let Some(path) = env::var_os("LOCALAPPDATA") {
			return PathBuf::from(path).join(APP_DIR);
		}
	}

	if let Some(path) = env::var_os("XDG_STATE_HOME") {
		return PathBuf::from(path).join(APP_DIR);
	}

	if let Some(path) = env::var_os("HOME") {
		return PathBuf::from(path).join(".local").join("state").join(APP_DIR);
	}

	PathBuf::from(format!(".{APP_DIR}"))
}

fn pick_data_path(cli_path: Option<PathBuf>, env_path: Option<OsString>, config: &Config) -> PathBuf {
	let path = cli_path
		.or_else(|| env_path.map(PathBuf::from))
		.or_else(|| config.data_path.clone())
		.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
	absolutize(path)
}

fn non_empty_var(name: &str) -> Option<OsString> {
	env::var_os(name).filter(|value| !value.is_empty())
}

fn absolutize(path: PathBuf) -> PathBuf {
	let path = if path.is_absolute() {
		path
	} else if let Ok(cwd) = env::current_dir() {
		cwd.join(path)
	} else {
		path
	};

	if path.exists() {
		fs::canonicalize(&path).unwrap_or(path)
	} else {
		path
	}
}
