mod aggregate;
mod calendar;
mod config;
mod date_key;
mod domain;
mod error;
mod events;
mod paths;
mod selection;
mod storage;
mod ui;

use std::error::Error;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::aggregate::{breakdown, daily_total, valid_keys};
use crate::config::{Config, load_config};
use crate::date_key::DateKey;
use crate::domain::format_value;
use crate::error::ActivityError;
use crate::events::build_events;
use crate::paths::{resolve_config_path, resolve_data_path, resolve_log_path};
use crate::selection::SelectionController;
use crate::storage::{LoadedDataset, load_dataset};
use crate::ui::run_dashboard;

#[derive(Debug, Parser)]
#[command(name = "activity-calendar", about = "Calendar view of daily activity totals")]
struct Cli {
	/// Activity JSON file keyed by DD-MM-YYYY dates
	#[arg(long)]
	data: Option<PathBuf>,
	#[arg(long)]
	config: Option<PathBuf>,
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
	Dashboard,
	/// Print one calendar event per day
	Events,
	/// Print the breakdown of a single day
	Day {
		#[arg(long)]
		date: String,
	},
	/// Validate the dataset and list skipped entries
	Check,
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> Result<(), Box<dyn Error>> {
	let cli = Cli::parse();
	let command = cli.command.unwrap_or(Command::Dashboard);

	let config_path = resolve_config_path(cli.config);
	let config = load_config(&config_path)?;
	init_logging(&command, &config)?;
	info!(config = %config_path.display(), "configuration loaded");

	let data_path = resolve_data_path(cli.data, &config);
	let loaded = load_dataset(&data_path)
		.map_err(|err| format!("failed to load {}: {err}", data_path.display()))?;

	match command {
		Command::Dashboard => run_dashboard(&loaded, &config)?,
		Command::Events => print_events(&loaded, &mut io::stdout())?,
		Command::Day { date } => print_day(&loaded, &date, &mut io::stdout())?,
		Command::Check => check_dataset(&loaded, &data_path, &mut io::stdout())?,
	}

	Ok(())
}

fn init_logging(command: &Command, config: &Config) -> Result<(), Box<dyn Error>> {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

	// The dashboard owns the terminal, so its logs go to a file.
	if matches!(command, Command::Dashboard) {
		let log_path = resolve_log_path(config);
		if let Some(parent) = log_path.parent() {
			if !parent.as_os_str().is_empty() {
				fs::create_dir_all(parent)?;
			}
		}
		let file = OpenOptions::new().create(true).append(true).open(&log_path)?;
		let _ = tracing_subscriber::fmt()
			.with_env_filter(filter)
			.with_ansi(false)
			.with_writer(Mutex::new(file))
			.try_init();
	} else {
		let _ = tracing_subscriber::fmt()
			.with_env_filter(filter)
			.with_writer(io::stderr)
			.try_init();
	}

	Ok(())
}

fn print_events(loaded: &LoadedDataset, out: &mut impl Write) -> io::Result<()> {
	if loaded.dataset.is_empty() {
		writeln!(out, "no activity recorded")?;
		return Ok(());
	}

	for event in &build_events(&loaded.dataset) {
		writeln!(out, "{} | {}", event.key, event.title)?;
	}
	Ok(())
}

fn print_day(loaded: &LoadedDataset, raw_date: &str, out: &mut impl Write) -> Result<(), Box<dyn Error>> {
	let key: DateKey = raw_date.parse()?;
	let mut selection = SelectionController::new(valid_keys(&loaded.dataset));
	let key = selection.on_day_selected(key.date()).map_err(ActivityError::from)?;
	let records = loaded
		.dataset
		.records(key.as_str())
		.ok_or_else(|| ActivityError::NoDataForDate(key.clone()))?;

	writeln!(out, "data for {key}")?;
	for datum in breakdown(records) {
		writeln!(out, "{} | {}", datum.name, format_value(datum.value))?;
	}
	writeln!(out, "total | {}", format_value(daily_total(records)))?;

	Ok(())
}

fn check_dataset(loaded: &LoadedDataset, data_path: &Path, out: &mut impl Write) -> Result<(), Box<dyn Error>> {
	for issue in &loaded.issues {
		writeln!(out, "skipped: {issue}")?;
	}

	writeln!(
		out,
		"{}: {} days loaded, {} entries skipped",
		data_path.display(),
		loaded.dataset.len(),
		loaded.issues.len()
	)?;

	if loaded.issues.is_empty() {
		Ok(())
	} else {
		Err(format!("{} malformed entries in {}", loaded.issues.len(), data_path.display()).into())
	}
}

#[cfg(test)]
mod tests {
	use std::path::Path;

	use crate::error::{ActivityError, NO_DATA_NOTICE};
	use crate::storage::{LoadedDataset, parse_dataset};

	use super::{check_dataset, print_day, print_events};

	fn loaded(raw: &str) -> LoadedDataset {
		parse_dataset(raw).expect("dataset should parse")
	}

	fn sample() -> LoadedDataset {
		loaded(r#"{ "05-03-2024": [{"Reading": 3}, {"Exercise": 1}], "09-03-2024": [{"Reading": 2}] }"#)
	}

	#[test]
	fn day_prints_breakdown_and_total() {
		let mut out = Vec::new();
		print_day(&sample(), "05-03-2024", &mut out).expect("day has data");
		assert_eq!(
			String::from_utf8(out).unwrap(),
			"data for 05-03-2024\nReading | 3\nExercise | 1\ntotal | 4\n"
		);
	}

	#[test]
	fn day_without_data_fails_with_notice() {
		let mut out = Vec::new();
		let err = print_day(&sample(), "06-03-2024", &mut out).expect_err("day has no data");
		assert_eq!(err.to_string(), NO_DATA_NOTICE);
		assert!(matches!(
			err.downcast_ref::<ActivityError>(),
			Some(ActivityError::NoDataForDate(key)) if key.as_str() == "06-03-2024"
		));
		assert!(out.is_empty());
	}

	#[test]
	fn day_rejects_malformed_dates() {
		for raw in ["2024-03-05", "5-3-2024", "31-02-2024"] {
			let mut out = Vec::new();
			let err = print_day(&sample(), raw, &mut out).expect_err("date is malformed");
			assert_eq!(
				err.downcast_ref::<ActivityError>(),
				Some(&ActivityError::InvalidKeyFormat { key: raw.to_string() })
			);
		}
	}

	#[test]
	fn events_print_one_line_per_day() {
		let mut out = Vec::new();
		print_events(&sample(), &mut out).expect("write to buffer");
		assert_eq!(
			String::from_utf8(out).unwrap(),
			"05-03-2024 | Total: 4\n09-03-2024 | Total: 2\n"
		);

		let mut out = Vec::new();
		print_events(&loaded("{}"), &mut out).expect("write to buffer");
		assert_eq!(String::from_utf8(out).unwrap(), "no activity recorded\n");
	}

	#[test]
	fn check_fails_when_entries_were_skipped() {
		let path = Path::new("activity.json");

		let mut out = Vec::new();
		check_dataset(&sample(), path, &mut out).expect("clean dataset passes");
		assert_eq!(
			String::from_utf8(out).unwrap(),
			"activity.json: 2 days loaded, 0 entries skipped\n"
		);

		let broken = loaded(r#"{ "5-3-2024": [{"Reading": 3}], "06-03-2024": [{"Reading": -1}, {"Exercise": 1}] }"#);
		let mut out = Vec::new();
		let err = check_dataset(&broken, path, &mut out).expect_err("skipped entries fail the check");
		assert_eq!(err.to_string(), "2 malformed entries in activity.json");

		let report = String::from_utf8(out).unwrap();
		assert!(report.contains("skipped: invalid date key '5-3-2024', expected DD-MM-YYYY"));
		assert!(report.contains("skipped: malformed record #0 for 06-03-2024"));
		assert!(report.ends_with("activity.json: 1 days loaded, 2 entries skipped\n"));
	}
}
