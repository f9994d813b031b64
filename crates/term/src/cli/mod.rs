//! CLI schema and config resolution for the ferret binary.

use std::path::{Path, PathBuf};

use clap::Parser;
use ferret_finder::{ConfigError, FinderConfig};

#[derive(Parser, Debug)]
#[command(name = "ferret")]
#[command(about = "Live fuzzy finder speaking newline-delimited JSON on stdio")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Engine config file (TOML). Defaults to the user config dir when present.
	#[arg(long, short = 'c', value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Debug logging on stderr
	#[arg(long, short = 'v')]
	pub verbose: bool,

	/// Working directory used when a run names no dir
	#[arg(long, short = 'd', value_name = "DIR")]
	pub dir: Option<PathBuf>,
}

/// `<config dir>/ferret/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("ferret").join("config.toml"))
}

/// Loads the explicit config, else the default file when it exists, else defaults.
pub fn load_config(explicit: Option<&Path>, fallback: Option<&Path>) -> Result<FinderConfig, ConfigError> {
	if let Some(path) = explicit {
		return FinderConfig::load(path);
	}
	match fallback {
		Some(path) if path.is_file() => FinderConfig::load(path),
		_ => Ok(FinderConfig::default()),
	}
}
