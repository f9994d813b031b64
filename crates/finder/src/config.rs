//! Engine tunables.
//!
//! Every field has a default so an empty or partial TOML file is valid.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
	/// Interval between periodic result flushes while a pass runs.
	pub flush_interval_ms: u64,
	/// How long a pass waits for new candidates before publishing what it has.
	pub stall_timeout_ms: u64,
	/// Display strings are cut to this many chars before publication.
	pub max_display_chars: usize,
	/// Display capacity before the first `update_max`.
	pub default_max: usize,
	/// Bounded channel between a source producer and the candidate pool.
	pub source_channel_capacity: usize,
	/// Candidates scored per pass step before the view lock is taken.
	pub batch_size: usize,
	/// Controller mailbox size.
	pub mailbox_capacity: usize,
	pub matcher: ferret_matcher::Config,
}

impl Default for FinderConfig {
	fn default() -> Self {
		Self {
			flush_interval_ms: 50,
			stall_timeout_ms: 10_000,
			max_display_chars: 500,
			default_max: 20,
			source_channel_capacity: 1024,
			batch_size: 256,
			mailbox_capacity: 256,
			matcher: ferret_matcher::Config::default(),
		}
	}
}

impl FinderConfig {
	pub fn flush_interval(&self) -> Duration {
		Duration::from_millis(self.flush_interval_ms.max(1))
	}

	pub fn stall_timeout(&self) -> Duration {
		Duration::from_millis(self.stall_timeout_ms.max(1))
	}

	/// Parses a TOML document.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		let mut config: Self = toml::from_str(input)?;
		config.normalize();
		Ok(config)
	}

	/// Reads and parses a TOML file.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&input)
	}

	fn normalize(&mut self) {
		self.flush_interval_ms = self.flush_interval_ms.max(1);
		self.stall_timeout_ms = self.stall_timeout_ms.max(1);
		self.default_max = self.default_max.max(1);
		self.source_channel_capacity = self.source_channel_capacity.max(1);
		self.batch_size = self.batch_size.max(1);
		self.mailbox_capacity = self.mailbox_capacity.max(1);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_document_yields_defaults() {
		let config = FinderConfig::from_toml_str("").expect("empty config parses");
		assert_eq!(config, FinderConfig::default());
		assert_eq!(config.flush_interval(), Duration::from_millis(50));
		assert_eq!(config.stall_timeout(), Duration::from_secs(10));
	}

	#[test]
	fn partial_document_overrides_fields() {
		let config = FinderConfig::from_toml_str(
			r#"
flush_interval_ms = 20
batch_size = 0

[matcher]
case_matching = "ignore"

[matcher.scoring]
prefix_bonus = 30
"#,
		)
		.expect("partial config parses");

		assert_eq!(config.flush_interval_ms, 20);
		assert_eq!(config.batch_size, 1);
		assert_eq!(config.matcher.case_matching, ferret_matcher::CaseMatching::Ignore);
		assert_eq!(config.matcher.scoring.prefix_bonus, 30);
		assert_eq!(config.stall_timeout_ms, 10_000);
	}

	#[test]
	fn zero_durations_are_raised_to_one_millisecond() {
		let config = FinderConfig::from_toml_str("flush_interval_ms = 0\nstall_timeout_ms = 0").expect("zero durations parse");
		assert_eq!(config.flush_interval_ms, 1);
		assert_eq!(config.stall_timeout_ms, 1);
		assert_eq!(config.stall_timeout(), Duration::from_millis(1));
	}

	#[test]
	fn wrong_type_is_a_parse_error() {
		let err = FinderConfig::from_toml_str("flush_interval_ms = \"fast\"").expect_err("string is not a duration");
		assert!(matches!(err, ConfigError::Toml(_)));
	}

	#[test]
	fn missing_file_reports_path() {
		let dir = tempfile::tempdir().expect("tempdir");
		let path = dir.path().join("absent.toml");
		match FinderConfig::load(&path) {
			Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
			other => panic!("expected io error, got {other:?}"),
		}
	}
}
