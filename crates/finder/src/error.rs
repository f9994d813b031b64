//! Error types for the finder engine.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by event parsing, sources and the finder handle.
#[derive(Debug, Error)]
pub enum FinderError {
	/// `run` options were missing or had the wrong shape.
	#[error("invalid run options: {0}")]
	InvalidOptions(String),

	/// Inbound event name is not part of the protocol.
	#[error("unknown event: {0}")]
	UnknownEvent(String),

	/// Inbound event carried an argument of the wrong type.
	#[error("event '{event}' expects {expected}")]
	InvalidArgument {
		/// Event name.
		event: &'static str,
		/// Human readable description of the expected argument.
		expected: &'static str,
	},

	/// A remote directory listing failed.
	#[error("remote listing failed for {path}: {message}")]
	Remote {
		/// Directory being listed.
		path: String,
		/// Message reported by the remote side.
		message: String,
	},

	/// The session controller is no longer running.
	#[error("finder stopped")]
	Stopped,
}

/// Result type for finder operations.
pub type Result<T> = std::result::Result<T, FinderError>;

/// Errors that can occur when loading engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Error parsing TOML syntax or values.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),
}
