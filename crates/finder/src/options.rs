//! Typed `run` options.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FinderError, Result};
use crate::event::Notification;
use crate::paths;

/// How candidates are carved, scored and rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
	/// Whole candidate.
	#[default]
	Plain,
	/// Text after the first tab.
	Line,
	/// `file:line:col:content`, scoring `content`.
	FileLine,
	/// `file:line:col:content` grouped per file under header rows.
	Ag,
}

impl ResultType {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Plain => "plain",
			Self::Line => "line",
			Self::FileLine => "file_line",
			Self::Ag => "ag",
		}
	}
}

/// Where candidates come from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SourceSpec {
	/// Literal candidates in order.
	List(Vec<String>),
	/// Shell command whose stdout lines are candidates.
	Command(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FinderOptions {
	pub source: Option<SourceSpec>,
	pub dir: Option<String>,
	pub pwd: Option<String>,
	#[serde(rename = "type")]
	pub result_type: ResultType,
	/// Command template run with the confirmed candidate.
	pub sink: Option<String>,
	/// Callback name invoked with the confirmed candidate.
	pub function: Option<String>,
}

/// Resolved base directory of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseDir {
	/// Absolute (or tilde-expanded) directory.
	pub path: PathBuf,
	/// True when the directory came from `dir`/`pwd` rather than the working directory.
	pub explicit: bool,
}

impl FinderOptions {
	/// Parses the first `run` argument. `null` means all defaults.
	pub fn from_value(value: serde_json::Value) -> Result<Self> {
		match value {
			serde_json::Value::Null => Ok(Self::default()),
			value @ serde_json::Value::Object(_) => serde_json::from_value(value).map_err(|err| FinderError::InvalidOptions(err.to_string())),
			other => Err(FinderError::InvalidOptions(format!("expected an object, got {other}"))),
		}
	}

	/// The user supplied base directory, `dir` winning over `pwd`.
	pub fn explicit_dir(&self) -> Option<&str> {
		self.dir.as_deref().or(self.pwd.as_deref()).filter(|dir| !dir.is_empty())
	}

	/// Resolves the base directory against the local filesystem.
	pub fn base_dir(&self) -> BaseDir {
		match self.explicit_dir() {
			Some(dir) => {
				let path = paths::expand_tilde(dir);
				let path = if path.is_relative() { current_dir().join(path) } else { path };
				BaseDir { path, explicit: true }
			}
			None => BaseDir {
				path: current_dir(),
				explicit: false,
			},
		}
	}

	/// Builds the confirm notification for `candidate`. `function` wins over `sink`.
	pub fn confirm_action(&self, candidate: &str) -> Option<Notification> {
		if let Some(function) = self.function.as_deref().filter(|f| !f.is_empty()) {
			return Some(Notification::Call {
				function: function.to_string(),
				args: vec![candidate.to_string()],
			});
		}
		let sink = self.sink.as_deref().filter(|s| !s.is_empty())?;
		Some(Notification::Command {
			command: substitute(sink, candidate),
		})
	}
}

fn substitute(template: &str, candidate: &str) -> String {
	if template.contains("{}") {
		template.replace("{}", candidate)
	} else {
		format!("{template} {candidate}")
	}
}

fn current_dir() -> PathBuf {
	std::env::current_dir().unwrap_or_else(|_| Path::new(".").to_path_buf())
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	#[test]
	fn parses_list_command_and_type() {
		let options = FinderOptions::from_value(json!({
			"source": ["a", "b"],
			"type": "file_line",
			"sink": "e",
			"unknown": 1,
		}))
		.expect("valid options");
		assert_eq!(options.source, Some(SourceSpec::List(vec!["a".into(), "b".into()])));
		assert_eq!(options.result_type, ResultType::FileLine);
		assert_eq!(options.sink.as_deref(), Some("e"));

		let options = FinderOptions::from_value(json!({ "source": "rg --vimgrep foo" })).expect("command source");
		assert_eq!(options.source, Some(SourceSpec::Command("rg --vimgrep foo".into())));
		assert_eq!(options.result_type, ResultType::Plain);
	}

	#[test]
	fn null_means_defaults() {
		assert_eq!(FinderOptions::from_value(serde_json::Value::Null).expect("null"), FinderOptions::default());
	}

	#[test]
	fn wrong_shapes_are_rejected() {
		assert!(matches!(FinderOptions::from_value(json!("files")), Err(FinderError::InvalidOptions(_))));
		assert!(matches!(FinderOptions::from_value(json!({ "type": "grid" })), Err(FinderError::InvalidOptions(_))));
		assert!(matches!(FinderOptions::from_value(json!({ "source": 3 })), Err(FinderError::InvalidOptions(_))));
		assert!(matches!(FinderOptions::from_value(json!({ "dir": ["x"] })), Err(FinderError::InvalidOptions(_))));
	}

	#[test]
	fn dir_wins_over_pwd() {
		let options = FinderOptions {
			dir: Some("/srv/a".into()),
			pwd: Some("/srv/b".into()),
			..FinderOptions::default()
		};
		assert_eq!(
			options.base_dir(),
			BaseDir {
				path: PathBuf::from("/srv/a"),
				explicit: true
			}
		);

		let options = FinderOptions {
			pwd: Some("/srv/b".into()),
			..FinderOptions::default()
		};
		assert_eq!(options.base_dir().path, PathBuf::from("/srv/b"));
		assert!(!FinderOptions::default().base_dir().explicit);
	}

	#[test]
	fn confirm_prefers_function_then_sink() {
		let options = FinderOptions {
			sink: Some("edit".into()),
			function: Some("OpenIt".into()),
			..FinderOptions::default()
		};
		assert_eq!(
			options.confirm_action("a.rs"),
			Some(Notification::Call {
				function: "OpenIt".into(),
				args: vec!["a.rs".into()],
			})
		);

		let options = FinderOptions {
			sink: Some("edit".into()),
			..FinderOptions::default()
		};
		assert_eq!(options.confirm_action("a.rs"), Some(Notification::Command { command: "edit a.rs".into() }));

		let options = FinderOptions {
			sink: Some("split {} | normal! zz".into()),
			..FinderOptions::default()
		};
		assert_eq!(
			options.confirm_action("a.rs"),
			Some(Notification::Command {
				command: "split a.rs | normal! zz".into()
			})
		);

		assert_eq!(FinderOptions::default().confirm_action("a.rs"), None);
	}
}
