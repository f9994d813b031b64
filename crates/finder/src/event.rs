//! Inbound finder events and outbound `finder_*` notifications.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::{FinderError, Result};
use crate::options::{FinderOptions, ResultType};

/// Inbound event, one per user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinderEvent {
	Run(FinderOptions),
	/// One typed character.
	Char(char),
	Backspace,
	Clear,
	Left,
	Right,
	Up,
	Down,
	Cancel,
	Confirm,
	Resume,
	UpdateMax(usize),
}

fn single_char(text: &str) -> Option<char> {
	let mut chars = text.chars();
	let ch = chars.next()?;
	chars.next().is_none().then_some(ch)
}

impl FinderEvent {
	pub const fn name(&self) -> &'static str {
		match self {
			Self::Run(_) => "run",
			Self::Char(_) => "char",
			Self::Backspace => "backspace",
			Self::Clear => "clear",
			Self::Left => "left",
			Self::Right => "right",
			Self::Up => "up",
			Self::Down => "down",
			Self::Cancel => "cancel",
			Self::Confirm => "confirm",
			Self::Resume => "resume",
			Self::UpdateMax(_) => "update_max",
		}
	}

	/// Parses an event from its wire name and positional arguments.
	pub fn parse(name: &str, args: &[Value]) -> Result<Self> {
		let event = match name {
			"run" => {
				let options = args.first().cloned().ok_or_else(|| FinderError::InvalidOptions("missing options argument".to_string()))?;
				Self::Run(FinderOptions::from_value(options)?)
			}
			"char" => {
				let ch = args.first().and_then(Value::as_str).and_then(single_char).ok_or(FinderError::InvalidArgument {
					event: "char",
					expected: "a single character",
				})?;
				Self::Char(ch)
			}
			"update_max" => {
				let max = args.first().and_then(Value::as_u64).ok_or(FinderError::InvalidArgument {
					event: "update_max",
					expected: "a non-negative integer",
				})?;
				Self::UpdateMax(usize::try_from(max).unwrap_or(usize::MAX))
			}
			"backspace" => Self::Backspace,
			"clear" => Self::Clear,
			"left" => Self::Left,
			"right" => Self::Right,
			"up" => Self::Up,
			"down" => Self::Down,
			"cancel" => Self::Cancel,
			"confirm" => Self::Confirm,
			"resume" => Self::Resume,
			other => return Err(FinderError::UnknownEvent(other.to_string())),
		};
		Ok(event)
	}

	/// Parses a `["name", args...]` array.
	pub fn from_wire(value: &Value) -> Result<Self> {
		let Some((name, args)) = value.as_array().and_then(|items| items.split_first()) else {
			return Err(FinderError::UnknownEvent(value.to_string()));
		};
		let Some(name) = name.as_str() else {
			return Err(FinderError::UnknownEvent(name.to_string()));
		};
		Self::parse(name, args)
	}
}

/// Kind of a published row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
	#[default]
	Item,
	/// Synthetic `ag` file header.
	Header,
	/// `ag` match line below a header.
	Line,
}

/// Visible slice of the ranked results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultWindow {
	pub items: Vec<String>,
	/// Selection relative to `start`.
	pub selected: usize,
	pub matches: Vec<Vec<usize>>,
	pub result_type: ResultType,
	pub start: usize,
	pub total: usize,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub row_kinds: Vec<RowKind>,
}

/// Outbound notification, serialized as `{"method": ..., "params": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum Notification {
	#[serde(rename = "finder_pattern")]
	Pattern { text: String, cursor: usize },
	#[serde(rename = "finder_pattern_pos")]
	PatternPos { cursor: usize },
	#[serde(rename = "finder_show")]
	Show,
	#[serde(rename = "finder_hide")]
	Hide,
	#[serde(rename = "finder_show_result")]
	ShowResult(ResultWindow),
	#[serde(rename = "finder_select")]
	Select { selected: usize },
	#[serde(rename = "finder_command")]
	Command { command: String },
	#[serde(rename = "finder_call")]
	Call { function: String, args: Vec<String> },
}

impl Notification {
	pub const fn method(&self) -> &'static str {
		match self {
			Self::Pattern { .. } => "finder_pattern",
			Self::PatternPos { .. } => "finder_pattern_pos",
			Self::Show => "finder_show",
			Self::Hide => "finder_hide",
			Self::ShowResult(_) => "finder_show_result",
			Self::Select { .. } => "finder_select",
			Self::Command { .. } => "finder_command",
			Self::Call { .. } => "finder_call",
		}
	}
}

/// Outbound half of the display channel. Sends never block.
#[derive(Debug, Clone)]
pub struct NotificationSink {
	tx: mpsc::UnboundedSender<Notification>,
}

impl NotificationSink {
	pub fn new(tx: mpsc::UnboundedSender<Notification>) -> Self {
		Self { tx }
	}

	pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
		let (tx, rx) = mpsc::unbounded_channel();
		(Self::new(tx), rx)
	}

	pub fn send(&self, notification: Notification) {
		let method = notification.method();
		if self.tx.send(notification).is_err() {
			tracing::trace!(method, "finder.notify.closed");
		}
	}
}
