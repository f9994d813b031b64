/// Execution classes used to label spawned work in traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Work on the keystroke path: the session controller.
	Interactive,
	/// Filter passes and flush tickers; superseded freely.
	Background,
	/// Candidate producers waiting on processes, disks or remote hosts.
	Io,
}

impl TaskClass {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Interactive => "interactive",
			Self::Background => "background",
			Self::Io => "io",
		}
	}
}
