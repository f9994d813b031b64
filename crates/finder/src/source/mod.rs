//! Candidate source producers.
//!
//! A producer streams raw candidates into a bounded channel; a collector task
//! drains the channel into the run's [`CandidatePool`]. Both observe the run
//! token, and every send races against cancellation so a cancelled run stops
//! in bounded time even when nobody reads.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use ferret_worker::{GenerationToken, TaskClass};
use tokio::sync::mpsc;

use crate::options::{FinderOptions, SourceSpec};
use crate::paths;
use crate::pool::CandidatePool;

mod list;
mod process;
mod remote;
mod walk;

pub use remote::{RemoteEntry, RemoteLister};

/// Directories never descended into by walks.
pub const VCS_DIRS: &[&str] = &[".git", ".hg", ".svn", ".bzr", "_darcs"];

/// Resolved candidate source of one run.
#[derive(Clone)]
pub enum Source {
	List(Vec<String>),
	Process {
		command: String,
		cwd: PathBuf,
	},
	Walk {
		root: PathBuf,
		/// Prefix prepended to emitted relative paths.
		prefix: Option<String>,
	},
	Remote {
		lister: Arc<dyn RemoteLister>,
		root: String,
		prefix: Option<String>,
	},
}

impl std::fmt::Debug for Source {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::List(items) => f.debug_tuple("List").field(&items.len()).finish(),
			Self::Process { command, cwd } => f.debug_struct("Process").field("command", command).field("cwd", cwd).finish(),
			Self::Walk { root, prefix } => f.debug_struct("Walk").field("root", root).field("prefix", prefix).finish(),
			Self::Remote { root, prefix, .. } => f.debug_struct("Remote").field("root", root).field("prefix", prefix).finish(),
		}
	}
}

impl Source {
	/// Picks the source for `options`. Without an explicit source, a remote lister wins over the local walk.
	pub fn from_options(options: &FinderOptions, remote: Option<&Arc<dyn RemoteLister>>) -> Self {
		match (&options.source, remote) {
			(Some(SourceSpec::List(items)), _) => Self::List(items.clone()),
			(Some(SourceSpec::Command(command)), _) => Self::Process {
				command: command.clone(),
				cwd: options.base_dir().path,
			},
			(None, Some(lister)) => {
				let explicit = options.explicit_dir();
				let root = match explicit {
					Some(dir) => remote::expand_remote_tilde(dir, lister.home_dir().as_deref()),
					None => ".".to_string(),
				};
				Self::Remote {
					lister: Arc::clone(lister),
					root,
					prefix: explicit.map(|dir| dir.trim_end_matches('/').to_string()),
				}
			}
			(None, None) => {
				let base = options.base_dir();
				let prefix = base.explicit.then(|| paths::collapse_tilde(&base.path).trim_end_matches('/').to_string());
				Self::Walk { root: base.path, prefix }
			}
		}
	}

	pub fn kind(&self) -> &'static str {
		match self {
			Self::List(_) => "list",
			Self::Process { .. } => "process",
			Self::Walk { .. } => "walk",
			Self::Remote { .. } => "remote",
		}
	}
}

/// Cancellable candidate sender.
pub(crate) struct Emitter {
	tx: mpsc::Sender<Arc<str>>,
	token: GenerationToken,
	emitted: usize,
}

impl Emitter {
	pub fn new(tx: mpsc::Sender<Arc<str>>, token: GenerationToken) -> Self {
		Self { tx, token, emitted: 0 }
	}

	/// Delivers one candidate. Returns `false` once the run is cancelled or the collector is gone.
	pub async fn emit(&mut self, candidate: impl Into<Arc<str>>) -> bool {
		let candidate = candidate.into();
		let delivered = tokio::select! {
			biased;
			_ = self.token.cancelled() => false,
			sent = self.tx.send(candidate) => sent.is_ok(),
		};
		if delivered {
			self.emitted += 1;
		}
		delivered
	}

	pub fn token(&self) -> &GenerationToken {
		&self.token
	}

	pub fn is_cancelled(&self) -> bool {
		self.token.is_cancelled()
	}
}

async fn produce(source: Source, emitter: &mut Emitter) {
	match source {
		Source::List(items) => list::produce(items, emitter).await,
		Source::Process { command, cwd } => process::produce(&command, &cwd, emitter).await,
		Source::Walk { root, prefix } => walk::walk(&walk::LocalLister, &root, prefix.as_deref(), emitter).await,
		Source::Remote { lister, root, prefix } => {
			let lister = remote::RemoteDirLister::new(lister);
			walk::walk(&lister, std::path::Path::new(&root), prefix.as_deref(), emitter).await;
		}
	}
}

/// Starts the producer and the collector filling `pool` for one run.
pub(crate) fn start(source: Source, pool: Arc<CandidatePool>, token: GenerationToken, capacity: usize, batch: usize) {
	let (tx, rx) = mpsc::channel(capacity.max(1));
	let kind = source.kind();
	let generation = token.generation();
	tracing::debug!(generation, kind, "finder.source.start");

	let producer_token = token.clone();
	ferret_worker::spawn(TaskClass::Io, async move {
		let started = Instant::now();
		let mut emitter = Emitter::new(tx, producer_token);
		produce(source, &mut emitter).await;
		tracing::debug!(
			generation,
			kind,
			emitted = emitter.emitted,
			cancelled = emitter.is_cancelled(),
			elapsed_ms = started.elapsed().as_millis() as u64,
			"finder.source.done"
		);
	});

	ferret_worker::spawn(TaskClass::Background, collect(rx, pool, token, batch.max(1)));
}

async fn collect(mut rx: mpsc::Receiver<Arc<str>>, pool: Arc<CandidatePool>, token: GenerationToken, batch: usize) {
	let mut buffer = Vec::with_capacity(batch);
	loop {
		let received = tokio::select! {
			biased;
			_ = token.cancelled() => break,
			received = rx.recv_many(&mut buffer, batch) => received,
		};
		if received == 0 {
			break;
		}
		pool.push_batch(std::mem::take(&mut buffer));
	}
	pool.finish();
}

#[cfg(test)]
mod tests;
