//! Live fuzzy finder engine.
//!
//! A [`Finder`] owns one search session at a time. Inbound [`FinderEvent`]s
//! edit the pattern, move the selection or start a new run; candidates stream
//! in from a [`Source`] while filter passes rank them, and the visible window
//! is published as `finder_*` [`Notification`]s on a [`NotificationSink`].

mod carve;
mod config;
mod controller;
mod error;
mod event;
mod options;
pub mod paths;
mod pass;
mod pool;
mod prompt;
mod publish;
mod rank;
mod source;
mod state;
mod view;

pub use carve::Carver;
pub use config::FinderConfig;
pub use controller::{Finder, SessionEvent};
pub use error::{ConfigError, FinderError, Result};
pub use event::{FinderEvent, Notification, NotificationSink, ResultWindow, RowKind};
pub use options::{BaseDir, FinderOptions, ResultType, SourceSpec};
pub use pool::{CandidatePool, PoolProgress};
pub use prompt::Prompt;
pub use publish::{Publisher, snapshot};
pub use rank::{Entry, RankedResults, Scored, UNSCORED};
pub use source::{RemoteEntry, RemoteLister, Source, VCS_DIRS};
pub use view::ResultView;
