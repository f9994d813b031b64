//! Remote host enumeration seam.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use ignore::gitignore::Gitignore;

use super::walk::{DirItem, DirLister, ignore_rules_from};
use crate::error::Result;

/// One entry of a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
	pub name: String,
	pub is_dir: bool,
}

/// Lists directories on a remote host. Paths use `/` separators.
#[async_trait]
pub trait RemoteLister: Send + Sync + 'static {
	async fn list_dir(&self, path: &str) -> Result<Vec<RemoteEntry>>;

	/// Contents of the ignore files in `dir`, concatenated. Best effort.
	async fn read_ignore(&self, _dir: &str) -> Option<String> {
		None
	}

	/// Remote home directory used to expand `~`.
	fn home_dir(&self) -> Option<String> {
		None
	}
}

pub(super) fn expand_remote_tilde(dir: &str, home: Option<&str>) -> String {
	match (dir.strip_prefix('~'), home) {
		(Some(""), Some(home)) => home.to_string(),
		(Some(rest), Some(home)) if rest.starts_with('/') => format!("{}{rest}", home.trim_end_matches('/')),
		_ => dir.to_string(),
	}
}

/// Adapts a [`RemoteLister`] to the walk.
pub(super) struct RemoteDirLister {
	inner: Arc<dyn RemoteLister>,
}

impl RemoteDirLister {
	pub(super) fn new(inner: Arc<dyn RemoteLister>) -> Self {
		Self { inner }
	}
}

fn remote_path(path: &Path) -> String {
	crate::paths::to_slash(path)
}

#[async_trait]
impl DirLister for RemoteDirLister {
	async fn list(&self, dir: &Path) -> io::Result<Vec<DirItem>> {
		let path = remote_path(dir);
		let entries = self.inner.list_dir(&path).await.map_err(io::Error::other)?;
		Ok(entries.into_iter().map(|entry| DirItem { name: entry.name, is_dir: entry.is_dir }).collect())
	}

	async fn ignore_rules(&self, dir: &Path) -> Option<Gitignore> {
		let contents = self.inner.read_ignore(&remote_path(dir)).await?;
		ignore_rules_from(dir, &[contents])
	}
}
