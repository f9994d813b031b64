//! Breadth-first directory walk with per-directory ignore files.

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use ignore::gitignore::{Gitignore, GitignoreBuilder};

use super::{Emitter, VCS_DIRS};

const IGNORE_FILES: &[&str] = &[".gitignore", ".ignore"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DirItem {
	pub name: String,
	pub is_dir: bool,
}

/// Directory access used by [`walk`].
#[async_trait]
pub(crate) trait DirLister: Send + Sync {
	async fn list(&self, dir: &Path) -> io::Result<Vec<DirItem>>;

	/// Ignore rules declared in `dir` itself, if any.
	async fn ignore_rules(&self, dir: &Path) -> Option<Gitignore>;
}

/// Builds gitignore rules rooted at `dir` from ignore file contents.
pub(crate) fn ignore_rules_from(dir: &Path, contents: &[String]) -> Option<Gitignore> {
	let mut builder = GitignoreBuilder::new(dir);
	for content in contents {
		for line in content.lines() {
			if let Err(error) = builder.add_line(None, line) {
				tracing::debug!(dir = %dir.display(), line, %error, "finder.source.walk.ignore_line");
			}
		}
	}
	match builder.build() {
		Ok(rules) if !rules.is_empty() => Some(rules),
		Ok(_) => None,
		Err(error) => {
			tracing::debug!(dir = %dir.display(), %error, "finder.source.walk.ignore_failed");
			None
		}
	}
}

pub(crate) struct LocalLister;

#[async_trait]
impl DirLister for LocalLister {
	async fn list(&self, dir: &Path) -> io::Result<Vec<DirItem>> {
		let mut read_dir = tokio::fs::read_dir(dir).await?;
		let mut items = Vec::new();
		loop {
			let entry = match read_dir.next_entry().await {
				Ok(Some(entry)) => entry,
				Ok(None) => break,
				Err(error) => {
					tracing::debug!(dir = %dir.display(), %error, "finder.source.walk.entry_failed");
					break;
				}
			};
			let is_dir = match entry.file_type().await {
				Ok(file_type) => file_type.is_dir(),
				Err(error) => {
					tracing::debug!(path = %entry.path().display(), %error, "finder.source.walk.entry_failed");
					continue;
				}
			};
			items.push(DirItem {
				name: entry.file_name().to_string_lossy().into_owned(),
				is_dir,
			});
		}
		Ok(items)
	}

	async fn ignore_rules(&self, dir: &Path) -> Option<Gitignore> {
		let mut contents = Vec::new();
		for name in IGNORE_FILES {
			if let Ok(text) = tokio::fs::read_to_string(dir.join(name)).await {
				contents.push(text);
			}
		}
		if contents.is_empty() {
			return None;
		}
		ignore_rules_from(dir, &contents)
	}
}

struct PendingDir {
	path: PathBuf,
	relative: String,
	rules: Vec<Arc<Gitignore>>,
}

/// Nearest rules decide first; a whitelist match un-ignores.
fn is_ignored(rules: &[Arc<Gitignore>], path: &Path, is_dir: bool) -> bool {
	for rules in rules.iter().rev() {
		let matched = rules.matched(path, is_dir);
		if matched.is_ignore() {
			return true;
		}
		if matched.is_whitelist() {
			return false;
		}
	}
	false
}

/// Emits every file under `root` level by level, sorted by name within a directory.
///
/// Paths are relative to `root`, joined onto `prefix` when one is given.
pub(crate) async fn walk(lister: &dyn DirLister, root: &Path, prefix: Option<&str>, emitter: &mut Emitter) {
	let mut queue = VecDeque::from([PendingDir {
		path: root.to_path_buf(),
		relative: String::new(),
		rules: Vec::new(),
	}]);
	let mut dirs_seen = 0usize;

	while let Some(dir) = queue.pop_front() {
		if emitter.is_cancelled() {
			return;
		}
		let listed = tokio::select! {
			biased;
			_ = emitter.token().cancelled() => return,
			listed = lister.list(&dir.path) => listed,
		};
		let mut items = match listed {
			Ok(items) => items,
			Err(error) => {
				tracing::debug!(dir = %dir.path.display(), %error, "finder.source.walk.read_dir_failed");
				continue;
			}
		};
		dirs_seen += 1;
		if items.is_empty() {
			continue;
		}
		items.sort_by(|a, b| a.name.cmp(&b.name));

		let mut rules = dir.rules;
		let local = tokio::select! {
			biased;
			_ = emitter.token().cancelled() => return,
			local = lister.ignore_rules(&dir.path) => local,
		};
		if let Some(local) = local {
			rules.push(Arc::new(local));
		}

		let mut subdirs = Vec::new();
		for item in items {
			if item.is_dir && VCS_DIRS.contains(&item.name.as_str()) {
				continue;
			}
			let path = dir.path.join(&item.name);
			if is_ignored(&rules, &path, item.is_dir) {
				continue;
			}
			let relative = if dir.relative.is_empty() {
				item.name
			} else {
				format!("{}/{}", dir.relative, item.name)
			};
			if item.is_dir {
				subdirs.push(PendingDir {
					path,
					relative,
					rules: rules.clone(),
				});
				continue;
			}
			let candidate = match prefix {
				Some(prefix) => format!("{prefix}/{relative}"),
				None => relative,
			};
			if !emitter.emit(candidate).await {
				return;
			}
		}
		queue.extend(subdirs);
	}
	tracing::trace!(root = %root.display(), dirs = dirs_seen, "finder.source.walk.done");
}
