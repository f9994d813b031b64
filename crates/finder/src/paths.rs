//! Base directory resolution and `~` handling for emitted paths.

use std::path::{Path, PathBuf};

/// Expands a leading `~` using `home`.
pub fn expand_tilde_with(input: &str, home: Option<&Path>) -> PathBuf {
	let Some(home) = home else {
		return PathBuf::from(input);
	};
	if input == "~" {
		return home.to_path_buf();
	}
	if let Some(rest) = input.strip_prefix("~/").or_else(|| input.strip_prefix("~\\")) {
		return home.join(rest);
	}
	PathBuf::from(input)
}

/// Expands a leading `~` to the user's home directory.
pub fn expand_tilde(input: &str) -> PathBuf {
	expand_tilde_with(input, dirs::home_dir().as_deref())
}

/// Renders `path` with the `home` prefix collapsed back to `~` and `/` separators.
pub fn collapse_tilde_with(path: &Path, home: Option<&Path>) -> String {
	if let Some(home) = home
		&& let Ok(rest) = path.strip_prefix(home)
	{
		let rest = to_slash(rest);
		return if rest.is_empty() { "~".to_string() } else { format!("~/{rest}") };
	}
	to_slash(path)
}

/// Renders `path` with the home directory collapsed to `~`.
pub fn collapse_tilde(path: &Path) -> String {
	collapse_tilde_with(path, dirs::home_dir().as_deref())
}

pub(crate) fn to_slash(path: &Path) -> String {
	path.to_string_lossy().replace('\\', "/")
}
