//! External command streaming.

use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use super::Emitter;

fn shell(command: &str) -> Command {
	#[cfg(windows)]
	let mut cmd = {
		let mut cmd = Command::new("cmd");
		cmd.arg("/C").arg(command);
		cmd
	};
	#[cfg(not(windows))]
	let mut cmd = {
		let mut cmd = Command::new("sh");
		cmd.arg("-c").arg(command);
		cmd
	};
	cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::null()).kill_on_drop(true);
	cmd
}

/// Streams stdout lines of `command` as they are printed.
pub(super) async fn produce(command: &str, cwd: &Path, emitter: &mut Emitter) {
	let mut child = match shell(command).current_dir(cwd).spawn() {
		Ok(child) => child,
		Err(error) => {
			tracing::warn!(command, cwd = %cwd.display(), %error, "finder.source.process.spawn_failed");
			return;
		}
	};
	let Some(stdout) = child.stdout.take() else {
		return;
	};

	let mut reader = BufReader::new(stdout);
	let mut buf = Vec::new();
	loop {
		buf.clear();
		let read = tokio::select! {
			biased;
			_ = emitter.token().cancelled() => break,
			read = reader.read_until(b'\n', &mut buf) => read,
		};
		match read {
			Ok(0) => break,
			Ok(_) => {
				let line = String::from_utf8_lossy(&buf);
				let line = line.strip_suffix('\n').unwrap_or(&line);
				let line = line.strip_suffix('\r').unwrap_or(line);
				if !emitter.emit(line).await {
					break;
				}
			}
			Err(error) => {
				tracing::debug!(command, %error, "finder.source.process.read_failed");
				break;
			}
		}
	}

	if emitter.is_cancelled() {
		if let Err(error) = child.kill().await {
			tracing::debug!(command, %error, "finder.source.process.kill_failed");
		}
		return;
	}
	let status = tokio::select! {
		biased;
		_ = emitter.token().cancelled() => None,
		status = child.wait() => status.ok(),
	};
	tracing::debug!(command, status = ?status, "finder.source.process.exit");
}
