//! Newline-delimited JSON over stdio.
//!
//! Inbound lines are `["event", args...]` arrays; outbound lines are
//! `{"method": ..., "params": ...}` notifications.

use anyhow::Context;
use ferret_finder::{Finder, FinderEvent, Notification};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::UnboundedReceiver;

/// Outcome of decoding one input line.
#[derive(Debug)]
pub enum Decoded {
	Event(FinderEvent),
	Skip,
}

/// Decodes one line. Blank lines are skipped; malformed ones are logged and skipped.
pub fn decode_line(line: &str) -> Decoded {
	let line = line.trim();
	if line.is_empty() {
		return Decoded::Skip;
	}
	let value: Value = match serde_json::from_str(line) {
		Ok(value) => value,
		Err(error) => {
			tracing::warn!(%error, "term.input.invalid_json");
			return Decoded::Skip;
		}
	};
	match FinderEvent::from_wire(&value) {
		Ok(event) => Decoded::Event(event),
		Err(error) => {
			tracing::warn!(%error, "term.input.rejected");
			Decoded::Skip
		}
	}
}

/// Feeds events from `input` to `finder` until EOF. Returns the number accepted.
pub async fn pump_events<R>(input: R, finder: &Finder) -> anyhow::Result<usize>
where
	R: AsyncBufRead + Unpin,
{
	let mut lines = input.lines();
	let mut accepted = 0usize;
	while let Some(line) = lines.next_line().await.context("reading input")? {
		if let Decoded::Event(event) = decode_line(&line) {
			tracing::trace!(event = event.name(), "term.input.event");
			finder.send(event).await.context("finder stopped")?;
			accepted += 1;
		}
	}
	Ok(accepted)
}

/// Writes every notification as one JSON line until all senders are gone.
pub async fn write_notifications<W>(mut rx: UnboundedReceiver<Notification>, mut output: W) -> anyhow::Result<()>
where
	W: AsyncWrite + Unpin,
{
	while let Some(notification) = rx.recv().await {
		let mut line = serde_json::to_vec(&notification).context("encoding notification")?;
		line.push(b'\n');
		output.write_all(&line).await.context("writing output")?;
		output.flush().await.context("flushing output")?;
	}
	Ok(())
}
