mod cli;
mod transport;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use ferret_finder::{Finder, NotificationSink};
use tokio::io::BufReader;
use tracing::info;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	let fallback = cli::default_config_path();
	let config = cli::load_config(cli.config.as_deref(), fallback.as_deref()).context("loading config")?;
	if let Some(dir) = &cli.dir {
		std::env::set_current_dir(dir).with_context(|| format!("changing to {}", dir.display()))?;
	}

	let (sink, rx) = NotificationSink::channel();
	let finder = Finder::spawn(config, sink);
	let writer = tokio::spawn(transport::write_notifications(rx, tokio::io::stdout()));
	info!("term.start");

	let accepted = transport::pump_events(BufReader::new(tokio::io::stdin()), &finder).await?;
	info!(accepted, "term.input.eof");

	let report = finder.shutdown(SHUTDOWN_TIMEOUT).await;
	info!(completed = report.completed, exit = ?report.last_exit, "term.shutdown");
	drop(finder);

	match tokio::time::timeout(SHUTDOWN_TIMEOUT, writer).await {
		Ok(joined) => joined.context("output task panicked")??,
		Err(_) => tracing::warn!("term.output.timeout"),
	}
	Ok(())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("ferret_finder=debug,ferret_term=debug,ferret_worker=debug,info")
		} else {
			EnvFilter::new("warn")
		}
	});

	// stdout carries the protocol.
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(true).init();
}
