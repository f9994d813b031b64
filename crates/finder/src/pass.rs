//! Filter passes.
//!
//! A pass scores the pool from the start, then keeps following it as the
//! producer appends. Scoring happens outside the view lock; only insertion
//! and flushing take it, each after re-checking the pass generation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ferret_worker::{GenerationToken, TaskClass};
use tokio::time::MissedTickBehavior;

use crate::carve::Carver;
use crate::config::FinderConfig;
use crate::options::ResultType;
use crate::pool::CandidatePool;
use crate::state::SharedState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassEnd {
	/// Pool complete and fully scored.
	Exhausted,
	/// No candidate arrived within the stall timeout.
	Stalled,
	/// A newer pass, cancel or confirm took over.
	Superseded,
}

impl PassEnd {
	const fn as_str(self) -> &'static str {
		match self {
			Self::Exhausted => "exhausted",
			Self::Stalled => "stalled",
			Self::Superseded => "superseded",
		}
	}
}

pub(crate) struct Pass {
	pub token: GenerationToken,
	pub pattern: String,
	pub result_type: ResultType,
	pub pool: Arc<CandidatePool>,
	pub state: SharedState,
	pub config: Arc<FinderConfig>,
}

impl Pass {
	/// Spawns the pass and its flush ticker.
	pub fn spawn(self) {
		let ticker = self.token.child();
		ferret_worker::spawn(TaskClass::Background, tick(Arc::clone(&self.state), ticker.clone(), self.config.flush_interval()));
		ferret_worker::spawn(TaskClass::Interactive, async move {
			self.run().await;
			ticker.cancel();
		});
	}

	async fn run(self) -> PassEnd {
		let started = Instant::now();
		let generation = self.token.generation();
		let stall = self.config.stall_timeout();
		let batch_size = self.config.batch_size.max(1);
		let mut carver = Carver::new(self.pattern.as_str(), self.result_type, self.config.matcher.clone());
		let mut progress = self.pool.subscribe();
		let mut cursor = 0usize;

		tracing::debug!(generation, pattern = %self.pattern, result_type = self.result_type.as_str(), "finder.pass.start");

		let end = loop {
			if self.token.is_cancelled() {
				break PassEnd::Superseded;
			}
			let complete = progress.borrow_and_update().complete;
			let batch = self.pool.read_from(cursor, batch_size);
			if batch.is_empty() {
				if complete {
					break PassEnd::Exhausted;
				}
				let waited = tokio::select! {
					biased;
					_ = self.token.cancelled() => break PassEnd::Superseded,
					waited = tokio::time::timeout(stall, progress.changed()) => waited,
				};
				match waited {
					Ok(Ok(())) => continue,
					Ok(Err(_)) => break PassEnd::Exhausted,
					Err(_) => break PassEnd::Stalled,
				}
			}

			let scored: Vec<_> = batch.iter().filter_map(|candidate| carver.carve(candidate)).collect();
			cursor += batch.len();

			{
				let mut state = self.state.lock();
				if state.generation != generation || self.token.is_cancelled() {
					break PassEnd::Superseded;
				}
				for entry in scored {
					state.view.insert(entry);
				}
				state.considered = cursor;
			}
			tokio::task::yield_now().await;
		};

		let total = {
			let mut state = self.state.lock();
			if end != PassEnd::Superseded && state.generation == generation && !self.token.is_cancelled() {
				state.flush(true);
			}
			state.view.total()
		};

		tracing::debug!(
			generation,
			end = end.as_str(),
			considered = cursor,
			total,
			elapsed_ms = started.elapsed().as_millis() as u64,
			"finder.pass.complete"
		);
		end
	}
}

/// Periodic flush while a pass runs.
async fn tick(state: SharedState, token: GenerationToken, period: Duration) {
	let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
	interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
	loop {
		tokio::select! {
			biased;
			_ = token.cancelled() => return,
			_ = interval.tick() => {}
		}
		let mut guard = state.lock();
		if guard.generation != token.generation() || token.is_cancelled() {
			return;
		}
		guard.flush(false);
	}
}

#[cfg(test)]
mod tests;
