//! Append-only candidate storage for one run.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;

/// How far the pool has been filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolProgress {
	pub len: usize,
	/// The producer finished or was cancelled; `len` is final.
	pub complete: bool,
}

/// Candidates of the current run in arrival order.
///
/// Filter passes read by cursor and wait on [`CandidatePool::subscribe`] for
/// more, so a pattern edit rescans what arrived so far and then keeps
/// following the stream.
#[derive(Debug)]
pub struct CandidatePool {
	items: RwLock<Vec<Arc<str>>>,
	progress: watch::Sender<PoolProgress>,
}

impl CandidatePool {
	pub fn new() -> Arc<Self> {
		let (progress, _) = watch::channel(PoolProgress::default());
		Arc::new(Self {
			items: RwLock::new(Vec::new()),
			progress,
		})
	}

	pub fn push_batch(&self, batch: Vec<Arc<str>>) {
		if batch.is_empty() {
			return;
		}
		let len = {
			let mut items = self.items.write();
			items.extend(batch);
			items.len()
		};
		self.progress.send_modify(|progress| progress.len = len);
	}

	/// Marks the pool complete. Later pushes are still accepted but never expected.
	pub fn finish(&self) {
		self.progress.send_modify(|progress| progress.complete = true);
	}

	pub fn progress(&self) -> PoolProgress {
		*self.progress.borrow()
	}

	pub fn subscribe(&self) -> watch::Receiver<PoolProgress> {
		self.progress.subscribe()
	}

	/// Copies up to `max` candidates starting at `from`.
	pub fn read_from(&self, from: usize, max: usize) -> Vec<Arc<str>> {
		let items = self.items.read();
		items.iter().skip(from).take(max).cloned().collect()
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use super::*;

	fn batch(items: &[&str]) -> Vec<Arc<str>> {
		items.iter().map(|item| Arc::from(*item)).collect()
	}

	#[test]
	fn reads_by_cursor() {
		let pool = CandidatePool::new();
		pool.push_batch(batch(&["a", "b", "c"]));
		pool.push_batch(Vec::new());

		assert_eq!(pool.read_from(1, 10), batch(&["b", "c"]));
		assert_eq!(pool.read_from(0, 2), batch(&["a", "b"]));
		assert!(pool.read_from(3, 10).is_empty());
		assert_eq!(pool.progress(), PoolProgress { len: 3, complete: false });
	}

	#[tokio::test]
	async fn subscribers_wake_on_push_and_finish() {
		let pool = CandidatePool::new();
		let mut rx = pool.subscribe();

		let writer = Arc::clone(&pool);
		tokio::spawn(async move {
			writer.push_batch(vec![Arc::from("x")]);
			writer.finish();
		});

		tokio::time::timeout(Duration::from_secs(1), async {
			loop {
				if rx.borrow_and_update().complete {
					break;
				}
				rx.changed().await.expect("pool alive");
			}
		})
		.await
		.expect("pool completes");
		assert_eq!(pool.progress(), PoolProgress { len: 1, complete: true });
	}
}
