use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::sync::mpsc::UnboundedReceiver;

use super::*;
use crate::event::{Notification, NotificationSink, ResultWindow};
use crate::publish::Publisher;
use crate::state::FilterState;
use crate::view::ResultView;

struct Fixture {
	pool: Arc<CandidatePool>,
	state: SharedState,
	rx: UnboundedReceiver<Notification>,
	config: Arc<FinderConfig>,
}

fn fixture(result_type: ResultType) -> Fixture {
	let (sink, rx) = NotificationSink::channel();
	let config = Arc::new(FinderConfig {
		flush_interval_ms: 10,
		stall_timeout_ms: 200,
		batch_size: 2,
		..FinderConfig::default()
	});
	let state = FilterState::shared(ResultView::new(result_type, 10), Publisher::new(sink, config.max_display_chars));
	Fixture {
		pool: CandidatePool::new(),
		state,
		rx,
		config,
	}
}

impl Fixture {
	fn push(&self, items: &[&str]) {
		self.pool.push_batch(items.iter().map(|item| Arc::from(*item)).collect());
	}

	fn pass(&self, generation: u64, pattern: &str, result_type: ResultType) -> Pass {
		self.state.lock().begin_pass(generation, result_type);
		Pass {
			token: GenerationToken::root(generation),
			pattern: pattern.to_string(),
			result_type,
			pool: Arc::clone(&self.pool),
			state: Arc::clone(&self.state),
			config: Arc::clone(&self.config),
		}
	}

	fn windows(&mut self) -> Vec<ResultWindow> {
		let mut out = Vec::new();
		while let Ok(notification) = self.rx.try_recv() {
			if let Notification::ShowResult(window) = notification {
				out.push(window);
			}
		}
		out
	}
}

#[tokio::test]
async fn exhausted_pass_publishes_ranked_window() {
	let mut fx = fixture(ResultType::Plain);
	fx.push(&["bar.go", "foo.go", "fog", "readme"]);
	fx.pool.finish();

	let end = fx.pass(1, "fg", ResultType::Plain).run().await;
	assert_eq!(end, PassEnd::Exhausted);

	let last = fx.windows().pop().expect("final flush");
	assert_eq!(last.items, ["foo.go", "fog"]);
	assert_eq!(last.total, 2);
	assert_eq!(fx.state.lock().considered, 4);
}

#[tokio::test]
async fn empty_pattern_keeps_source_order() {
	let mut fx = fixture(ResultType::Plain);
	fx.push(&["foo.go", "bar.go", "baz.txt"]);
	fx.pool.finish();

	fx.pass(1, "", ResultType::Plain).run().await;
	let last = fx.windows().pop().expect("final flush");
	assert_eq!(last.items, ["foo.go", "bar.go", "baz.txt"]);
	assert!(last.matches.iter().all(Vec::is_empty));
}

#[tokio::test]
async fn pass_follows_streaming_pool() {
	let mut fx = fixture(ResultType::Plain);
	fx.push(&["a1"]);
	let pass = fx.pass(1, "a", ResultType::Plain);
	let handle = tokio::spawn(pass.run());

	tokio::time::sleep(Duration::from_millis(30)).await;
	fx.push(&["b", "a2", "a3"]);
	fx.pool.finish();

	let end = tokio::time::timeout(Duration::from_secs(2), handle).await.expect("pass ends").expect("pass joins");
	assert_eq!(end, PassEnd::Exhausted);
	assert_eq!(fx.windows().pop().expect("final flush").total, 3);
}

#[tokio::test]
async fn stall_timeout_ends_pass_with_flush() {
	let mut fx = fixture(ResultType::Plain);
	fx.push(&["only"]);

	let started = Instant::now();
	let end = fx.pass(1, "", ResultType::Plain).run().await;
	assert_eq!(end, PassEnd::Stalled);
	assert!(started.elapsed() < Duration::from_secs(2));
	assert_eq!(fx.windows().pop().expect("final flush").items, ["only"]);
}

#[tokio::test]
async fn superseded_pass_never_publishes() {
	let mut fx = fixture(ResultType::Plain);
	fx.push(&["x", "y", "z"]);
	fx.pool.finish();

	let pass = fx.pass(1, "", ResultType::Plain);
	fx.state.lock().begin_pass(2, ResultType::Plain);
	assert_eq!(pass.run().await, PassEnd::Superseded);
	assert!(fx.windows().is_empty());
	assert_eq!(fx.state.lock().view.total(), 0);
}

#[tokio::test]
async fn cancelled_pass_stops_waiting() {
	let mut fx = fixture(ResultType::Plain);
	let pass = fx.pass(1, "", ResultType::Plain);
	let token = pass.token.clone();
	let handle = tokio::spawn(pass.run());

	tokio::time::sleep(Duration::from_millis(20)).await;
	token.cancel();
	let end = tokio::time::timeout(Duration::from_secs(1), handle).await.expect("pass ends").expect("pass joins");
	assert_eq!(end, PassEnd::Superseded);
	assert!(fx.windows().is_empty());
}

#[tokio::test]
async fn ticker_flushes_while_pass_runs() {
	let mut fx = fixture(ResultType::Plain);
	fx.push(&["early"]);
	fx.pass(1, "", ResultType::Plain).spawn();

	tokio::time::sleep(Duration::from_millis(80)).await;
	let windows = fx.windows();
	assert!(!windows.is_empty(), "ticker published before the pool completed");
	assert_eq!(windows[0].items, ["early"]);
	assert_eq!(windows.len(), 1, "unchanged windows are not republished");
}

#[tokio::test]
async fn ag_pass_groups_by_file() {
	let mut fx = fixture(ResultType::Ag);
	fx.push(&["a.rs:1:1:let x", "b.rs:2:3:fn main", "a.rs:9:1:fn helper", "garbage"]);
	fx.pool.finish();

	fx.pass(1, "fn", ResultType::Ag).run().await;
	let last = fx.windows().pop().expect("final flush");
	assert_eq!(last.items, ["b.rs", "2:3:fn main", "a.rs", "9:1:fn helper"]);
	assert_eq!(last.selected, 1);
	assert_eq!(last.row_kinds.len(), 4);
}
