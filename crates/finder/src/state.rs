use std::sync::Arc;

use parking_lot::Mutex;

use crate::options::ResultType;
use crate::publish::Publisher;
use crate::view::ResultView;

/// View shared between the controller, the running pass and its flush ticker.
///
/// `generation` names the only pass allowed to insert or flush. Passes check
/// it under the lock, so a superseded pass never reaches the display.
#[derive(Debug)]
pub(crate) struct FilterState {
	pub generation: u64,
	/// Candidates the current pass has scored.
	pub considered: usize,
	pub view: ResultView,
	pub publisher: Publisher,
}

pub(crate) type SharedState = Arc<Mutex<FilterState>>;

impl FilterState {
	pub fn shared(view: ResultView, publisher: Publisher) -> SharedState {
		Arc::new(Mutex::new(Self {
			generation: 0,
			considered: 0,
			view,
			publisher,
		}))
	}

	/// Hands the view to a new pass.
	pub fn begin_pass(&mut self, generation: u64, result_type: ResultType) {
		self.generation = generation;
		self.considered = 0;
		self.view.reset(result_type);
	}

	/// Detaches the view from any pass.
	pub fn retire(&mut self, generation: u64) {
		self.generation = generation;
	}

	pub fn flush(&mut self, force: bool) -> bool {
		let Self { view, publisher, .. } = self;
		publisher.flush(view, force)
	}

	pub fn select(&self) {
		self.publisher.select(&self.view);
	}
}
