//! Selection and window over the ranked results.

use std::ops::Range;

use crate::options::ResultType;
use crate::rank::{Entry, RankedResults, Scored};

#[derive(Debug)]
pub struct ResultView {
	results: RankedResults,
	selected: usize,
	start: usize,
	max: usize,
}

impl ResultView {
	pub fn new(result_type: ResultType, max: usize) -> Self {
		Self {
			results: RankedResults::new(result_type),
			selected: 0,
			start: 0,
			max: max.max(1),
		}
	}

	/// Drops all results and moves selection and window back to the top.
	pub fn reset(&mut self, result_type: ResultType) {
		self.results = RankedResults::new(result_type);
		self.selected = 0;
		self.start = 0;
	}

	pub fn results(&self) -> &RankedResults {
		&self.results
	}

	pub fn insert(&mut self, scored: Scored) {
		self.results.insert(scored);
	}

	pub fn total(&self) -> usize {
		self.results.len()
	}

	pub fn selected(&self) -> usize {
		self.selected
	}

	pub fn start(&self) -> usize {
		self.start
	}

	pub fn max(&self) -> usize {
		self.max
	}

	pub fn set_max(&mut self, max: usize) {
		self.max = max.max(1);
	}

	/// Visible rows, `[start, start + max)` clipped to the total.
	pub fn window(&self) -> Range<usize> {
		let total = self.total();
		let start = self.start.min(total);
		start..(start + self.max).min(total)
	}

	pub fn selected_entry(&self) -> Option<&Entry> {
		self.results.get(self.selected)
	}

	/// Pulls selection back into range, off header rows, and slides the window onto it.
	pub fn clamp(&mut self) {
		let total = self.total();
		if total == 0 {
			self.selected = 0;
			self.start = 0;
			return;
		}
		self.selected = self.selected.min(total - 1);
		// Every header is followed by at least one line row.
		if self.results.is_header(self.selected) && self.selected + 1 < total {
			self.selected += 1;
		}
		self.follow();
	}

	/// Selects the next row, wrapping to the top. Returns whether the window moved.
	pub fn move_down(&mut self) -> bool {
		self.step(|row, total| (row + 1) % total)
	}

	/// Selects the previous row, wrapping to the bottom. Returns whether the window moved.
	pub fn move_up(&mut self) -> bool {
		self.step(|row, total| (row + total - 1) % total)
	}

	fn step(&mut self, next: impl Fn(usize, usize) -> usize) -> bool {
		self.clamp();
		let total = self.total();
		if total == 0 {
			return false;
		}
		let before = self.start;
		let mut row = next(self.selected, total);
		if self.results.is_header(row) {
			row = next(row, total);
		}
		self.selected = row;
		self.follow();
		self.start != before
	}

	fn follow(&mut self) {
		if self.selected < self.start {
			self.start = self.selected;
		} else if self.selected >= self.start + self.max {
			self.start = self.selected + 1 - self.max;
		}
	}
}
