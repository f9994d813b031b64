//! Windowed result publication.

use crate::event::{Notification, NotificationSink, ResultWindow};
use crate::options::ResultType;
use crate::view::ResultView;

/// Builds the visible window, cutting display text to `max_chars`.
pub fn snapshot(view: &ResultView, max_chars: usize) -> ResultWindow {
	let range = view.window();
	let result_type = view.results().result_type();
	let mut items = Vec::with_capacity(range.len());
	let mut matches = Vec::with_capacity(range.len());
	let mut row_kinds = Vec::new();

	for entry in view.results().iter_from(range.start).take(range.len()) {
		items.push(truncate(entry.display(), max_chars));
		matches.push(entry.indices.iter().copied().filter(|&idx| idx < max_chars).collect());
		if result_type == ResultType::Ag {
			row_kinds.push(entry.kind);
		}
	}

	ResultWindow {
		items,
		selected: view.selected().saturating_sub(range.start),
		matches,
		result_type,
		start: range.start,
		total: view.total(),
		row_kinds,
	}
}

fn truncate(text: &str, max_chars: usize) -> String {
	match text.char_indices().nth(max_chars) {
		Some((cut, _)) => text[..cut].to_string(),
		None => text.to_string(),
	}
}

/// Sends result windows, suppressing unforced repeats.
#[derive(Debug)]
pub struct Publisher {
	sink: NotificationSink,
	max_chars: usize,
	last: Option<(Vec<String>, Vec<Vec<usize>>)>,
}

impl Publisher {
	pub fn new(sink: NotificationSink, max_chars: usize) -> Self {
		Self {
			sink,
			max_chars: max_chars.max(1),
			last: None,
		}
	}

	/// Clamps the view and publishes its window. Returns whether anything was sent.
	pub fn flush(&mut self, view: &mut ResultView, force: bool) -> bool {
		view.clamp();
		let window = snapshot(view, self.max_chars);
		if !force && self.last.as_ref().is_some_and(|(items, matches)| *items == window.items && *matches == window.matches) {
			return false;
		}
		self.last = Some((window.items.clone(), window.matches.clone()));
		self.sink.send(Notification::ShowResult(window));
		true
	}

	/// Publishes the selection relative to the window start.
	pub fn select(&self, view: &ResultView) {
		self.sink.send(Notification::Select {
			selected: view.selected().saturating_sub(view.start()),
		});
	}

	/// Forgets the last published window so the next flush always sends.
	pub fn forget(&mut self) {
		self.last = None;
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use pretty_assertions::assert_eq;

	use super::*;
	use crate::rank::{Entry, Scored};

	fn view_of(items: &[(&str, u16, Vec<usize>)], max: usize) -> ResultView {
		let mut view = ResultView::new(ResultType::Plain, max);
		for (text, score, indices) in items {
			view.insert(Scored::Item(Entry::item(Arc::from(*text), *score, indices.clone())));
		}
		view
	}

	fn windows(rx: &mut tokio::sync::mpsc::UnboundedReceiver<Notification>) -> Vec<ResultWindow> {
		let mut out = Vec::new();
		while let Ok(notification) = rx.try_recv() {
			if let Notification::ShowResult(window) = notification {
				out.push(window);
			}
		}
		out
	}

	#[test]
	fn snapshot_clips_window_and_truncates() {
		let mut view = view_of(&[("abcdef", 3, vec![0, 5]), ("xy", 2, vec![1]), ("z", 1, vec![])], 2);
		view.move_down();
		view.move_down();
		let window = snapshot(&view, 4);
		assert_eq!(window.items, ["xy", "z"]);
		assert_eq!(window.start, 1);
		assert_eq!(window.total, 3);
		assert_eq!(window.selected, 1);
		assert!(window.row_kinds.is_empty());

		let window = snapshot(&view_of(&[("abcdef", 3, vec![0, 5])], 2), 4);
		assert_eq!(window.items, ["abcd"]);
		assert_eq!(window.matches, vec![vec![0]]);
	}

	#[test]
	fn unforced_repeats_are_suppressed() {
		let (sink, mut rx) = NotificationSink::channel();
		let mut publisher = Publisher::new(sink, 100);
		let mut view = view_of(&[("a", 0, vec![])], 5);

		assert!(publisher.flush(&mut view, false));
		assert!(!publisher.flush(&mut view, false));
		assert!(publisher.flush(&mut view, true));
		view.insert(Scored::Item(Entry::item(Arc::from("b"), 0, Vec::new())));
		assert!(publisher.flush(&mut view, false));
		publisher.forget();
		assert!(publisher.flush(&mut view, false));

		let sent = windows(&mut rx);
		assert_eq!(sent.len(), 4);
		assert_eq!(sent[3].items, ["a", "b"]);
	}

	#[test]
	fn empty_view_publishes_empty_window() {
		let (sink, mut rx) = NotificationSink::channel();
		let mut publisher = Publisher::new(sink, 100);
		let mut view = view_of(&[], 5);
		publisher.flush(&mut view, true);
		publisher.select(&view);

		assert_eq!(
			rx.try_recv().expect("window"),
			Notification::ShowResult(ResultWindow {
				items: Vec::new(),
				selected: 0,
				matches: Vec::new(),
				result_type: ResultType::Plain,
				start: 0,
				total: 0,
				row_kinds: Vec::new(),
			})
		);
		assert_eq!(rx.try_recv().expect("select"), Notification::Select { selected: 0 });
	}
}
