use std::collections::HashMap;
use std::sync::Arc;

use super::Entry;

#[derive(Debug)]
struct Group {
	header: Entry,
	lines: Vec<Entry>,
	/// Max of the header score and every line score.
	score: u16,
}

/// `ag` file groups. Slots never move; `order` holds slot ids by descending group score.
#[derive(Debug, Default)]
pub(super) struct Groups {
	slots: Vec<Group>,
	order: Vec<usize>,
	by_file: HashMap<Arc<str>, usize>,
	rows: usize,
}

impl Groups {
	pub(super) fn rows(&self) -> usize {
		self.rows
	}

	pub(super) fn insert(&mut self, header: Entry, line: Entry) {
		let slot = match self.by_file.get(&header.candidate) {
			Some(&slot) => slot,
			None => {
				let slot = self.slots.len();
				let score = header.score;
				self.by_file.insert(Arc::clone(&header.candidate), slot);
				self.slots.push(Group {
					header,
					lines: Vec::new(),
					score,
				});
				let at = self.position_for(score);
				self.order.insert(at, slot);
				self.rows += 1;
				slot
			}
		};

		let group = &mut self.slots[slot];
		let line_score = line.score;
		let at = group.lines.partition_point(|existing| existing.score >= line_score);
		group.lines.insert(at, line);
		self.rows += 1;

		if line_score > group.score {
			group.score = line_score;
			self.reposition(slot);
		}
	}

	fn position_for(&self, score: u16) -> usize {
		self.order.partition_point(|&slot| self.slots[slot].score >= score)
	}

	fn reposition(&mut self, slot: usize) {
		if let Some(at) = self.order.iter().position(|&existing| existing == slot) {
			self.order.remove(at);
		}
		let at = self.position_for(self.slots[slot].score);
		self.order.insert(at, slot);
	}

	pub(super) fn get(&self, mut row: usize) -> Option<&Entry> {
		for &slot in &self.order {
			let group = &self.slots[slot];
			if row == 0 {
				return Some(&group.header);
			}
			row -= 1;
			if row < group.lines.len() {
				return group.lines.get(row);
			}
			row -= group.lines.len();
		}
		None
	}

	pub(super) fn iter(&self) -> impl Iterator<Item = &Entry> + '_ {
		self.order.iter().flat_map(move |&slot| {
			let group = &self.slots[slot];
			std::iter::once(&group.header).chain(group.lines.iter())
		})
	}

	#[cfg(test)]
	pub(super) fn is_sorted(&self) -> bool {
		let groups_sorted = self.order.windows(2).all(|pair| self.slots[pair[0]].score >= self.slots[pair[1]].score);
		let lines_sorted = self.slots.iter().all(|group| group.lines.windows(2).all(|pair| pair[0].score >= pair[1].score));
		groups_sorted && lines_sorted
	}
}
