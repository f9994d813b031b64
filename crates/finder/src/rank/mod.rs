//! Rank-ordered result storage.
//!
//! Entries are kept sorted by descending score as they arrive: each insert
//! binary-searches the first position whose score is lower than the new one,
//! so ties keep arrival order and unscored entries simply append.

use std::sync::Arc;

use crate::event::RowKind;
use crate::options::ResultType;

mod grouped;

use grouped::Groups;

/// Score of entries when the pattern is empty or only a header matched.
pub const UNSCORED: u16 = 0;

/// One ranked row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
	/// Raw candidate, handed to confirm actions.
	pub candidate: Arc<str>,
	/// Byte offset where the displayed text starts inside `candidate`.
	pub display_start: usize,
	pub score: u16,
	/// Matched char indices into [`Entry::display`].
	pub indices: Vec<usize>,
	pub kind: RowKind,
}

impl Entry {
	pub fn item(candidate: Arc<str>, score: u16, indices: Vec<usize>) -> Self {
		Self {
			candidate,
			display_start: 0,
			score,
			indices,
			kind: RowKind::Item,
		}
	}

	pub fn display(&self) -> &str {
		self.candidate.get(self.display_start..).unwrap_or_default()
	}
}

/// A scored candidate ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scored {
	Item(Entry),
	/// An `ag` line together with the header of its file group.
	Grouped { header: Entry, line: Entry },
}

#[derive(Debug)]
enum Ranking {
	Flat(Vec<Entry>),
	Grouped(Groups),
}

/// Ranked results of one filter pass.
#[derive(Debug)]
pub struct RankedResults {
	result_type: ResultType,
	ranking: Ranking,
}

impl RankedResults {
	pub fn new(result_type: ResultType) -> Self {
		let ranking = match result_type {
			ResultType::Ag => Ranking::Grouped(Groups::default()),
			_ => Ranking::Flat(Vec::new()),
		};
		Self { result_type, ranking }
	}

	pub fn result_type(&self) -> ResultType {
		self.result_type
	}

	/// Number of rows, headers included.
	pub fn len(&self) -> usize {
		match &self.ranking {
			Ranking::Flat(entries) => entries.len(),
			Ranking::Grouped(groups) => groups.rows(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn insert(&mut self, scored: Scored) {
		match (&mut self.ranking, scored) {
			(Ranking::Flat(entries), Scored::Item(entry)) => {
				let at = entries.partition_point(|existing| existing.score >= entry.score);
				entries.insert(at, entry);
			}
			(Ranking::Grouped(groups), Scored::Grouped { header, line }) => groups.insert(header, line),
			(_, scored) => {
				tracing::debug!(result_type = self.result_type.as_str(), ?scored, "finder.rank.kind_mismatch");
			}
		}
	}

	pub fn get(&self, row: usize) -> Option<&Entry> {
		match &self.ranking {
			Ranking::Flat(entries) => entries.get(row),
			Ranking::Grouped(groups) => groups.get(row),
		}
	}

	pub fn is_header(&self, row: usize) -> bool {
		self.get(row).is_some_and(|entry| entry.kind == RowKind::Header)
	}

	/// Rows in display order starting at `start`.
	pub fn iter_from(&self, start: usize) -> Box<dyn Iterator<Item = &Entry> + '_> {
		match &self.ranking {
			Ranking::Flat(entries) => Box::new(entries.iter().skip(start)),
			Ranking::Grouped(groups) => Box::new(groups.iter().skip(start)),
		}
	}

	#[cfg(test)]
	pub(crate) fn is_sorted(&self) -> bool {
		match &self.ranking {
			Ranking::Flat(entries) => entries.windows(2).all(|pair| pair[0].score >= pair[1].score),
			Ranking::Grouped(groups) => groups.is_sorted(),
		}
	}
}
