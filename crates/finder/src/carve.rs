//! Per result type candidate carving and scoring.
//!
//! The scored span of a candidate depends on the result type; match indices
//! are shifted back into the coordinates of the displayed text.

use std::collections::HashMap;
use std::sync::Arc;

use ferret_matcher::{Config, MatchIndices, match_indices};

use crate::event::RowKind;
use crate::options::ResultType;
use crate::rank::{Entry, Scored, UNSCORED};

/// Byte offsets of the `file:line:col:content` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Fields {
	pub file_end: usize,
	pub line_start: usize,
	pub col_end: usize,
	pub content_start: usize,
}

/// Splits on the first three colons, skipping a Windows drive prefix.
pub(crate) fn split_fields(text: &str) -> Option<Fields> {
	let bytes = text.as_bytes();
	let skip = if bytes.len() > 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && matches!(bytes[2], b'\\' | b'/') {
		2
	} else {
		0
	};
	let mut colons = text[skip..].match_indices(':').map(|(idx, _)| idx + skip);
	let file_end = colons.next()?;
	let _line_end = colons.next()?;
	let col_end = colons.next()?;
	Some(Fields {
		file_end,
		line_start: file_end + 1,
		col_end,
		content_start: col_end + 1,
	})
}

fn char_len(text: &str) -> usize {
	text.chars().count()
}

fn shift(indices: Vec<usize>, by: usize) -> Vec<usize> {
	if by == 0 {
		return indices;
	}
	indices.into_iter().map(|idx| idx + by).collect()
}

#[derive(Debug)]
struct HeaderMatch {
	name: Arc<str>,
	matched: Option<MatchIndices>,
}

/// Scores candidates against one pattern for one pass.
#[derive(Debug)]
pub struct Carver {
	pattern: String,
	result_type: ResultType,
	config: Config,
	headers: HashMap<Arc<str>, HeaderMatch>,
}

impl Carver {
	pub fn new(pattern: impl Into<String>, result_type: ResultType, config: Config) -> Self {
		Self {
			pattern: pattern.into(),
			result_type,
			config,
			headers: HashMap::new(),
		}
	}

	fn matches(&self, haystack: &str) -> Option<MatchIndices> {
		match_indices(&self.pattern, haystack, &self.config)
	}

	/// Returns the scored form of `candidate`, or `None` when it is filtered out.
	pub fn carve(&mut self, candidate: &Arc<str>) -> Option<Scored> {
		match self.result_type {
			ResultType::Plain => {
				let matched = self.matches(candidate)?;
				Some(Scored::Item(Entry::item(Arc::clone(candidate), matched.score, matched.indices)))
			}
			ResultType::Line => {
				let offset = candidate.find('\t').map_or(0, |tab| tab + 1);
				self.carve_suffix(candidate, offset)
			}
			ResultType::FileLine => {
				let offset = split_fields(candidate).map_or(0, |fields| fields.content_start);
				self.carve_suffix(candidate, offset)
			}
			ResultType::Ag => self.carve_ag(candidate),
		}
	}

	fn carve_suffix(&self, candidate: &Arc<str>, offset: usize) -> Option<Scored> {
		let matched = self.matches(&candidate[offset..])?;
		let indices = shift(matched.indices, char_len(&candidate[..offset]));
		Some(Scored::Item(Entry::item(Arc::clone(candidate), matched.score, indices)))
	}

	fn carve_ag(&mut self, candidate: &Arc<str>) -> Option<Scored> {
		let Some(fields) = split_fields(candidate).filter(|fields| is_position(&candidate[fields.line_start..fields.col_end])) else {
			tracing::trace!(candidate = %candidate, "finder.carve.ag_malformed");
			return None;
		};

		let file = &candidate[..fields.file_end];
		if !self.headers.contains_key(file) {
			let name: Arc<str> = Arc::from(file);
			let matched = self.matches(file);
			self.headers.insert(Arc::clone(&name), HeaderMatch { name, matched });
		}
		let header = self.headers.get(file)?;

		let (score, indices) = match (self.matches(&candidate[fields.content_start..]), &header.matched) {
			(Some(matched), _) => (matched.score, shift(matched.indices, char_len(&candidate[fields.line_start..fields.content_start]))),
			(None, Some(_)) => (UNSCORED, Vec::new()),
			(None, None) => return None,
		};

		let (header_score, header_indices) = header.matched.as_ref().map_or((UNSCORED, Vec::new()), |m| (m.score, m.indices.clone()));
		Some(Scored::Grouped {
			header: Entry {
				candidate: Arc::clone(&header.name),
				display_start: 0,
				score: header_score,
				indices: header_indices,
				kind: RowKind::Header,
			},
			line: Entry {
				candidate: Arc::clone(candidate),
				display_start: fields.line_start,
				score,
				indices,
				kind: RowKind::Line,
			},
		})
	}
}

/// `line:col` digits between the first and third colon.
fn is_position(text: &str) -> bool {
	let mut parts = text.split(':');
	let (Some(line), Some(col), None) = (parts.next(), parts.next(), parts.next()) else {
		return false;
	};
	[line, col].iter().all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}
