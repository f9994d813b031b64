//! Fuzzy subsequence scoring for the finder.
//!
//! Every needle char must appear in order inside the haystack. Scores reward
//! contiguous runs, word boundaries (prefix, delimiter, camelCase) and short
//! haystacks, and penalize gaps with an affine open/extend penalty. Matching
//! is smart-case by default: a needle containing an uppercase char matches
//! case-sensitively, otherwise case is ignored.
//!
//! Indices are reported in chars (Unicode scalar values), never bytes.

pub mod r#const;
mod greedy;
mod indices;

use r#const::*;

pub use indices::{match_indices, score};

/// Score weights used by the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct Scoring {
	/// Score for each matched char.
	pub match_score: u16,
	/// Bonus when the needle char has the same case as the haystack char.
	pub matching_case_bonus: u16,
	/// Penalty for the first skipped haystack char between two matches.
	pub gap_open_penalty: u16,
	/// Penalty for every further skipped haystack char.
	pub gap_extend_penalty: u16,
	/// Bonus for matching the first haystack char.
	pub prefix_bonus: u16,
	/// Bonus for matching the second haystack char after a leading symbol.
	pub offset_prefix_bonus: u16,
	/// Bonus for a match directly after a delimiter.
	pub delimiter_bonus: u16,
	/// Bonus for a match on a lowercase to uppercase transition.
	pub capitalization_bonus: u16,
	/// Bonus for a match directly following the previous match.
	pub adjacency_bonus: u16,
	/// Bonus when needle and haystack are equal.
	pub exact_match_bonus: u16,
	/// Maximum bonus for short haystacks.
	pub short_haystack_bonus: u16,
	/// Chars that count as word delimiters.
	pub delimiters: String,
}

impl Default for Scoring {
	fn default() -> Self {
		Self {
			match_score: MATCH_SCORE,
			matching_case_bonus: MATCHING_CASE_BONUS,
			gap_open_penalty: GAP_OPEN_PENALTY,
			gap_extend_penalty: GAP_EXTEND_PENALTY,
			prefix_bonus: PREFIX_BONUS,
			offset_prefix_bonus: OFFSET_PREFIX_BONUS,
			delimiter_bonus: DELIMITER_BONUS,
			capitalization_bonus: CAPITALIZATION_BONUS,
			adjacency_bonus: ADJACENCY_BONUS,
			exact_match_bonus: EXACT_MATCH_BONUS,
			short_haystack_bonus: SHORT_HAYSTACK_BONUS,
			delimiters: DELIMITERS.to_string(),
		}
	}
}

/// Case handling for the needle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(rename_all = "snake_case"))]
pub enum CaseMatching {
	/// Case-sensitive only when the needle contains an uppercase char.
	#[default]
	Smart,
	/// Always case-sensitive.
	Respect,
	/// Always case-insensitive.
	Ignore,
}

impl CaseMatching {
	/// Resolves whether `needle` should be matched case-sensitively.
	pub fn is_sensitive(self, needle: &str) -> bool {
		match self {
			Self::Smart => needle.chars().any(char::is_uppercase),
			Self::Respect => true,
			Self::Ignore => false,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct Config {
	pub scoring: Scoring,
	pub case_matching: CaseMatching,
}

/// Result of matching one needle against one haystack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchIndices {
	/// Match score, `>= 1` for any non-empty needle.
	pub score: u16,
	/// Matched char indices into the haystack, ascending.
	pub indices: Vec<usize>,
	/// Needle and haystack are equal under the active case rule.
	pub exact: bool,
}
