use crate::greedy::match_greedy;
use crate::{Config, MatchIndices};

/// Matches `needle` against `haystack`, returning score and char indices.
///
/// An empty needle matches everything with score 0 and no indices.
pub fn match_indices<S1: AsRef<str>, S2: AsRef<str>>(needle: S1, haystack: S2, config: &Config) -> Option<MatchIndices> {
	let needle = needle.as_ref();
	let haystack = haystack.as_ref();

	if needle.is_empty() {
		return Some(MatchIndices {
			score: 0,
			indices: Vec::new(),
			exact: haystack.is_empty(),
		});
	}

	let case_sensitive = config.case_matching.is_sensitive(needle);
	let needle: Vec<char> = needle.chars().collect();
	let haystack: Vec<char> = haystack.chars().collect();
	let (score, indices, exact) = match_greedy(&needle, &haystack, case_sensitive, &config.scoring)?;

	Some(MatchIndices { score, indices, exact })
}

/// Returns only the score, or `None` on no match.
pub fn score<S1: AsRef<str>, S2: AsRef<str>>(needle: S1, haystack: S2, config: &Config) -> Option<u16> {
	match_indices(needle, haystack, config).map(|m| m.score)
}
