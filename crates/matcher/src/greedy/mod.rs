use crate::Scoring;
use crate::r#const::SHORT_HAYSTACK_STEP;

#[inline]
fn fold(c: char) -> char {
	if c.is_ascii() {
		c.to_ascii_lowercase()
	} else {
		c.to_lowercase().next().unwrap_or(c)
	}
}

#[inline]
fn chars_eq(needle: char, haystack: char, case_sensitive: bool) -> bool {
	if case_sensitive { needle == haystack } else { fold(needle) == fold(haystack) }
}

/// Finds the tightest window ending at the first complete subsequence match,
/// then assigns needle chars greedily inside it.
///
/// Returns `None` when the needle is not a subsequence of the haystack.
pub(crate) fn match_greedy(needle: &[char], haystack: &[char], case_sensitive: bool, scoring: &Scoring) -> Option<(u16, Vec<usize>, bool)> {
	if needle.is_empty() || needle.len() > haystack.len() {
		return None;
	}

	let mut needle_idx = 0;
	let mut end = None;
	for (idx, &c) in haystack.iter().enumerate() {
		if chars_eq(needle[needle_idx], c, case_sensitive) {
			needle_idx += 1;
			if needle_idx == needle.len() {
				end = Some(idx);
				break;
			}
		}
	}
	let end = end?;

	// Walk back from the end to find the latest possible start.
	let mut needle_idx = needle.len();
	let mut start = end;
	for idx in (0..=end).rev() {
		if chars_eq(needle[needle_idx - 1], haystack[idx], case_sensitive) {
			needle_idx -= 1;
			if needle_idx == 0 {
				start = idx;
				break;
			}
		}
	}

	let mut indices = Vec::with_capacity(needle.len());
	let mut needle_idx = 0;
	for (idx, &c) in haystack.iter().enumerate().take(end + 1).skip(start) {
		if needle_idx < needle.len() && chars_eq(needle[needle_idx], c, case_sensitive) {
			indices.push(idx);
			needle_idx += 1;
		}
	}

	let exact = needle.len() == haystack.len() && needle.iter().zip(haystack).all(|(&n, &h)| chars_eq(n, h, case_sensitive));
	let score = score_indices(needle, haystack, &indices, exact, scoring);
	Some((score, indices, exact))
}

fn score_indices(needle: &[char], haystack: &[char], indices: &[usize], exact: bool, scoring: &Scoring) -> u16 {
	let is_delimiter = |c: char| scoring.delimiters.contains(c);
	let mut score: u16 = 0;

	for (needle_idx, &idx) in indices.iter().enumerate() {
		let needle_char = needle[needle_idx];
		let haystack_char = haystack[idx];

		score = score.saturating_add(scoring.match_score);
		if needle_char == haystack_char {
			score = score.saturating_add(scoring.matching_case_bonus);
		}

		if idx == 0 {
			score = score.saturating_add(scoring.prefix_bonus);
		} else if idx == 1 && !haystack[0].is_alphanumeric() {
			score = score.saturating_add(scoring.offset_prefix_bonus);
		} else {
			let prev = haystack[idx - 1];
			if is_delimiter(prev) && !is_delimiter(haystack_char) {
				score = score.saturating_add(scoring.delimiter_bonus);
			} else if haystack_char.is_uppercase() && prev.is_lowercase() {
				score = score.saturating_add(scoring.capitalization_bonus);
			}
		}

		if needle_idx > 0 {
			let gap = idx - indices[needle_idx - 1] - 1;
			if gap == 0 {
				score = score.saturating_add(scoring.adjacency_bonus);
			} else {
				let extend = u16::try_from(gap - 1).unwrap_or(u16::MAX);
				let penalty = scoring.gap_open_penalty.saturating_add(scoring.gap_extend_penalty.saturating_mul(extend));
				score = score.saturating_sub(penalty);
			}
		}
	}

	if exact {
		score = score.saturating_add(scoring.exact_match_bonus);
	}

	let length_steps = u16::try_from(haystack.len() / SHORT_HAYSTACK_STEP).unwrap_or(u16::MAX);
	score = score.saturating_add(scoring.short_haystack_bonus.saturating_sub(length_steps));

	score.max(1)
}
