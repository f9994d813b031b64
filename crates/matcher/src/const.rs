//! Default scoring weights.

pub const MATCH_SCORE: u16 = 12;
pub const MATCHING_CASE_BONUS: u16 = 4;

pub const GAP_OPEN_PENALTY: u16 = 5;
pub const GAP_EXTEND_PENALTY: u16 = 1;

pub const PREFIX_BONUS: u16 = 12;
/// Bonus when the match starts right after a leading non-alphanumeric char (`-a`, `.config`).
pub const OFFSET_PREFIX_BONUS: u16 = 8;
pub const DELIMITER_BONUS: u16 = 4;
pub const CAPITALIZATION_BONUS: u16 = 4;
pub const ADJACENCY_BONUS: u16 = 6;
pub const EXACT_MATCH_BONUS: u16 = 8;

/// Bonus awarded to the shortest haystacks, reduced by one per [`SHORT_HAYSTACK_STEP`] chars.
pub const SHORT_HAYSTACK_BONUS: u16 = 8;
pub const SHORT_HAYSTACK_STEP: usize = 8;

pub const DELIMITERS: &str = " /\\,_-.:";
