//! Pattern text and cursor, edited in chars.

/// Pattern being typed. The cursor is a char offset in `0..=len`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prompt {
	text: String,
	cursor: usize,
}

impl Prompt {
	pub fn text(&self) -> &str {
		&self.text
	}

	pub fn cursor(&self) -> usize {
		self.cursor
	}

	/// Length in chars.
	pub fn len(&self) -> usize {
		self.text.chars().count()
	}

	pub fn is_empty(&self) -> bool {
		self.text.is_empty()
	}

	fn byte_offset(&self, char_idx: usize) -> usize {
		self.text.char_indices().nth(char_idx).map_or(self.text.len(), |(offset, _)| offset)
	}

	/// Inserts `ch` at the cursor and moves the cursor past it.
	pub fn insert(&mut self, ch: char) -> bool {
		let at = self.byte_offset(self.cursor);
		self.text.insert(at, ch);
		self.cursor += 1;
		true
	}

	/// Removes the char before the cursor.
	pub fn backspace(&mut self) -> bool {
		if self.cursor == 0 {
			return false;
		}
		let at = self.byte_offset(self.cursor - 1);
		self.text.remove(at);
		self.cursor -= 1;
		true
	}

	pub fn clear(&mut self) -> bool {
		let changed = !self.text.is_empty();
		self.text.clear();
		self.cursor = 0;
		changed
	}

	pub fn left(&mut self) -> bool {
		if self.cursor == 0 {
			return false;
		}
		self.cursor -= 1;
		true
	}

	pub fn right(&mut self) -> bool {
		if self.cursor >= self.len() {
			return false;
		}
		self.cursor += 1;
		true
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	#[test]
	fn insert_and_backspace_restore_state() {
		let mut prompt = Prompt::default();
		prompt.insert('a');
		prompt.insert('b');
		prompt.left();
		let before = prompt.clone();

		assert!(prompt.insert('x'));
		assert_eq!(prompt.text(), "axb");
		assert_eq!(prompt.cursor(), 2);
		assert!(prompt.backspace());
		assert_eq!(prompt, before);
	}

	#[test]
	fn edits_count_chars_not_bytes() {
		let mut prompt = Prompt::default();
		prompt.insert('日');
		prompt.insert('本');
		assert_eq!(prompt.cursor(), 2);
		prompt.left();
		prompt.insert('é');
		assert_eq!(prompt.text(), "日é本");
		assert_eq!(prompt.cursor(), 2);
		prompt.backspace();
		assert_eq!(prompt.text(), "日本");
	}

	#[test]
	fn cursor_moves_are_clamped() {
		let mut prompt = Prompt::default();
		assert!(!prompt.left());
		assert!(!prompt.right());
		assert!(!prompt.backspace());
		prompt.insert('a');
		assert!(!prompt.right());
		assert!(prompt.left());
		assert!(!prompt.backspace());
		assert!(prompt.clear());
		assert_eq!(prompt.cursor(), 0);
		assert!(!prompt.clear());
	}

	proptest! {
		#[test]
		fn cursor_stays_within_bounds(ops in prop::collection::vec(0u8..5, 0..64)) {
			let mut prompt = Prompt::default();
			for op in ops {
				match op {
					0 => { prompt.insert('ü'); }
					1 => { prompt.backspace(); }
					2 => { prompt.left(); }
					3 => { prompt.right(); }
					_ => { prompt.clear(); }
				}
				prop_assert!(prompt.cursor() <= prompt.len());
			}
		}
	}
}
