//! Character reader with mark/reset used by the path and filter tokenizers.
//!
//! Positions are character offsets, not byte offsets, so error messages point
//! at the right column for non-ASCII input.

#[derive(Debug)]
pub(crate) struct StringReader {
    chars: Vec<char>,
    pos: usize,
    mark: usize,
}

impl StringReader {
    pub(crate) fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            mark: 0,
        }
    }

    /// Next character, or `None` at end of input.
    pub(crate) fn read(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        Some(c)
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Step back over the last character read.
    pub(crate) fn unread(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    pub(crate) fn mark(&mut self) {
        self.mark = self.pos;
    }

    pub(crate) fn reset(&mut self) {
        self.pos = self.mark;
    }

    /// Advance up to `n` characters, returning how many were skipped.
    pub(crate) fn skip(&mut self, n: usize) -> usize {
        let skipped = n.min(self.chars.len() - self.pos);
        self.pos += skipped;
        skipped
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn mark_position(&self) -> usize {
        self.mark
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    /// Everything from the current position to the end.
    pub(crate) fn remaining(&self) -> String {
        self.chars[self.pos..].iter().collect()
    }
}
