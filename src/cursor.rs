//! Low-level character cursor shared by the command-line tokenizer and the
//! SQL keyword tokenizer.

/// A position-tracking view over an input string.
///
/// The cursor works on a decoded character buffer so that all offsets are
/// character indices, which is what the positioned syntax errors report.
/// Backtracking is done by saving [`LexCursor::position`] and calling
/// [`LexCursor::rewind`]; a position is a plain integer and is trivially
/// copied.
#[derive(Debug, Clone)]
pub struct LexCursor {
    chars: Vec<char>,
    idx: usize,
}

impl LexCursor {
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            idx: 0,
        }
    }

    /// Consume and return the next character, or `None` at end of input.
    pub fn next(&mut self) -> Option<char> {
        let ch = self.chars.get(self.idx).copied();
        if ch.is_some() {
            self.idx += 1;
        }
        ch
    }

    /// Look at the next character without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    /// Look `ahead` characters past the current position.
    #[must_use]
    pub fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.idx + ahead).copied()
    }

    /// Step back over the most recently consumed character.
    pub fn unget(&mut self) {
        debug_assert!(self.idx > 0, "unget before any character was consumed");
        self.idx = self.idx.saturating_sub(1);
    }

    /// Current character offset into the input.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.idx
    }

    /// Rewind to a position previously returned by [`LexCursor::position`].
    pub fn rewind(&mut self, position: usize) {
        debug_assert!(position <= self.chars.len());
        self.idx = position;
    }

    #[must_use]
    pub const fn is_at_end(&self) -> bool {
        self.idx >= self.chars.len()
    }

    /// True when there are strictly more than `count` characters left after
    /// the current one.
    #[must_use]
    pub const fn has_more_than(&self, count: usize) -> bool {
        self.chars.len() - (self.idx + 1) >= count
    }

    pub fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.idx += 1;
        }
    }

    /// Consume everything up to the end of input and return it.
    pub fn remainder(&mut self) -> String {
        let rest: String = self.chars[self.idx..].iter().collect();
        self.idx = self.chars.len();
        rest
    }
}
