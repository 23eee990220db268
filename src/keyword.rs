//! Keyword-level tokenizer used by the terminator analyzers.
//!
//! Produces a stream of uppercased keyword tokens and single-character
//! punctuation tokens, silently skipping whitespace and comments and
//! collapsing string literals and quoted identifiers into opaque marker
//! tokens. The analyzers only care about statement structure, so original
//! case and literal contents are deliberately discarded.

use crate::cursor::LexCursor;

/// A structural SQL token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlToken {
    /// An alphanumeric/underscore run, uppercased.
    Keyword(String),
    /// Any other single character, including the terminator.
    Punct(char),
    /// A `'...'` string literal, contents discarded.
    StringLiteral,
    /// A `"..."` quoted identifier, contents discarded.
    QuotedIdentifier,
    /// A dialect variable reference (e.g. `$name`), contents discarded.
    Variable,
}

impl SqlToken {
    /// True when this token is the given keyword. `keyword` must be
    /// uppercase; tokens are uppercased at lexing time.
    #[must_use]
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Self::Keyword(word) if word == keyword)
    }

    #[must_use]
    pub const fn is_punct(&self, ch: char) -> bool {
        matches!(self, Self::Punct(c) if *c == ch)
    }
}

/// Dialect extension hook, tried before generic word tokenization.
///
/// The scanner inspects the cursor and either consumes a vendor lexeme and
/// returns its token, or leaves the cursor untouched and returns `None` to
/// fall through to the generic rules.
pub type SpecialScanner = fn(&mut LexCursor) -> Option<SqlToken>;

/// Pull-based tokenizer with lookahead and push-back.
pub struct KeywordTokenizer {
    cursor: LexCursor,
    terminator: char,
    special: Option<SpecialScanner>,
    /// Push-back stack; `skip` may need to restore more than one token.
    pushback: Vec<SqlToken>,
}

impl KeywordTokenizer {
    #[must_use]
    pub fn new(sql: &str, terminator: char) -> Self {
        Self {
            cursor: LexCursor::new(sql),
            terminator,
            special: None,
            pushback: Vec::new(),
        }
    }

    /// Attach a dialect lexeme scanner (see [`SpecialScanner`]).
    #[must_use]
    pub fn with_special(mut self, special: SpecialScanner) -> Self {
        self.special = Some(special);
        self
    }

    /// Return the next token, or `None` at end of input.
    pub fn next(&mut self) -> Option<SqlToken> {
        if let Some(token) = self.pushback.pop() {
            return Some(token);
        }

        loop {
            self.cursor.skip_whitespace();
            let ch = self.cursor.peek()?;

            // Comments are skipped as if they were whitespace.
            if ch == '-' && self.cursor.peek_at(1) == Some('-') {
                self.skip_line_comment();
                continue;
            }
            if ch == '/' && self.cursor.peek_at(1) == Some('*') {
                self.skip_block_comment();
                continue;
            }

            if ch == '\'' {
                self.skip_quoted('\'');
                return Some(SqlToken::StringLiteral);
            }
            if ch == '"' {
                self.skip_quoted('"');
                return Some(SqlToken::QuotedIdentifier);
            }

            if let Some(special) = self.special
                && let Some(token) = special(&mut self.cursor)
            {
                return Some(token);
            }

            // The terminator is always its own token, even when it would
            // otherwise be part of a word.
            if ch == self.terminator {
                self.cursor.next();
                return Some(SqlToken::Punct(ch));
            }

            if is_word_char(ch) {
                return Some(self.word());
            }

            self.cursor.next();
            return Some(SqlToken::Punct(ch));
        }
    }

    /// Look at the next token without consuming it.
    pub fn peek(&mut self) -> Option<SqlToken> {
        let token = self.next();
        if let Some(token) = &token {
            self.pushback.push(token.clone());
        }
        token
    }

    /// Push a previously read token back onto the stream.
    pub fn unget(&mut self, token: SqlToken) {
        self.pushback.push(token);
    }

    /// Consume the given keyword sequence if it appears next, case
    /// insensitively. On a mismatch nothing is consumed.
    pub fn skip(&mut self, keywords: &[&str]) -> bool {
        let mut consumed = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            match self.next() {
                Some(token) if token.is_keyword(keyword) => consumed.push(token),
                maybe_token => {
                    if let Some(token) = maybe_token {
                        self.pushback.push(token);
                    }
                    while let Some(token) = consumed.pop() {
                        self.pushback.push(token);
                    }
                    return false;
                }
            }
        }
        true
    }

    fn word(&mut self) -> SqlToken {
        let mut word = String::new();
        while let Some(ch) = self.cursor.peek() {
            if ch == self.terminator || !is_word_char(ch) {
                break;
            }
            word.extend(ch.to_uppercase());
            self.cursor.next();
        }
        SqlToken::Keyword(word)
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.cursor.next() {
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skip `/* ... */`; an unterminated comment consumes to end of input,
    /// which in an interactive shell just means the user is still typing.
    fn skip_block_comment(&mut self) {
        self.cursor.next();
        self.cursor.next();
        while let Some(ch) = self.cursor.next() {
            if ch == '*' && self.cursor.peek() == Some('/') {
                self.cursor.next();
                break;
            }
        }
    }

    /// Skip a quoted region, honoring doubled-quote escapes (`''`, `""`).
    fn skip_quoted(&mut self, quote: char) {
        self.cursor.next();
        while let Some(ch) = self.cursor.next() {
            if ch == quote {
                if self.cursor.peek() == Some(quote) {
                    self.cursor.next();
                } else {
                    break;
                }
            }
        }
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}
