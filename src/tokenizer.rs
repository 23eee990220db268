//! Shell-style command-line tokenizer.
//!
//! Splits a raw input line into [`Token`]s, honoring single/double quoting,
//! backslash escapes, output redirections (`>`, `>>`, `2>file`, `2>&1`,
//! `>+session`), pipes, and the configured statement terminator. Variable
//! references are expanded through an [`Expander`] and backtick command
//! substitution through a [`CommandRunner`].
//!
//! The quoting rules follow POSIX shell behavior: adjacent quoted and
//! unquoted fragments concatenate into a single word, single quotes suppress
//! both escapes and expansion, double quotes allow both.

use std::collections::VecDeque;
use std::fmt;

use crate::cursor::LexCursor;
use crate::expand::{EnvExpander, Expander, expand_variables};
use crate::shell::{CommandRunner, ShellRunner};
use crate::token::{Token, TokenKind};

/// Default field separator used to split backtick output, like `$IFS`.
pub const WHITESPACE_SEPARATOR: &str = " \t\n\r";

/// Classifies a command-line syntax error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// Closing single quote not found.
    UnterminatedSingleQuote,
    /// Closing double quote not found.
    UnterminatedDoubleQuote,
    /// Closing backtick not found.
    UnterminatedBacktick,
    /// Backslash at end of input.
    TrailingEscape,
    /// Redirection with no target filename.
    MissingRedirectTarget,
    /// `>&` not followed by a file descriptor number.
    MissingDupFd,
    /// `|` with nothing after it.
    MissingPipeCommand,
    /// Operator character that cannot start a token (`<`, `&`).
    UnexpectedOperator(char),
    /// Backtick subprocess could not be run.
    CommandFailed { command: String, message: String },
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedSingleQuote => {
                write!(f, "closing single quote not found")
            }
            Self::UnterminatedDoubleQuote => {
                write!(f, "closing double quote not found")
            }
            Self::UnterminatedBacktick => {
                write!(f, "missing closing back-tick (`)")
            }
            Self::TrailingEscape => {
                write!(f, "expected a character following '\\'")
            }
            Self::MissingRedirectTarget => {
                write!(f, "expected a target filename following redirection")
            }
            Self::MissingDupFd => {
                write!(
                    f,
                    "expected a number following file descriptor \
                     duplication token '>&'"
                )
            }
            Self::MissingPipeCommand => {
                write!(f, "expected a command following '|'")
            }
            Self::UnexpectedOperator(ch) => {
                write!(f, "unexpected operator character: {ch}")
            }
            Self::CommandFailed { command, message } => {
                write!(f, "failed to execute: {command}: {message}")
            }
        }
    }
}

/// Error produced while tokenizing a command line.
///
/// Carries the character offset of the offending construct and the full
/// source line, so a driver can point at the problem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at position {offset}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub offset: usize,
    pub line: String,
}

/// Translate backslash escapes in a user-supplied field-separator spec.
///
/// Recognizes `\n`, `\r`, `\t`, and `\s` (the whole whitespace set); any
/// other escaped character is passed through verbatim.
#[must_use]
pub fn unescape_separator(spec: &str) -> String {
    let mut out = String::with_capacity(spec.len());
    let mut chars = spec.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('s') => out.push_str(WHITESPACE_SEPARATOR),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Command-line tokenizer. Construct via [`Tokenizer::builder`].
pub struct Tokenizer {
    cursor: LexCursor,
    line: String,
    expander: Option<Box<dyn Expander>>,
    runner: Box<dyn CommandRunner>,
    expand_backticks: bool,
    field_separator: String,
    retain_double_quotes: bool,
    retain_initial_escape: bool,
    terminator: Option<char>,
    /// Words spliced in by backtick expansion, drained before the cursor
    /// moves again.
    pending: VecDeque<Token>,
    token_count: usize,
}

/// Builder for [`Tokenizer`]. Defaults: environment-variable expansion,
/// backticks enabled through the platform shell, whitespace field separator,
/// leading escape retained on the first token, double quotes stripped, no
/// terminator.
pub struct TokenizerBuilder {
    line: String,
    expander: Option<Box<dyn Expander>>,
    runner: Box<dyn CommandRunner>,
    expand_backticks: bool,
    field_separator: String,
    retain_double_quotes: bool,
    retain_initial_escape: bool,
    terminator: Option<char>,
}

impl TokenizerBuilder {
    fn new(line: String) -> Self {
        Self {
            line,
            expander: Some(Box::new(EnvExpander)),
            runner: Box::new(ShellRunner),
            expand_backticks: true,
            field_separator: WHITESPACE_SEPARATOR.to_string(),
            retain_double_quotes: false,
            retain_initial_escape: true,
            terminator: None,
        }
    }

    /// Use `expander` for `$name` / `${name}` references.
    #[must_use]
    pub fn expander(mut self, expander: impl Expander + 'static) -> Self {
        self.expander = Some(Box::new(expander));
        self
    }

    /// Disable variable expansion entirely.
    #[must_use]
    pub fn no_expansion(mut self) -> Self {
        self.expander = None;
        self
    }

    /// Use `runner` to execute backtick command substitutions.
    #[must_use]
    pub fn runner(mut self, runner: impl CommandRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    /// Enable or disable backtick expansion. When disabled, backticks are
    /// ordinary word characters.
    #[must_use]
    pub const fn expand_backticks(mut self, enabled: bool) -> Self {
        self.expand_backticks = enabled;
        self
    }

    /// Set of characters that split backtick output into words.
    #[must_use]
    pub fn field_separator(mut self, separator: impl Into<String>) -> Self {
        self.field_separator = separator.into();
        self
    }

    /// Keep double-quote characters in emitted words instead of stripping
    /// them. Never applies to redirection filenames.
    #[must_use]
    pub const fn retain_double_quotes(mut self, retain: bool) -> Self {
        self.retain_double_quotes = retain;
        self
    }

    /// Keep a leading backslash on the first token of the line (so a
    /// `\command` convention survives escape processing).
    #[must_use]
    pub const fn retain_initial_escape(mut self, retain: bool) -> Self {
        self.retain_initial_escape = retain;
        self
    }

    /// Recognize `terminator` as a discrete [`TokenKind::Terminator`] token.
    #[must_use]
    pub const fn terminator(mut self, terminator: char) -> Self {
        self.terminator = Some(terminator);
        self
    }

    #[must_use]
    pub fn build(self) -> Tokenizer {
        Tokenizer {
            cursor: LexCursor::new(&self.line),
            line: self.line,
            expander: self.expander,
            runner: self.runner,
            expand_backticks: self.expand_backticks,
            field_separator: self.field_separator,
            retain_double_quotes: self.retain_double_quotes,
            retain_initial_escape: self.retain_initial_escape,
            terminator: self.terminator,
            pending: VecDeque::new(),
            token_count: 0,
        }
    }
}

impl Tokenizer {
    #[must_use]
    pub fn builder(line: impl Into<String>) -> TokenizerBuilder {
        TokenizerBuilder::new(line.into())
    }

    /// Return the next token on the line, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] on unterminated quotes, malformed
    /// redirections, and other structural problems; the line cannot be
    /// parsed further after an error.
    pub fn next(&mut self) -> Result<Option<Token>, SyntaxError> {
        if let Some(token) = self.pending.pop_front() {
            self.token_count += 1;
            return Ok(Some(token));
        }

        self.cursor.skip_whitespace();
        let Some(ch) = self.cursor.peek() else {
            return Ok(None);
        };

        let token = if ch == '>' || self.starts_fd_redirect(ch) {
            self.parse_output_redirect()?
        } else if ch == '|' {
            self.parse_pipe()?
        } else if self.is_terminator(ch) {
            let offset = self.cursor.position();
            self.cursor.next();
            Token::new(TokenKind::Terminator(ch), offset)
        } else if self.expand_backticks && ch == '`' {
            match self.parse_backtick()? {
                Some(token) => token,
                // A backtick producing no output yields no token at all;
                // continue as if it was never there.
                None => return self.next(),
            }
        } else if matches!(ch, '<' | '&') {
            let offset = self.cursor.position();
            return Err(self.error(SyntaxErrorKind::UnexpectedOperator(ch), offset));
        } else {
            self.parse_word()?
        };

        self.token_count += 1;
        Ok(Some(token))
    }

    /// Collect all remaining tokens.
    ///
    /// # Errors
    ///
    /// Propagates the first [`SyntaxError`] encountered.
    pub fn tokens(&mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn error(&self, kind: SyntaxErrorKind, offset: usize) -> SyntaxError {
        SyntaxError {
            kind,
            offset,
            line: self.line.clone(),
        }
    }

    fn is_terminator(&self, ch: char) -> bool {
        self.terminator == Some(ch)
    }

    /// True when a `N>` style redirection starts here. The descriptor must
    /// be a single digit immediately adjacent to the `>`.
    fn starts_fd_redirect(&self, ch: char) -> bool {
        ch.is_ascii_digit() && self.cursor.has_more_than(2) && self.cursor.peek_at(1) == Some('>')
    }

    /// A character that may appear in a bare (unquoted) word.
    fn is_string_character(&self, ch: char) -> bool {
        !(ch.is_whitespace()
            || self.is_terminator(ch)
            || matches!(ch, '\'' | '"' | '|' | '<' | '>' | '&')
            || (self.expand_backticks && ch == '`'))
    }

    fn expand(&self, text: &str) -> String {
        self.expander
            .as_deref()
            .map_or_else(|| text.to_string(), |e| expand_variables(text, e))
    }

    /// Parse a generic word: any run of adjacent unquoted, single-quoted,
    /// and double-quoted fragments.
    fn parse_word(&mut self) -> Result<Token, SyntaxError> {
        let start = self.cursor.position();
        let mut text = String::new();

        while let Some(ch) = self.cursor.peek() {
            if ch == '\\'
                && self.retain_initial_escape
                && self.token_count == 0
                && self.cursor.position() == start
            {
                // Keep the leading escape of the line's first token.
                text.push(ch);
                self.cursor.next();
            } else if ch == '\'' {
                self.single_quoted(&mut text)?;
            } else if ch == '"' {
                let retain = self.retain_double_quotes;
                self.double_quoted(&mut text, retain)?;
            } else if ch == '\\' || self.is_string_character(ch) {
                self.unquoted_run(&mut text)?;
            } else {
                break;
            }
        }

        Ok(Token::new(TokenKind::Word(text), start))
    }

    /// Copy a single-quoted segment verbatim; no escapes, no expansion.
    fn single_quoted(&mut self, out: &mut String) -> Result<(), SyntaxError> {
        let start = self.cursor.position();
        self.cursor.next();

        while let Some(ch) = self.cursor.peek() {
            if ch == '\'' {
                self.cursor.next();
                return Ok(());
            }
            out.push(ch);
            self.cursor.next();
        }

        Err(self.error(SyntaxErrorKind::UnterminatedSingleQuote, start))
    }

    /// Copy a double-quoted segment, honoring backslash escapes and variable
    /// expansion. When `retain` is set the surrounding quotes are kept.
    fn double_quoted(&mut self, out: &mut String, retain: bool) -> Result<(), SyntaxError> {
        let start = self.cursor.position();
        self.cursor.next();

        if retain {
            out.push('"');
        }

        let mut contents = String::new();
        loop {
            match self.cursor.peek() {
                None => {
                    return Err(self.error(SyntaxErrorKind::UnterminatedDoubleQuote, start));
                }
                Some('\\') => self.escape(&mut contents)?,
                Some('"') => {
                    self.cursor.next();
                    break;
                }
                Some(ch) => {
                    contents.push(ch);
                    self.cursor.next();
                }
            }
        }

        out.push_str(&self.expand(&contents));
        if retain {
            out.push('"');
        }
        Ok(())
    }

    /// Consume a run of bare word characters, then expand variables in it.
    fn unquoted_run(&mut self, out: &mut String) -> Result<(), SyntaxError> {
        let mut raw = String::new();
        while let Some(ch) = self.cursor.peek() {
            if ch == '\\' {
                self.escape(&mut raw)?;
            } else if self.is_string_character(ch) {
                raw.push(ch);
                self.cursor.next();
            } else {
                break;
            }
        }
        out.push_str(&self.expand(&raw));
        Ok(())
    }

    /// Consume a backslash escape and append the escaped character.
    fn escape(&mut self, out: &mut String) -> Result<(), SyntaxError> {
        self.cursor.next();
        let offset = self.cursor.position();
        match self.cursor.next() {
            Some(ch) => {
                out.push(ch);
                Ok(())
            }
            None => Err(self.error(SyntaxErrorKind::TrailingEscape, offset)),
        }
    }

    fn parse_pipe(&mut self) -> Result<Token, SyntaxError> {
        let start = self.cursor.position();
        self.cursor.next();
        self.cursor.skip_whitespace();

        if self.cursor.is_at_end() {
            let offset = self.cursor.position();
            return Err(self.error(SyntaxErrorKind::MissingPipeCommand, offset));
        }

        let command = self.cursor.remainder();
        Ok(Token::new(TokenKind::Pipe(command), start))
    }

    /// Parse `[N]>`, `[N]>>`, `[N]>&M`, `>+[S]`, and `>>+[S]` forms.
    fn parse_output_redirect(&mut self) -> Result<Token, SyntaxError> {
        let start = self.cursor.position();

        let mut fd = 1;
        if let Some(digit) = self.cursor.peek().and_then(|c| c.to_digit(10)) {
            fd = digit;
            self.cursor.next();
        }

        self.cursor.next(); // the '>'

        let mut append = false;
        if self.cursor.peek() == Some('>') {
            self.cursor.next();
            append = true;
        } else if self.cursor.peek() == Some('&') {
            self.cursor.next();
            let to = self.parse_descriptor_number()?;
            return Ok(Token::new(TokenKind::FdDup { from: fd, to }, start));
        }

        if self.cursor.peek() == Some('+') {
            self.cursor.next();
            let session = if self.cursor.peek().is_some_and(|c| c.is_ascii_digit()) {
                Some(self.parse_descriptor_number()?)
            } else {
                None
            };
            return Ok(Token::new(
                TokenKind::SessionRedirect { session, append },
                start,
            ));
        }

        // The filename goes through regular word parsing so quoting and
        // expansion apply, but double quotes are never retained in a
        // filename.
        let retain = self.retain_double_quotes;
        self.retain_double_quotes = false;
        let filename_token = self.next();
        self.retain_double_quotes = retain;

        match filename_token? {
            Some(Token {
                kind: TokenKind::Word(filename),
                ..
            }) => Ok(Token::new(
                TokenKind::RedirectOut {
                    fd,
                    filename,
                    append,
                },
                start,
            )),
            _ => {
                let offset = self.cursor.position();
                Err(self.error(SyntaxErrorKind::MissingRedirectTarget, offset))
            }
        }
    }

    /// Consume a file descriptor number, allowing leading whitespace.
    fn parse_descriptor_number(&mut self) -> Result<u32, SyntaxError> {
        let start = self.cursor.position();
        self.cursor.skip_whitespace();

        let mut digits = String::new();
        while let Some(ch) = self.cursor.peek() {
            if !ch.is_ascii_digit() {
                break;
            }
            digits.push(ch);
            self.cursor.next();
        }

        digits
            .parse()
            .map_err(|_| self.error(SyntaxErrorKind::MissingDupFd, start))
    }

    /// Parse a backtick substitution, run the command, and splice its output
    /// into the token stream. Returns `None` when the command produced no
    /// output at all.
    fn parse_backtick(&mut self) -> Result<Option<Token>, SyntaxError> {
        let start = self.cursor.position();
        self.cursor.next();
        self.cursor.skip_whitespace();

        let mut command = String::new();
        let mut closed = false;
        while let Some(ch) = self.cursor.peek() {
            match ch {
                '\'' => {
                    // Keep the quotes so the subshell sees them, but the
                    // contents stay unexpanded.
                    command.push('\'');
                    self.single_quoted(&mut command)?;
                    command.push('\'');
                }
                '\\' => self.escape(&mut command)?,
                '"' => self.double_quoted(&mut command, true)?,
                '`' => {
                    self.cursor.next();
                    closed = true;
                    break;
                }
                _ => {
                    if ch.is_whitespace() || !self.is_string_character(ch) {
                        command.push(ch);
                        self.cursor.next();
                    } else {
                        self.unquoted_run(&mut command)?;
                    }
                }
            }
        }

        if !closed {
            return Err(self.error(SyntaxErrorKind::UnterminatedBacktick, start));
        }

        log::debug!("backtick substitution: {command:?}");
        let output = self.runner.run(&command).map_err(|e| {
            self.error(
                SyntaxErrorKind::CommandFailed {
                    command: command.clone(),
                    message: e.to_string(),
                },
                start,
            )
        })?;

        for field in split_fields(&output, &self.field_separator) {
            self.pending
                .push_back(Token::new(TokenKind::Word(field), start));
        }

        Ok(self.pending.pop_front())
    }
}

/// Split subprocess output on the field-separator set, dropping empty
/// fields. Trailing newlines on the final field are stripped, so `echo x`
/// yields `x`, and output that is nothing but separators yields no fields.
fn split_fields(output: &str, separator: &str) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();

    for ch in output.chars() {
        if separator.contains(ch) {
            if !field.is_empty() {
                fields.push(std::mem::take(&mut field));
            }
        } else {
            field.push(ch);
        }
    }
    if !field.is_empty() {
        fields.push(field);
    }

    if let Some(last) = fields.last_mut() {
        while last.ends_with('\n') || last.ends_with('\r') {
            last.pop();
        }
        if last.is_empty() {
            fields.pop();
        }
    }

    fields
}
