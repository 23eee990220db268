use std::fmt;

/// Token kinds produced by the command-line [`Tokenizer`](crate::Tokenizer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A plain word, after quote removal and variable expansion.
    Word(String),
    /// Output redirection: `>file`, `>>file`, `2>file`.
    RedirectOut {
        fd: u32,
        filename: String,
        append: bool,
    },
    /// File descriptor duplication: `2>&1`.
    FdDup { from: u32, to: u32 },
    /// Pipe: everything after `|`, unprocessed.
    Pipe(String),
    /// Session redirection: `>+`, `>>+2`.
    SessionRedirect { session: Option<u32>, append: bool },
    /// The configured statement terminator character.
    Terminator(char),
}

/// A single command-line token and the character offset at which it started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

impl Token {
    #[must_use]
    pub const fn new(kind: TokenKind, offset: usize) -> Self {
        Self { kind, offset }
    }

    /// The word text, if this token is a [`TokenKind::Word`].
    #[must_use]
    pub fn word(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Word(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Word(text) => write!(f, "{text}"),
            Self::RedirectOut {
                fd,
                filename,
                append,
            } => {
                write!(f, "{fd}{}{filename}", if *append { ">>" } else { ">" })
            }
            Self::FdDup { from, to } => write!(f, "{from}>&{to}"),
            Self::Pipe(command) => write!(f, "| {command}"),
            Self::SessionRedirect { session, append } => {
                write!(f, "{}+", if *append { ">>" } else { ">" })?;
                if let Some(id) = session {
                    write!(f, "{id}")?;
                }
                Ok(())
            }
            Self::Terminator(ch) => write!(f, "{ch}"),
        }
    }
}
