//! Command-line tokenization and SQL batch terminator analysis for
//! interactive SQL shells.
//!
//! Two engines back a SQL shell's read loop:
//!
//! - [`Tokenizer`] splits a raw command line into shell-style tokens
//!   (words, redirections, fd-duplications, pipes, terminators), honoring
//!   quoting and escaping rules and performing `$variable` and
//!   `` `backtick` `` expansion through pluggable collaborators.
//! - [`Analyzer`] implementations decide whether an accumulated SQL batch
//!   is terminated, skipping terminators hidden in strings, comments, and
//!   (for [`SnowflakeAnalyzer`]) procedural `BEGIN ... END` blocks.
//!
//! # Tokenize a command line
//!
//! ```
//! use sqlsh_rs::{MapExpander, TokenKind, Tokenizer};
//!
//! let mut tokenizer = Tokenizer::builder("\\connect $db >log.txt;")
//!     .expander(MapExpander::new().with("db", "orders"))
//!     .terminator(';')
//!     .build();
//!
//! let tokens = tokenizer.tokens().unwrap();
//! let kinds: Vec<TokenKind> = tokens.into_iter().map(|t| t.kind).collect();
//! assert_eq!(kinds, vec![
//!     TokenKind::Word("\\connect".into()),
//!     TokenKind::Word("orders".into()),
//!     TokenKind::RedirectOut { fd: 1, filename: "log.txt".into(), append: false },
//!     TokenKind::Terminator(';'),
//! ]);
//! ```
//!
//! # Decide when a batch is complete
//!
//! ```
//! use sqlsh_rs::{Analyzer, SnowflakeAnalyzer};
//!
//! let analyzer = SnowflakeAnalyzer;
//! assert!(!analyzer.is_terminated("BEGIN SELECT 1; END", ';'));
//! assert!(analyzer.is_terminated("BEGIN SELECT 1; END;", ';'));
//! assert!(!analyzer.is_terminated("select 'not yet;'", ';'));
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod analyzer;
pub mod cursor;
pub mod expand;
pub mod keyword;
pub mod shell;
pub mod snowflake;
pub mod token;
pub mod tokenizer;

pub use analyzer::{Analyzer, AnsiAnalyzer, NullAnalyzer, analyzer_for};
pub use cursor::LexCursor;
pub use expand::{EnvExpander, Expander, MapExpander, expand_variables};
pub use keyword::{KeywordTokenizer, SpecialScanner, SqlToken};
pub use shell::{CommandRunner, ShellRunner};
pub use snowflake::SnowflakeAnalyzer;
pub use token::{Token, TokenKind};
pub use tokenizer::{
    SyntaxError, SyntaxErrorKind, Tokenizer, TokenizerBuilder, WHITESPACE_SEPARATOR,
    unescape_separator,
};
