//! Batch terminator analysis.
//!
//! A read loop collects SQL text line by line; after each line it asks the
//! active [`Analyzer`] whether the accumulated batch is terminated. "Not
//! terminated" is a normal outcome that means "keep collecting input" —
//! analyzers never fail, whatever the input looks like.

use crate::keyword::KeywordTokenizer;
use crate::snowflake::SnowflakeAnalyzer;

/// Decides whether a batch of SQL text is complete.
pub trait Analyzer {
    /// Human-readable dialect name.
    fn name(&self) -> &'static str;

    /// True when `terminator` appears in `batch` outside any string,
    /// comment, or procedural block context that would hide it.
    fn is_terminated(&self, batch: &str, terminator: char) -> bool;
}

/// Generic ANSI SQL analyzer, the default when nothing dialect-specific is
/// available. The batch is terminated when the terminator is the last
/// structural token: the keyword tokenizer already guarantees it is not
/// buried in a literal, identifier, or comment.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiAnalyzer;

impl Analyzer for AnsiAnalyzer {
    fn name(&self) -> &'static str {
        "ANSI SQL"
    }

    fn is_terminated(&self, batch: &str, terminator: char) -> bool {
        let mut tokenizer = KeywordTokenizer::new(batch, terminator);

        let mut last = None;
        while let Some(token) = tokenizer.next() {
            last = Some(token);
        }

        last.is_some_and(|token| token.is_punct(terminator))
    }
}

/// Analyzer that never reports termination; for drivers that dispatch
/// batches explicitly rather than on a terminator character.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAnalyzer;

impl Analyzer for NullAnalyzer {
    fn name(&self) -> &'static str {
        "none"
    }

    fn is_terminated(&self, _batch: &str, _terminator: char) -> bool {
        false
    }
}

/// Look up an analyzer by name, as selected at connection setup.
#[must_use]
pub fn analyzer_for(name: &str) -> Option<Box<dyn Analyzer>> {
    match name.to_ascii_lowercase().as_str() {
        "ansi" => Some(Box::new(AnsiAnalyzer)),
        "snowflake" => Some(Box::new(SnowflakeAnalyzer)),
        "none" | "null" => Some(Box::new(NullAnalyzer)),
        _ => None,
    }
}
