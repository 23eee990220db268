//! Snowflake dialect: scripting-block-aware terminator analysis.
//!
//! Snowflake Scripting allows blocks of statements that are themselves
//! terminated (`BEGIN ... ; ... END;`), so a semicolon inside a procedure
//! body must not end the batch. Blocks appear in two places: an anonymous
//! block as the very first statement (`DECLARE`/`BEGIN`), or the body of a
//! `CREATE PROCEDURE ... AS BEGIN ... END`. The analyzer recognizes those
//! entry points and runs a block-matching scan; everything else falls back
//! to "first bare terminator ends the batch".

use crate::analyzer::Analyzer;
use crate::cursor::LexCursor;
use crate::keyword::{KeywordTokenizer, SqlToken};

/// A procedural construct currently open during the block scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    /// `CASE [expr] WHEN ... END [CASE]`
    Case,
    /// `IF (...) ... END IF`
    If,
    /// `FOR/WHILE ... DO ... END FOR|WHILE`
    Do,
    /// `[FOR/WHILE] LOOP ... END LOOP`
    Loop,
    /// `REPEAT ... END REPEAT`
    Repeat,
    /// `BEGIN ... END`
    Block,
}

/// Terminator analyzer for Snowflake SQL and Snowflake Scripting.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnowflakeAnalyzer;

impl Analyzer for SnowflakeAnalyzer {
    fn name(&self) -> &'static str {
        "Snowflake"
    }

    fn is_terminated(&self, batch: &str, terminator: char) -> bool {
        let mut tokenizer = snowflake_tokenizer(batch, terminator);

        // An anonymous block can only be the first statement of the batch.
        if tokenizer
            .peek()
            .is_some_and(|t| t.is_keyword("DECLARE") || t.is_keyword("BEGIN"))
            && !seek_to_end_of_block(&mut tokenizer, terminator)
        {
            return false;
        }

        while let Some(token) = tokenizer.peek() {
            if token.is_keyword("CREATE") {
                // A scripting block can appear in a procedure body.
                skip_create(&mut tokenizer, terminator);
            } else if token.is_punct(terminator) {
                // First bare terminator ends the batch; whatever follows
                // is irrelevant.
                return true;
            } else {
                tokenizer.next();
            }
        }

        false
    }
}

/// Keyword tokenizer extended with Snowflake lexemes: `$name` variables and
/// `$$ ... $$` here-documents.
fn snowflake_tokenizer(batch: &str, terminator: char) -> KeywordTokenizer {
    KeywordTokenizer::new(batch, terminator).with_special(scan_dollar_lexeme)
}

fn scan_dollar_lexeme(cursor: &mut LexCursor) -> Option<SqlToken> {
    if cursor.peek() != Some('$') {
        return None;
    }
    cursor.next();

    if cursor.peek() == Some('$') {
        cursor.next();
        skip_here_document(cursor);
        return Some(SqlToken::StringLiteral);
    }

    while let Some(ch) = cursor.peek() {
        if !ch.is_alphanumeric() && ch != '_' {
            break;
        }
        cursor.next();
    }
    Some(SqlToken::Variable)
}

/// Consume up to and including the closing `$$`. An unterminated here
/// document consumes to end of input; the user is still typing it.
fn skip_here_document(cursor: &mut LexCursor) {
    let mut prev = ' ';
    while let Some(ch) = cursor.next() {
        if ch == '$' && prev == '$' {
            return;
        }
        prev = ch;
    }
}

/// Skip over a `CREATE [OR REPLACE] [SECURE] [TEMP|TEMPORARY]
/// {FUNCTION|PROCEDURE}` statement, descending into the procedure body when
/// it is an SQL scripting block. Function bodies cannot contain naked
/// blocks today, so they need no special handling.
fn skip_create(tokenizer: &mut KeywordTokenizer, terminator: char) {
    tokenizer.next(); // the CREATE keyword

    tokenizer.skip(&["OR", "REPLACE"]);
    tokenizer.skip(&["SECURE"]);
    if !tokenizer.skip(&["TEMP"]) {
        tokenizer.skip(&["TEMPORARY"]);
    }

    let Some(token) = tokenizer.next() else {
        return;
    };
    if !token.is_keyword("PROCEDURE") {
        tokenizer.unget(token);
        return;
    }

    // Scan forward for the body-introducing AS clause, watching for an
    // EXECUTE AS <principal> clause (whose AS is not the body) and a
    // LANGUAGE qualifier. Language defaults to SQL when unstated.
    let mut language_sql = true;
    let mut found_as = false;
    let mut token = tokenizer.next();
    while let Some(current) = token {
        if current.is_keyword("EXECUTE") {
            if tokenizer.peek().is_some_and(|t| t.is_keyword("AS")) {
                tokenizer.next();
            }
            token = tokenizer.next();
        } else if current.is_keyword("LANGUAGE") {
            language_sql = tokenizer.next().is_some_and(|t| t.is_keyword("SQL"));
            token = tokenizer.next();
        } else if current.is_keyword("AS") {
            found_as = true;
            break;
        } else {
            token = tokenizer.next();
        }
    }

    if !found_as || !language_sql {
        return;
    }

    if tokenizer
        .peek()
        .is_some_and(|t| t.is_keyword("DECLARE") || t.is_keyword("BEGIN"))
    {
        seek_to_end_of_block(tokenizer, terminator);
    }
}

/// Scan forward until the block that starts at the cursor is closed.
///
/// Returns true when the block completed (or no block ever opened and a
/// bare terminator was reached, which is pushed back for the caller);
/// false when end of input arrived with constructs still open.
fn seek_to_end_of_block(tokenizer: &mut KeywordTokenizer, terminator: char) -> bool {
    let mut stack: Vec<BlockKind> = Vec::new();

    while let Some(token) = tokenizer.next() {
        if token.is_punct(terminator) && stack.is_empty() {
            // Nothing opened a block (e.g. BEGIN TRANSACTION), so this
            // terminator is significant. Leave it for the caller.
            tokenizer.unget(token);
            return true;
        }

        let SqlToken::Keyword(word) = &token else {
            continue;
        };
        match word.as_str() {
            "CREATE" => skip_create(tokenizer, terminator),
            // CASE [ (expr) ] WHEN ... END [CASE]
            "CASE" => {
                if is_case_when(tokenizer) {
                    stack.push(BlockKind::Case);
                }
            }
            "BEGIN" => {
                if is_begin_block(tokenizer) {
                    stack.push(BlockKind::Block);
                }
            }
            "IF" => {
                // Require a parenthesized condition; a bare IF is
                // something else (a function, an alias).
                if skip_paren_expression(tokenizer) {
                    stack.push(BlockKind::If);
                }
            }
            "DO" => stack.push(BlockKind::Do),
            "LOOP" => stack.push(BlockKind::Loop),
            "REPEAT" => stack.push(BlockKind::Repeat),
            "END" => {
                if let Some(&top) = stack.last() {
                    let closed = match top {
                        BlockKind::Case => is_end_case(tokenizer),
                        BlockKind::If => follows_keyword(tokenizer, "IF"),
                        BlockKind::Repeat => follows_keyword(tokenizer, "REPEAT"),
                        BlockKind::Block => is_end_block(tokenizer),
                        BlockKind::Do => is_end_do(tokenizer),
                        BlockKind::Loop => follows_keyword(tokenizer, "LOOP"),
                    };
                    // A non-matching END leaves the stack alone rather
                    // than guessing.
                    if closed {
                        stack.pop();
                        if stack.is_empty() {
                            return true;
                        }
                    }
                }
            }
            "DECLARE" => {
                // DECLARE must eventually be followed by a real BEGIN;
                // until then we are inside the declaration section.
                if !seek_begin(tokenizer) {
                    return false;
                }
            }
            _ => {}
        }
    }

    stack.is_empty()
}

/// Consume a balanced parenthesized expression. Returns false without
/// consuming anything when the next token is not `(`.
fn skip_paren_expression(tokenizer: &mut KeywordTokenizer) -> bool {
    let Some(token) = tokenizer.next() else {
        return false;
    };
    if !token.is_punct('(') {
        tokenizer.unget(token);
        return false;
    }

    let mut depth = 1usize;
    while let Some(token) = tokenizer.next() {
        if token.is_punct('(') {
            depth += 1;
        } else if token.is_punct(')') {
            depth -= 1;
            if depth == 0 {
                return true;
            }
        }
    }

    false
}

/// Only `CASE [ (expr) ] WHEN` opens a block; a CASE expression over a
/// column does not.
fn is_case_when(tokenizer: &mut KeywordTokenizer) -> bool {
    skip_paren_expression(tokenizer);
    follows_keyword(tokenizer, "WHEN")
}

/// `BEGIN [ WORK | TRANSACTION ] [ NAME ... ]` is transaction control, not
/// a block.
fn is_begin_block(tokenizer: &mut KeywordTokenizer) -> bool {
    !tokenizer.peek().is_some_and(|t| {
        t.is_keyword("TRANSACTION") || t.is_keyword("WORK") || t.is_keyword("NAME")
    })
}

/// END [CASE]
fn is_end_case(tokenizer: &mut KeywordTokenizer) -> bool {
    if tokenizer.peek().is_some_and(|t| t.is_keyword("CASE")) {
        tokenizer.next();
    }
    true
}

/// A bare END closes a generic block only when not followed by a closer
/// that belongs to another block kind.
fn is_end_block(tokenizer: &mut KeywordTokenizer) -> bool {
    !tokenizer.peek().is_some_and(|t| {
        t.is_keyword("IF") || t.is_keyword("CASE") || t.is_keyword("FOR") || t.is_keyword("LOOP")
    })
}

/// END FOR / END WHILE
fn is_end_do(tokenizer: &mut KeywordTokenizer) -> bool {
    if tokenizer
        .peek()
        .is_some_and(|t| t.is_keyword("FOR") || t.is_keyword("WHILE"))
    {
        tokenizer.next();
        return true;
    }
    false
}

fn follows_keyword(tokenizer: &mut KeywordTokenizer, keyword: &str) -> bool {
    if tokenizer.peek().is_some_and(|t| t.is_keyword(keyword)) {
        tokenizer.next();
        return true;
    }
    false
}

/// Scan forward for a genuine block-opening BEGIN (not BEGIN TRANSACTION).
/// Leaves the BEGIN on the stream when found.
fn seek_begin(tokenizer: &mut KeywordTokenizer) -> bool {
    while let Some(token) = tokenizer.next() {
        if token.is_keyword("BEGIN") && is_begin_block(tokenizer) {
            tokenizer.unget(token);
            return true;
        }
    }
    false
}
