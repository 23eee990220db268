//! Command-line tokenizer behaviour: quoting, expansion, redirection,
//! pipes, terminators, and error cases.

use sqlsh_rs::{
    CommandRunner, MapExpander, SyntaxErrorKind, TokenKind, Tokenizer, TokenizerBuilder,
};

// -----------------------------------------------------------
// Helpers.
// -----------------------------------------------------------

/// Runner with a canned reply, asserting on the command it was given.
struct FakeRunner {
    expect: &'static str,
    output: &'static str,
}

impl CommandRunner for FakeRunner {
    fn run(&self, command: &str) -> std::io::Result<String> {
        assert_eq!(command, self.expect, "unexpected backtick command");
        Ok(self.output.to_string())
    }
}

fn builder(line: &str) -> TokenizerBuilder {
    Tokenizer::builder(line).no_expansion().terminator(';')
}

fn kinds(mut tokenizer: Tokenizer) -> Vec<TokenKind> {
    tokenizer
        .tokens()
        .expect("tokenize")
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn word(text: &str) -> TokenKind {
    TokenKind::Word(text.to_string())
}

fn redirect(filename: &str, append: bool) -> TokenKind {
    TokenKind::RedirectOut {
        fd: 1,
        filename: filename.to_string(),
        append,
    }
}

fn redirect_fd(fd: u32, filename: &str, append: bool) -> TokenKind {
    TokenKind::RedirectOut {
        fd,
        filename: filename.to_string(),
        append,
    }
}

// -----------------------------------------------------------
// Words and quoting.
// -----------------------------------------------------------

#[test]
fn basic_words_and_terminator() {
    let tokens = kinds(
        builder("\\echo one two 'the number three' \"the number four\";").build(),
    );
    assert_eq!(tokens, vec![
        word("\\echo"),
        word("one"),
        word("two"),
        word("the number three"),
        word("the number four"),
        TokenKind::Terminator(';'),
    ]);
}

#[test]
fn leading_whitespace_is_skipped() {
    let tokens = kinds(builder("   \\echo one      two").build());
    assert_eq!(tokens, vec![word("\\echo"), word("one"), word("two")]);
}

#[test]
fn adjacent_fragments_concatenate() {
    let tokens = kinds(builder("this' is a '\"single\"\\ string").build());
    assert_eq!(tokens, vec![word("this is a single string")]);
}

#[test]
fn tokens_carry_offsets() {
    let mut tokenizer = builder("one  two").build();
    let tokens = tokenizer.tokens().expect("tokenize");
    assert_eq!(tokens[0].offset, 0);
    assert_eq!(tokens[1].offset, 5);
}

#[test]
fn retain_double_quotes() {
    let tokens = kinds(
        builder("word1 word2 \"a couple of words\" word3")
            .retain_double_quotes(true)
            .build(),
    );
    assert_eq!(tokens, vec![
        word("word1"),
        word("word2"),
        word("\"a couple of words\""),
        word("word3"),
    ]);
}

#[test]
fn retain_double_quotes_mid_word() {
    let tokens = kinds(
        builder("this' is a '\"single\"\\ string")
            .retain_double_quotes(true)
            .build(),
    );
    assert_eq!(tokens, vec![word("this is a \"single\" string")]);
}

#[test]
fn initial_escape_is_kept_only_on_first_token() {
    let tokens = kinds(builder("\\the\\ command \\x").build());
    assert_eq!(tokens, vec![word("\\the command"), word("x")]);
}

#[test]
fn initial_escape_retention_can_be_disabled() {
    let tokens = kinds(builder("\\echo one").retain_initial_escape(false).build());
    assert_eq!(tokens, vec![word("echo"), word("one")]);
}

#[test]
fn unterminated_single_quote_errors() {
    let err = builder("\\echo 'oops")
        .build()
        .tokens()
        .expect_err("should fail");
    assert_eq!(err.kind, SyntaxErrorKind::UnterminatedSingleQuote);
    assert_eq!(err.offset, 6);
    assert_eq!(err.line, "\\echo 'oops");
}

#[test]
fn unterminated_double_quote_errors() {
    let err = builder("say \"half")
        .build()
        .tokens()
        .expect_err("should fail");
    assert_eq!(err.kind, SyntaxErrorKind::UnterminatedDoubleQuote);
}

#[test]
fn stray_operator_errors() {
    let err = builder("\\echo & done")
        .build()
        .tokens()
        .expect_err("should fail");
    assert_eq!(err.kind, SyntaxErrorKind::UnexpectedOperator('&'));
}

// -----------------------------------------------------------
// Variable expansion.
// -----------------------------------------------------------

fn expander() -> MapExpander {
    MapExpander::new()
        .with("a", "value a")
        .with("b", "value b")
        .with("x", "this is $x")
        .with("y", "this is $y")
        .with("z", "z is not expanded")
}

#[test]
fn variable_expansion_follows_quoting() {
    let tokens = kinds(
        Tokenizer::builder("\\echo literal $x \"text: $y\" 'text: $z' ${a}${b};")
            .expander(expander())
            .terminator(';')
            .build(),
    );
    assert_eq!(tokens, vec![
        word("\\echo"),
        word("literal"),
        word("this is $x"),
        word("text: this is $y"),
        word("text: $z"),
        word("value avalue b"),
        TokenKind::Terminator(';'),
    ]);
}

#[test]
fn expanded_value_becomes_part_of_word() {
    // A variable expanding to a digit does not become a redirection fd.
    let tokens = kinds(
        Tokenizer::builder("\\echo hello $x> \"error file\".tmp")
            .expander(MapExpander::new().with("x", "2"))
            .terminator(';')
            .build(),
    );
    assert_eq!(tokens, vec![
        word("\\echo"),
        word("hello"),
        word("2"),
        redirect("error file.tmp", false),
    ]);
}

// -----------------------------------------------------------
// Output redirection.
// -----------------------------------------------------------

#[test]
fn redirect_overwrite_and_append() {
    for (redir, append) in [(">", false), (">>", true)] {
        let tokens = kinds(builder(&format!("\\echo hello {redir}file.tmp")).build());
        assert_eq!(tokens, vec![
            word("\\echo"),
            word("hello"),
            redirect("file.tmp", append),
        ]);

        let tokens = kinds(builder(&format!("\\echo hello {redir} file.tmp wowsers")).build());
        assert_eq!(tokens, vec![
            word("\\echo"),
            word("hello"),
            redirect("file.tmp", append),
            word("wowsers"),
        ]);

        let tokens = kinds(builder(&format!("\\echo hello {redir} \"file name\".tmp")).build());
        assert_eq!(tokens, vec![
            word("\\echo"),
            word("hello"),
            redirect("file name.tmp", append),
        ]);

        let tokens = kinds(builder(&format!("\\echo hello 2{redir} \"error file\".tmp")).build());
        assert_eq!(tokens, vec![
            word("\\echo"),
            word("hello"),
            redirect_fd(2, "error file.tmp", append),
        ]);

        // The fd must be immediately adjacent to the redirect.
        let tokens = kinds(builder(&format!("\\echo hello 2 {redir} f.tmp")).build());
        assert_eq!(tokens, vec![
            word("\\echo"),
            word("hello"),
            word("2"),
            redirect("f.tmp", append),
        ]);

        // Fds are single digits: "992>" is word(992) then a plain redirect.
        let tokens = kinds(builder(&format!("\\echo hello 992{redir} f.tmp")).build());
        assert_eq!(tokens, vec![
            word("\\echo"),
            word("hello"),
            word("992"),
            redirect("f.tmp", append),
        ]);

        let err = builder(&format!("\\echo hello {redir}"))
            .build()
            .tokens()
            .expect_err("missing filename");
        assert_eq!(err.kind, SyntaxErrorKind::MissingRedirectTarget);

        // The target must be a filename, not another operator.
        let err = builder(&format!("\\echo hello {redir} >"))
            .build()
            .tokens()
            .expect_err("missing filename");
        assert_eq!(err.kind, SyntaxErrorKind::MissingRedirectTarget);
    }
}

#[test]
fn redirect_filename_never_retains_quotes() {
    let tokens = kinds(
        builder("\\echo \"hi there!\" >\"filename.txt\"")
            .retain_double_quotes(true)
            .build(),
    );
    assert_eq!(tokens, vec![
        word("\\echo"),
        word("\"hi there!\""),
        redirect("filename.txt", false),
    ]);
}

#[test]
fn fd_duplication() {
    let tokens = kinds(builder("\\echo hello 2>&1 word").build());
    assert_eq!(tokens, vec![
        word("\\echo"),
        word("hello"),
        TokenKind::FdDup { from: 2, to: 1 },
        word("word"),
    ]);

    let tokens = kinds(builder("\\echo hello >&2").build());
    assert_eq!(tokens, vec![
        word("\\echo"),
        word("hello"),
        TokenKind::FdDup { from: 1, to: 2 },
    ]);

    let tokens = kinds(builder("\\echo hello 992>&2").build());
    assert_eq!(tokens, vec![
        word("\\echo"),
        word("hello"),
        word("992"),
        TokenKind::FdDup { from: 1, to: 2 },
    ]);

    for line in ["\\echo hello 2>&", "\\echo hello 2>& hello"] {
        let err = builder(line).build().tokens().expect_err("missing fd");
        assert_eq!(err.kind, SyntaxErrorKind::MissingDupFd);
    }
}

#[test]
fn session_redirection() {
    let tokens = kinds(builder("\\echo hi >+").build());
    assert_eq!(tokens, vec![
        word("\\echo"),
        word("hi"),
        TokenKind::SessionRedirect {
            session: None,
            append: false
        },
    ]);

    let tokens = kinds(builder("\\echo hi >>+2").build());
    assert_eq!(tokens, vec![
        word("\\echo"),
        word("hi"),
        TokenKind::SessionRedirect {
            session: Some(2),
            append: true
        },
    ]);
}

// -----------------------------------------------------------
// Pipes and terminators.
// -----------------------------------------------------------

#[test]
fn pipe_takes_rest_of_line_verbatim() {
    let tokens = kinds(
        builder("\\echo blah blah 2>/tmp/error.txt | grep blah | tr a-z A-Z >/other/file.txt")
            .build(),
    );
    assert_eq!(tokens, vec![
        word("\\echo"),
        word("blah"),
        word("blah"),
        redirect_fd(2, "/tmp/error.txt", false),
        TokenKind::Pipe("grep blah | tr a-z A-Z >/other/file.txt".to_string()),
    ]);
}

#[test]
fn pipe_without_command_errors() {
    let err = builder("\\echo hi |   ")
        .build()
        .tokens()
        .expect_err("missing command");
    assert_eq!(err.kind, SyntaxErrorKind::MissingPipeCommand);
}

#[test]
fn custom_terminator_character() {
    let tokens = kinds(Tokenizer::builder("a b , c").no_expansion().terminator(',').build());
    assert_eq!(tokens, vec![
        word("a"),
        word("b"),
        TokenKind::Terminator(','),
        word("c"),
    ]);
}

#[test]
fn word_character_as_terminator() {
    let tokens = kinds(Tokenizer::builder("abc").no_expansion().terminator('b').build());
    assert_eq!(tokens, vec![
        word("a"),
        TokenKind::Terminator('b'),
        word("c"),
    ]);
}

#[test]
fn no_terminator_configured() {
    let tokens = kinds(Tokenizer::builder("select 1;").no_expansion().build());
    assert_eq!(tokens, vec![word("select"), word("1;")]);
}

// -----------------------------------------------------------
// Backtick command substitution.
// -----------------------------------------------------------

#[test]
fn backtick_output_is_split_into_words() {
    let tokens = kinds(
        builder("\\echo one two `echo three \"four      five\"` six")
            .runner(FakeRunner {
                expect: "echo three \"four      five\"",
                output: "three four      five\n",
            })
            .build(),
    );
    assert_eq!(tokens, vec![
        word("\\echo"),
        word("one"),
        word("two"),
        word("three"),
        word("four"),
        word("five"),
        word("six"),
    ]);
}

#[test]
fn backtick_quoting_and_expansion() {
    let tokens = kinds(
        Tokenizer::builder("\\echo one `echo $a \"$x\" '${y}__foo'` six")
            .expander(
                MapExpander::new()
                    .with("a", "eh eh?")
                    .with("x", "1   2     3")
                    .with("y", "not expanded"),
            )
            .terminator(';')
            .runner(FakeRunner {
                expect: "echo eh eh? \"1   2     3\" '${y}__foo'",
                output: "eh eh? 1   2     3 ${y}__foo\n",
            })
            .build(),
    );
    assert_eq!(tokens, vec![
        word("\\echo"),
        word("one"),
        word("eh"),
        word("eh?"),
        word("1"),
        word("2"),
        word("3"),
        word("${y}__foo"),
        word("six"),
    ]);
}

#[test]
fn backtick_empty_output_yields_no_token() {
    let tokens = kinds(
        builder("\\echo one `quiet` b")
            .runner(FakeRunner {
                expect: "quiet",
                output: "",
            })
            .build(),
    );
    assert_eq!(tokens, vec![word("\\echo"), word("one"), word("b")]);
}

#[test]
fn backtick_custom_field_separator() {
    let tokens = kinds(
        builder("\\echo `list`")
            .field_separator(":")
            .runner(FakeRunner {
                expect: "list",
                output: "a:b:c\n",
            })
            .build(),
    );
    assert_eq!(tokens, vec![word("\\echo"), word("a"), word("b"), word("c")]);

    // Without the custom separator the colons stay in one word.
    let tokens = kinds(
        builder("\\echo `list`")
            .runner(FakeRunner {
                expect: "list",
                output: "a:b:c\n",
            })
            .build(),
    );
    assert_eq!(tokens, vec![word("\\echo"), word("a:b:c")]);
}

#[test]
fn backtick_disabled_is_plain_text() {
    let tokens = kinds(builder("\\echo one `echo a b c` six").expand_backticks(false).build());
    assert_eq!(tokens, vec![
        word("\\echo"),
        word("one"),
        word("`echo"),
        word("a"),
        word("b"),
        word("c`"),
        word("six"),
    ]);
}

#[test]
fn backtick_unterminated_errors() {
    let err = builder("\\echo `oops")
        .build()
        .tokens()
        .expect_err("should fail");
    assert_eq!(err.kind, SyntaxErrorKind::UnterminatedBacktick);
}

#[test]
#[cfg(unix)]
fn backtick_through_real_shell() {
    // Default runner goes through /bin/sh.
    let tokens = kinds(builder("\\echo `echo hello   world`").build());
    assert_eq!(tokens, vec![word("\\echo"), word("hello"), word("world")]);

    let tokens = kinds(builder("\\echo one `echo a >/dev/null` b").build());
    assert_eq!(tokens, vec![word("\\echo"), word("one"), word("b")]);
}

// -----------------------------------------------------------
// Idempotence.
// -----------------------------------------------------------

#[test]
fn tokenizing_twice_gives_identical_streams() {
    let line = "\\select 'a b' \"c $d\" >out.txt 2>&1;";
    let first = builder(line).build().tokens().expect("tokenize");
    let second = builder(line).build().tokens().expect("tokenize");
    assert_eq!(first, second);
}
