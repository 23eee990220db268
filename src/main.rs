//! CLI tool to inspect command-line tokenization and batch splitting.

use std::fs;
use std::process::ExitCode;

use sqlsh_rs::{Analyzer, Tokenizer, analyzer_for};

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        eprintln!("Usage: sqlsh <command> [options] [files...]");
        eprintln!();
        eprintln!("Commands:");
        eprintln!("  tokens  Tokenize each line of the input files");
        eprintln!("  split   Split input files into terminated SQL batches");
        eprintln!();
        eprintln!("Options:");
        eprintln!("  --analyzer=<ansi|snowflake|none>  batch analyzer (default ansi)");
        eprintln!("  --terminator=<char>               terminator character (default ;)");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  sqlsh tokens script.sqsh");
        eprintln!("  sqlsh split --analyzer=snowflake procs.sql");
        return ExitCode::from(2);
    }

    let command = args[1].as_str();
    let mut analyzer_name = "ansi".to_string();
    let mut terminator = ';';
    let mut files = Vec::new();

    for arg in &args[2..] {
        if let Some(name) = arg.strip_prefix("--analyzer=") {
            analyzer_name = name.to_string();
        } else if let Some(spec) = arg.strip_prefix("--terminator=") {
            let mut chars = spec.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => terminator = ch,
                _ => {
                    eprintln!("Error: terminator must be a single character: {spec:?}");
                    return ExitCode::from(2);
                }
            }
        } else {
            files.push(arg.as_str());
        }
    }

    if files.is_empty() {
        eprintln!("Error: no files specified");
        return ExitCode::from(2);
    }

    let Some(analyzer) = analyzer_for(&analyzer_name) else {
        eprintln!("Error: unknown analyzer: {analyzer_name}");
        return ExitCode::from(2);
    };

    let mut had_error = false;

    for path in files {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{path}: {e}");
                had_error = true;
                continue;
            }
        };

        match command {
            "tokens" => {
                if !print_tokens(path, &content, terminator) {
                    had_error = true;
                }
            }
            "split" => print_batches(&content, analyzer.as_ref(), terminator),
            _ => {
                eprintln!("Unknown command: {command}");
                return ExitCode::from(2);
            }
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Tokenize each line and print one token per output line.
fn print_tokens(path: &str, content: &str, terminator: char) -> bool {
    let mut ok = true;
    for (lineno, line) in content.lines().enumerate() {
        let mut tokenizer = Tokenizer::builder(line).terminator(terminator).build();
        match tokenizer.tokens() {
            Ok(tokens) => {
                for token in tokens {
                    println!("{}:{}: {:?}", lineno + 1, token.offset, token.kind);
                }
            }
            Err(e) => {
                eprintln!("{path}:{}: {e}", lineno + 1);
                ok = false;
            }
        }
    }
    ok
}

/// Accumulate lines into batches and print each one once the analyzer
/// reports it terminated.
fn print_batches(content: &str, analyzer: &dyn Analyzer, terminator: char) {
    let mut batch = String::new();
    let mut count = 0;

    for line in content.lines() {
        if !batch.is_empty() {
            batch.push('\n');
        }
        batch.push_str(line);

        if analyzer.is_terminated(&batch, terminator) {
            count += 1;
            println!("-- batch {count} ({})", analyzer.name());
            println!("{batch}");
            batch.clear();
        }
    }

    if !batch.trim().is_empty() {
        println!("-- unterminated batch");
        println!("{batch}");
    }
}
