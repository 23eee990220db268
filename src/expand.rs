//! Variable expansion collaborators.
//!
//! The command-line tokenizer expands `$name` and `${name}` references in
//! unquoted and double-quoted segments through an [`Expander`]. Single-quoted
//! segments are never expanded.

use std::collections::HashMap;

/// Maps a variable name to its expansion text.
///
/// Returning `None` leaves the reference in the output verbatim, so a typo'd
/// `$varaible` survives as typed rather than vanishing.
pub trait Expander {
    fn expand(&self, name: &str) -> Option<String>;
}

/// Expander backed by the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvExpander;

impl Expander for EnvExpander {
    fn expand(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Expander backed by an in-memory map. Used by tests and by drivers that
/// keep their own variable namespace.
#[derive(Debug, Clone, Default)]
pub struct MapExpander {
    variables: HashMap<String, String>,
}

impl MapExpander {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }
}

impl Expander for MapExpander {
    fn expand(&self, name: &str) -> Option<String> {
        self.variables.get(name).cloned()
    }
}

const fn is_name_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

const fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Substitute `$name` and `${name}` references in `text`.
///
/// Expansion is a single pass: values are spliced in verbatim and never
/// re-scanned, so a variable whose value contains `$` does not recurse.
#[must_use]
pub fn expand_variables(text: &str, expander: &dyn Expander) -> String {
    let mut out = String::with_capacity(text.len());
    let chars: Vec<char> = text.chars().collect();
    let mut idx = 0;

    while idx < chars.len() {
        if chars[idx] != '$' {
            out.push(chars[idx]);
            idx += 1;
            continue;
        }

        // `${name}` form.
        if chars.get(idx + 1) == Some(&'{') {
            let name_start = idx + 2;
            let mut end = name_start;
            while end < chars.len() && chars[end] != '}' {
                end += 1;
            }
            if end < chars.len() && end > name_start {
                let name: String = chars[name_start..end].iter().collect();
                match expander.expand(&name) {
                    Some(value) => out.push_str(&value),
                    None => out.extend(&chars[idx..=end]),
                }
                idx = end + 1;
                continue;
            }
            // No closing brace or empty name, keep the `$` literal.
            out.push('$');
            idx += 1;
            continue;
        }

        // `$name` form.
        if chars.get(idx + 1).copied().is_some_and(is_name_start) {
            let name_start = idx + 1;
            let mut end = name_start + 1;
            while end < chars.len() && is_name_char(chars[end]) {
                end += 1;
            }
            let name: String = chars[name_start..end].iter().collect();
            match expander.expand(&name) {
                Some(value) => out.push_str(&value),
                None => out.extend(&chars[idx..end]),
            }
            idx = end;
            continue;
        }

        out.push('$');
        idx += 1;
    }

    out
}
