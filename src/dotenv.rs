//! Merging of dotenv definition files into an [`Environment`].

use crate::environment::Environment;
use std::path::{Path, PathBuf};
use std::{fs, io};

/// Outcome of merging a set of definition files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Files that were parsed and merged
    pub loaded: Vec<PathBuf>,
    /// Files that were skipped, with the reason
    pub skipped: Vec<(PathBuf, String)>,
    /// Number of variables newly added to the environment
    pub added: usize,
}

/// Stands in for a `$` that may start a variable reference
const REFERENCE: char = '\u{E000}';
/// Stands in for an escaped `\$`
const LITERAL_DOLLAR: char = '\u{E001}';

/// Parse a single definition file into its `(key, value)` pairs
///
/// `${NAME}` and `$NAME` references are expanded against `env` first and then
/// against earlier lines of the same file; undefined names expand to nothing.
/// Single-quoted values are taken literally. The whole file is rejected if any
/// line fails to parse, so a file is either merged completely or not at all.
pub fn read_file(
    path: &Path,
    env: &Environment,
) -> Result<Vec<(String, String)>, dotenvy::Error> {
    let contents = fs::read_to_string(path).map_err(dotenvy::Error::Io)?;

    // dotenvy would expand references against the process environment, so it
    // only ever sees the placeholders
    let pairs = dotenvy::from_read_iter(io::Cursor::new(mark_references(&contents)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut expanded: Vec<(String, String)> = Vec::with_capacity(pairs.len());
    for (key, value) in pairs {
        let value = expand(&value, |name| {
            env.get(name).map(str::to_string).or_else(|| {
                expanded
                    .iter()
                    .rev()
                    .find(|(k, _)| k == name)
                    .map(|(_, v)| v.clone())
            })
        });
        expanded.push((key, value));
    }

    Ok(expanded)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Quote {
    None,
    Single,
    Double,
}

/// Replace `$` outside single quotes with placeholders
fn mark_references(contents: &str) -> String {
    let mut out = String::with_capacity(contents.len());
    let mut quote = Quote::None;
    let mut after_blank = true;
    let mut chars = contents.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Quote::Single, '\'') => {
                quote = Quote::None;
                out.push(c);
            }
            (Quote::Single, _) => out.push(c),
            (Quote::None, '#') if after_blank => {
                out.push(c);
                for next in chars.by_ref() {
                    out.push(next);
                    if next == '\n' {
                        break;
                    }
                }
                after_blank = true;
                continue;
            }
            (_, '\\') => match chars.next() {
                Some('$') => out.push(LITERAL_DOLLAR),
                Some(next) => {
                    out.push(c);
                    out.push(next);
                }
                None => out.push(c),
            },
            (_, '$') => out.push(REFERENCE),
            (Quote::None, '\'') => {
                quote = Quote::Single;
                out.push(c);
            }
            (Quote::None, '"') => {
                quote = Quote::Double;
                out.push(c);
            }
            (Quote::Double, '"') => {
                quote = Quote::None;
                out.push(c);
            }
            _ => out.push(c),
        }
        after_blank = c.is_whitespace();
    }

    out
}

/// Expand placeholder references in a parsed value
fn expand(value: &str, mut lookup: impl FnMut(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            LITERAL_DOLLAR => out.push('$'),
            REFERENCE => {
                let braced = chars.next_if_eq(&'{').is_some();
                let mut name = String::new();
                while let Some(n) = chars.next_if(|n| n.is_ascii_alphanumeric() || *n == '_') {
                    name.push(n);
                }

                let closed = !braced || chars.next_if_eq(&'}').is_some();
                if name.is_empty() || !closed {
                    // Not a reference, keep the text as written
                    out.push('$');
                    if braced {
                        out.push('{');
                    }
                    out.push_str(&name);
                    if braced && closed {
                        out.push('}');
                    }
                    continue;
                }

                match lookup(&name) {
                    Some(v) => out.push_str(&v),
                    None => {
                        tracing::debug!(variable = %name, "Undefined variable expands to empty")
                    }
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// Merge definition files into `env`, in order
///
/// Keys already present in `env` are never overwritten, so the process
/// environment wins over every file and earlier files win over later ones.
/// References in a file see everything merged before it.
/// Missing, unreadable or malformed files are logged and skipped.
pub fn merge_files<P: AsRef<Path>>(env: &mut Environment, files: &[P]) -> MergeReport {
    let mut report = MergeReport::default();

    for path in files {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "Loading .env file");

        match read_file(path, env) {
            Ok(pairs) => {
                for (key, value) in pairs {
                    if env.set_if_absent(key, value) {
                        report.added += 1;
                    }
                }
                report.loaded.push(path.to_path_buf());
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not load file");
                report.skipped.push((path.to_path_buf(), e.to_string()));
            }
        }
    }

    report
}
