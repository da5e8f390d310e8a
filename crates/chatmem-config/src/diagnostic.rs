// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Diagnostics for `chatmem.toml`.
//!
//! Figment reports problems as a flat list of errors with a key path. This
//! module turns each one into a [`ConfigError`] that miette can render:
//! the offending key is located in whichever TOML file it came from, the
//! section it lives in (`[recall]`, `[embedding]`, ...) is named in the
//! help text, and misspelled keys get a "did you mean?" suggestion ranked by
//! Jaro-Winkler similarity.
//!
//! Validation failures produced after deserialization share the same type so
//! callers get a single `Vec<ConfigError>` to render.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity score to suggest a correction.
///
/// Low enough for `serch_k` -> `search_k` and `recnt_count` ->
/// `recent_count`, high enough that `wal` is not offered for `level`.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration problem, ready to be rendered by miette.
///
/// Variants that come from a TOML file carry the file content and a span so
/// the rendered report points at the exact line.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key that no config section declares, usually a typo.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(chatmem::config::unknown_key),
        help("{}", format_unknown_key_help(suggestion.as_deref(), section, valid_keys))
    )]
    UnknownKey {
        /// The key as written in the file.
        key: String,
        /// Dotted section the key was found in, empty at the top level.
        section: String,
        /// Closest valid key, when one is similar enough.
        suggestion: Option<String>,
        /// Comma-separated keys the section accepts.
        valid_keys: String,
        /// Location of the key in `src`.
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        /// The TOML file the key came from.
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value that does not deserialize into the field's type, such as
    /// `search_k = "ten"`.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(chatmem::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        /// Dotted path of the field, e.g. `recall.search_k`.
        key: String,
        /// Figment's description of what was found and what was wanted.
        detail: String,
        /// The expected type alone, for the help line.
        expected: String,
        /// Location of the key in `src`.
        #[label("wrong type here")]
        span: Option<SourceSpan>,
        /// The TOML file the value came from.
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A field without a default that no source provided.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(chatmem::config::missing_key),
        help("add `{key} = <value>` to your chatmem.toml")
    )]
    MissingKey {
        /// Name of the missing field.
        key: String,
    },

    /// A well-typed value that breaks a semantic rule, such as
    /// `recall.context_hits` exceeding `recall.search_k`.
    #[error("validation error: {message}")]
    #[diagnostic(code(chatmem::config::validation))]
    Validation {
        /// Names the offending key and the rule it breaks.
        message: String,
    },

    /// Any other figment failure, e.g. a TOML syntax error.
    #[error("configuration error: {0}")]
    #[diagnostic(code(chatmem::config::other))]
    Other(String),
}

fn format_unknown_key_help(suggestion: Option<&str>, section: &str, valid_keys: &str) -> String {
    let scope = if section.is_empty() {
        "valid top-level keys".to_string()
    } else {
        format!("valid keys in [{section}]")
    };
    match suggestion {
        Some(s) => format!("did you mean `{s}`? {}: {valid_keys}", capitalize(&scope)),
        None => format!("{scope}: {valid_keys}"),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convert a `figment::Error` into one `ConfigError` per reported problem.
///
/// `toml_sources` holds `(path, content)` for every TOML file that took part
/// in the merge; spans are resolved against the file figment attributes the
/// error to, or against the only source when figment names none.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    let mut errors = Vec::new();

    for error in err {
        let path: Vec<String> = error.path.iter().map(|s| s.to_string()).collect();
        let config_error = match &error.kind {
            Kind::UnknownField(field, expected) => {
                let valid_keys: Vec<&str> = expected.to_vec();
                let suggestion = suggest_key(field, &valid_keys);
                // The path ends with the unknown key itself.
                let section = match path.split_last() {
                    Some((last, rest)) if last == field => rest,
                    _ => &path[..],
                };
                let (span, src) = find_source_span(&error, section, field, toml_sources);

                ConfigError::UnknownKey {
                    key: field.clone(),
                    section: section.join("."),
                    suggestion,
                    valid_keys: valid_keys.join(", "),
                    span,
                    src,
                }
            }
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: field.clone().into_owned(),
            },
            Kind::InvalidType(actual, expected) => {
                let (span, src) = match path.split_last() {
                    Some((field, section)) => {
                        find_source_span(&error, section, field, toml_sources)
                    }
                    None => (None, None),
                };
                ConfigError::InvalidType {
                    key: path.join("."),
                    detail: format!("found {actual}, expected {expected}"),
                    expected: expected.to_string(),
                    span,
                    src,
                }
            }
            _ => ConfigError::Other(format!("{error}")),
        };

        errors.push(config_error);
    }

    errors
}

/// Locate `field` under `section` in the TOML file the error came from.
fn find_source_span(
    error: &figment::error::Error,
    section: &[String],
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let source_path = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    // Inline strings carry no file path.
    let source = match source_path {
        Some(path) => toml_sources.iter().find(|(p, _)| *p == path),
        None if toml_sources.len() == 1 => toml_sources.first(),
        None => None,
    };

    if let Some((path, content)) = source
        && let Some(offset) = find_key_offset(content, section, field)
    {
        let span = SourceSpan::new(offset.into(), field.len());
        let named = NamedSource::new(path, content.clone());
        return (Some(span), Some(named));
    }

    (None, None)
}

/// Find the byte offset of a key in TOML content, relative to a section path.
///
/// For `path = ["recall"]` and `field = "recnt_count"`, finds `[recall]`
/// then searches for the key after it. Top-level keys are searched from the start.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let search_start = match path.first() {
        None => 0,
        Some(section) => {
            let header = format!("[{section}]");
            content.find(&header).map(|pos| pos + header.len())?
        }
    };

    let remaining = &content[search_start..];
    let mut byte_offset = 0;
    for line in remaining.lines() {
        let trimmed = line.trim_start();
        if let Some(after) = trimmed.strip_prefix(field)
            && (after.starts_with(' ') || after.starts_with('=') || after.starts_with('\t'))
        {
            let field_start_in_line = line.len() - trimmed.len();
            return Some(search_start + byte_offset + field_start_in_line);
        }
        byte_offset += line.len() + 1;
    }

    None
}

/// Suggest a similar key name using Jaro-Winkler string similarity.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    let mut best_score = SUGGESTION_THRESHOLD;
    let mut best_match = None;

    for &key in valid_keys {
        let score = strsim::jaro_winkler(unknown, key);
        if score > best_score {
            best_score = score;
            best_match = Some(key.to_string());
        }
    }

    best_match
}

/// Render each error to stderr with miette's graphical handler, falling back
/// to the plain message if rendering fails.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}
