// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! miette diagnostics for `hangar.toml`.
//!
//! Figment reports a failed extraction as a chain of errors. Each one is
//! mapped onto a [`ConfigError`] that names the dotted key (`runtime.init_timeout_secs`),
//! points into the offending file when it can be found, and for unknown keys
//! offers the closest key Hangar actually reads.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Every key `hangar.toml` accepts, by section.
pub const KNOWN_KEYS: &[(&str, &[&str])] = &[
    ("plugins", &["base_dir", "official_keys"]),
    (
        "runtime",
        &[
            "manifest_timeout_secs",
            "init_timeout_secs",
            "heartbeat_interval_secs",
            "health_timeout_secs",
            "handshake_timeout_secs",
            "stop_grace_secs",
        ],
    ),
    ("adapters", &["call_timeout_secs", "payment_timeout_secs"]),
    ("storage", &["database_path", "wal_mode"]),
    ("vault", &["master_key"]),
    ("logging", &["level"]),
];

/// Jaro-Winkler score a candidate needs before it is offered as a fix.
const SUGGESTION_THRESHOLD: f64 = 0.75;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A section or key Hangar does not read.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(hangar::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        /// Dotted path of the offending key.
        key: String,
        /// Dotted path of the closest known key.
        suggestion: Option<String>,
        valid_keys: String,
        #[label("not a hangar setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A known key holding a value of the wrong shape.
    #[error("invalid value for `{key}`: {detail}")]
    #[diagnostic(code(hangar::config::invalid_value), help("`{key}` takes {expected}"))]
    InvalidValue {
        key: String,
        detail: String,
        expected: String,
        #[label("here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A parsed config that fails a semantic check.
    #[error("validation error: {message}")]
    #[diagnostic(code(hangar::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(hangar::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Keys of `section`, or the section names for the top level.
fn keys_in(section: Option<&str>) -> Vec<&'static str> {
    match section {
        None => KNOWN_KEYS.iter().map(|(name, _)| *name).collect(),
        Some(section) => KNOWN_KEYS
            .iter()
            .find(|(name, _)| *name == section)
            .map(|(_, keys)| keys.to_vec())
            .unwrap_or_default(),
    }
}

fn dotted(section: Option<&str>, key: &str) -> String {
    match section {
        Some(section) => format!("{section}.{key}"),
        None => key.to_string(),
    }
}

/// Map every error in a failed extraction to a diagnostic.
///
/// `toml_sources` holds `(path, content)` pairs for the files that were
/// merged, used to attach source spans.
pub fn figment_to_config_errors(err: figment::Error, toml_sources: &[(String, String)]) -> Vec<ConfigError> {
    err.into_iter().map(|error| convert(&error, toml_sources)).collect()
}

fn convert(error: &figment::Error, toml_sources: &[(String, String)]) -> ConfigError {
    let section = error.path.first().map(String::as_str);
    match &error.kind {
        Kind::UnknownField(field, _) => {
            let valid = keys_in(section);
            let (span, src) = locate(error, toml_sources, section, field);
            ConfigError::UnknownKey {
                key: dotted(section, field),
                suggestion: closest_key(field, &valid).map(|k| dotted(section, k)),
                valid_keys: valid.join(", "),
                span,
                src,
            }
        }
        Kind::InvalidType(actual, expected) | Kind::InvalidValue(actual, expected) => {
            let (span, src) = match error.path.get(1) {
                Some(field) => locate(error, toml_sources, section, field),
                None => (None, None),
            };
            ConfigError::InvalidValue {
                key: error.path.join("."),
                detail: format!("found {actual}"),
                expected: expected.clone(),
                span,
                src,
            }
        }
        _ => ConfigError::Other(error.to_string()),
    }
}

/// The source file an error came from, falling back to the only file given.
fn source_of<'a>(error: &figment::Error, toml_sources: &'a [(String, String)]) -> Option<&'a (String, String)> {
    let origin = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });
    match origin {
        Some(path) => toml_sources.iter().find(|(p, _)| *p == path),
        None if toml_sources.len() == 1 => toml_sources.first(),
        None => None,
    }
}

fn locate(
    error: &figment::Error,
    toml_sources: &[(String, String)],
    section: Option<&str>,
    key: &str,
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let Some((path, content)) = source_of(error, toml_sources) else {
        return (None, None);
    };
    match key_offset(content, section, key) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), key.len())),
            Some(NamedSource::new(path, content.clone())),
        ),
        None => (None, None),
    }
}

/// Byte offset of `key` inside `[section]`, or of the `[key]` header itself
/// when `section` is `None`.
///
/// Tracks the current table while scanning, so a key of the same name in an
/// earlier or later section is never matched.
pub fn key_offset(content: &str, section: Option<&str>, key: &str) -> Option<usize> {
    let mut current: Option<&str> = None;
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();
        if let Some(header) = trimmed.strip_prefix('[') {
            let name = header.split(']').next().map(str::trim);
            if section.is_none() && name == Some(key) {
                return Some(offset + indent + header.len() - header.trim_start().len() + 1);
            }
            current = name;
        } else if current == section {
            let assigns = trimmed
                .strip_prefix(key)
                .is_some_and(|rest| rest.trim_start().starts_with('='));
            if assigns {
                return Some(offset + indent);
            }
        }
        offset += line.len();
    }
    None
}

/// The known key most similar to `unknown`, if any is close enough.
pub fn closest_key<'a>(unknown: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|&candidate| (candidate, strsim::jaro_winkler(unknown, candidate)))
        .filter(|(_, score)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate)
}

/// Print each error to stderr through miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HangarConfig;

    #[test]
    fn known_keys_match_the_model() {
        let value = toml::Value::try_from(HangarConfig::default()).unwrap();
        let table = value.as_table().unwrap();
        let mut sections: Vec<&str> = table.keys().map(String::as_str).collect();
        sections.sort_unstable();
        let mut known = keys_in(None);
        known.sort_unstable();
        assert_eq!(sections, known);

        for (section, keys) in KNOWN_KEYS {
            let mut model: Vec<&str> = table[*section].as_table().unwrap().keys().map(String::as_str).collect();
            model.sort_unstable();
            let mut listed = keys.to_vec();
            listed.sort_unstable();
            assert_eq!(model, listed, "[{section}]");
        }
    }

    #[test]
    fn typos_resolve_within_their_section() {
        assert_eq!(closest_key("init_timout_secs", &keys_in(Some("runtime"))), Some("init_timeout_secs"));
        assert_eq!(closest_key("runtim", &keys_in(None)), Some("runtime"));
        assert_eq!(closest_key("zzzzzz", &keys_in(Some("plugins"))), None);
        assert!(keys_in(Some("telemetry")).is_empty());
    }

    #[test]
    fn key_offset_respects_sections() {
        let content = "[storage]\nlevel = 1\n\n[logging]\n  level = \"debug\"\n";
        let offset = key_offset(content, Some("logging"), "level").unwrap();
        assert_eq!(&content[offset..offset + 5], "level");
        assert!(offset > content.find("[logging]").unwrap());
        assert!(key_offset(content, Some("vault"), "level").is_none());
    }

    #[test]
    fn key_offset_finds_section_headers() {
        let content = "[plugins]\nbase_dir = \"x\"\n[runtim]\n";
        let offset = key_offset(content, None, "runtim").unwrap();
        assert_eq!(&content[offset..offset + 6], "runtim");
    }

    #[test]
    fn base_dir_prefix_is_not_a_match() {
        let content = "[plugins]\nbase_dir_old = \"x\"\n";
        assert!(key_offset(content, Some("plugins"), "base_dir").is_none());
    }
}
