// SPDX-FileCopyrightText: 2026 Hangar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Hangar configuration system.

use hangar_config::diagnostic::ConfigError;
use hangar_config::model::HangarConfig;
use hangar_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_hangar_config() {
    let toml = r#"
[plugins]
base_dir = "/srv/hangar/plugins"
official_keys = ["AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA="]

[runtime]
manifest_timeout_secs = 3
init_timeout_secs = 20
heartbeat_interval_secs = 30
health_timeout_secs = 5

[adapters]
call_timeout_secs = 15
payment_timeout_secs = 8

[storage]
database_path = "/tmp/hangar-test.db"
wal_mode = false

[logging]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.plugins.base_dir, "/srv/hangar/plugins");
    assert_eq!(config.plugins.official_keys.len(), 1);
    assert_eq!(config.runtime.manifest_timeout_secs, 3);
    assert_eq!(config.runtime.init_timeout().as_secs(), 20);
    assert_eq!(config.runtime.heartbeat_interval().as_secs(), 30);
    assert_eq!(config.adapters.payment_timeout().as_secs(), 8);
    assert_eq!(config.storage.database_path, "/tmp/hangar-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.logging.level, "debug");
}

/// Missing sections fall back to the tuned runtime defaults.
#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.plugins.base_dir, "plugins");
    assert!(config.plugins.official_keys.is_empty());
    assert_eq!(config.runtime.manifest_timeout_secs, 5);
    assert_eq!(config.runtime.init_timeout_secs, 10);
    assert_eq!(config.runtime.heartbeat_interval_secs, 10);
    assert_eq!(config.runtime.health_timeout_secs, 2);
    assert_eq!(config.adapters.call_timeout_secs, 12);
    assert_eq!(config.adapters.payment_timeout_secs, 10);
    assert!(config.storage.wal_mode);
    assert!(config.vault.master_key.is_empty());
    assert_eq!(config.logging.level, "info");
}

/// Env overrides are merged as dotted keys (`HANGAR_RUNTIME_INIT_TIMEOUT_SECS`).
#[test]
fn env_style_override_reaches_nested_key() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: HangarConfig = Figment::new()
        .merge(Serialized::defaults(HangarConfig::default()))
        .merge(Toml::string("[runtime]\ninit_timeout_secs = 4\n"))
        .merge(("runtime.init_timeout_secs", 30))
        .extract()
        .expect("should merge override");

    assert_eq!(config.runtime.init_timeout_secs, 30);
}

/// Unknown key in a section is reported with a suggestion and the valid keys.
#[test]
fn unknown_key_gets_suggestion() {
    let toml = r#"
[plugins]
base_dri = "x"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, span, .. } if {
            key == "plugins.base_dri"
                && suggestion.as_deref() == Some("plugins.base_dir")
                && valid_keys.contains("official_keys")
                && span.is_some()
        })
    });
    assert!(found, "expected UnknownKey for base_dri, got: {errors:?}");
}

/// Unexpected top-level section is rejected by deny_unknown_fields.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[telemetry]
enabled = true
"#;

    let err = load_config_from_str(toml).expect_err("unknown top-level section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("telemetry"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// A misspelled section is reported against the known section names.
#[test]
fn unknown_section_suggests_a_section() {
    let errors = load_and_validate_str("[runtim]\ninit_timeout_secs = 3\n").expect_err("should fail");
    assert!(
        errors.iter().any(|e| matches!(e, ConfigError::UnknownKey { key, suggestion, .. }
            if key == "runtim" && suggestion.as_deref() == Some("runtime"))),
        "got: {errors:?}"
    );
}

/// A wrong-typed value is reported under its dotted key.
#[test]
fn invalid_value_names_the_dotted_key() {
    let errors = load_and_validate_str("[runtime]\ninit_timeout_secs = \"ten\"\n").expect_err("should fail");
    assert!(
        errors.iter().any(|e| matches!(e, ConfigError::InvalidValue { key, .. } if key == "runtime.init_timeout_secs")),
        "got: {errors:?}"
    );
}

/// A string where a number is expected is an invalid type.
#[test]
fn invalid_type_is_reported() {
    let toml = r#"
[runtime]
init_timeout_secs = "ten"
"#;

    let err = load_config_from_str(toml).expect_err("should reject invalid type");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("invalid type") || err_str.contains("init_timeout_secs"),
        "error should mention type mismatch, got: {err_str}"
    );
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_runs_after_parse() {
    let toml = r#"
[runtime]
heartbeat_interval_secs = 2
health_timeout_secs = 2
"#;

    let errors = load_and_validate_str(toml).expect_err("validation should fail");
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("health_timeout_secs"))
    ));
}

/// ConfigError renders with miette's graphical handler.
#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "plugins.base_dri".to_string(),
        suggestion: Some("plugins.base_dir".to_string()),
        valid_keys: "base_dir, official_keys".to_string(),
        span: None,
        src: None,
    };

    assert!(error.code().is_some());
    let help = error.help().expect("help text").to_string();
    assert!(help.contains("did you mean `plugins.base_dir`"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(buf.contains("base_dri"));
}

/// Loading from an explicit path validates the file's contents.
#[test]
fn load_from_path_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hangar.toml");
    std::fs::write(&path, "[plugins]\nbase_dir = \"\"\n").unwrap();

    let errors = load_and_validate_path(&path).expect_err("empty base_dir must fail");
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("plugins.base_dir"))
    ));
}
