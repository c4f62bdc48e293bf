//! Integration tests for configuration resolution
//!
//! Covers:
//! - Priority order: CLI > environment > TOML > compiled defaults
//! - Missing default config file falls back to defaults
//! - Explicit config file must exist and parse
//! - Unparsable numeric environment values are rejected
//! - Name scorer and tie-break policy follow the same tiers
//! - `.env` files feed the environment tier without overriding real variables
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Every test here that reads the environment is marked with #[serial].

use gs_common::config::{
    load_dotenv_from, ConfigOverrides, NameScorer, ScoutConfig, TieBreak, TomlConfig,
    CONFIG_PATH_ENV,
};
use gs_common::Error;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

const ENV_VARS: &[&str] = &[
    "OPENAI_API_KEY",
    "OPENAI_BASE_URL",
    "FINE_TUNE_MODEL",
    "BULLET_MODEL",
    "GS_DEBUG",
    "GS_WINDOW_TOKENS",
    "GS_OVERLAP_TOKENS",
    "GS_SIMILARITY_THRESHOLD",
    "GS_MIN_PA",
    "GS_EXTRACTION_ATTEMPTS",
    "GS_REQUEST_TIMEOUT_SECS",
    "GS_NAME_SCORER",
    "GS_TIE_BREAK",
    CONFIG_PATH_ENV,
];

fn clear_env() {
    for var in ENV_VARS {
        env::remove_var(var);
    }
}

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
#[serial]
fn test_no_sources_yields_defaults() {
    clear_env();

    let config = ScoutConfig::from_sources(&TomlConfig::default(), &ConfigOverrides::default())
        .unwrap();

    assert!(config.api_key.is_none());
    assert_eq!(config.extract_model, "gpt-3.5-turbo-1106");
    assert_eq!(config.window_tokens, 6000);
    assert_eq!(config.overlap_tokens, 100);
    assert!(!config.debug);
    assert_eq!(config.log_level, "info");
}

#[test]
#[serial]
fn test_toml_values_apply() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
        [openai]
        api_key = "sk-from-toml"
        report_model = "gpt-4o-mini"

        [pipeline]
        window_tokens = 3000
        overlap_tokens = 50
        min_plate_appearances = 5
        "#,
    );

    let config = ScoutConfig::resolve(Some(&path), &ConfigOverrides::default()).unwrap();

    assert_eq!(config.api_key.as_deref(), Some("sk-from-toml"));
    assert_eq!(config.report_model, "gpt-4o-mini");
    assert_eq!(config.window_tokens, 3000);
    assert_eq!(config.overlap_tokens, 50);
    assert_eq!(config.min_plate_appearances, 5);
    // Untouched values keep their defaults
    assert_eq!(config.similarity_threshold, 92.0);
}

#[test]
#[serial]
fn test_env_beats_toml_and_cli_beats_env() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
        [openai]
        api_key = "sk-from-toml"

        [pipeline]
        window_tokens = 3000
        similarity_threshold = 80.0
        "#,
    );

    env::set_var("OPENAI_API_KEY", "sk-from-env");
    env::set_var("GS_WINDOW_TOKENS", "4000");
    env::set_var("GS_SIMILARITY_THRESHOLD", "85");

    let overrides = ConfigOverrides {
        similarity_threshold: Some(90.0),
        ..Default::default()
    };
    let config = ScoutConfig::resolve(Some(&path), &overrides).unwrap();

    assert_eq!(config.api_key.as_deref(), Some("sk-from-env"));
    assert_eq!(config.window_tokens, 4000);
    assert_eq!(config.similarity_threshold, 90.0);

    clear_env();
}

#[test]
#[serial]
fn test_blank_env_key_is_ignored() {
    clear_env();
    env::set_var("OPENAI_API_KEY", "   ");

    let config = ScoutConfig::from_sources(&TomlConfig::default(), &ConfigOverrides::default())
        .unwrap();
    assert!(config.api_key.is_none());
    assert!(config.require_api_key().is_err());

    clear_env();
}

#[test]
#[serial]
fn test_debug_flag_from_env() {
    clear_env();
    env::set_var("GS_DEBUG", "1");

    let config = ScoutConfig::from_sources(&TomlConfig::default(), &ConfigOverrides::default())
        .unwrap();
    assert!(config.debug);
    assert_eq!(config.log_level, "debug");

    clear_env();
}

#[test]
#[serial]
fn test_invalid_numeric_env_is_config_error() {
    clear_env();
    env::set_var("GS_MIN_PA", "three");

    let result = ScoutConfig::from_sources(&TomlConfig::default(), &ConfigOverrides::default());
    assert!(matches!(result, Err(Error::Config(_))));

    clear_env();
}

#[test]
#[serial]
fn test_missing_explicit_config_is_error() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    let result = ScoutConfig::resolve(Some(&missing), &ConfigOverrides::default());
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_config_path_from_env() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[pipeline]\noverlap_tokens = 10\n");
    env::set_var(CONFIG_PATH_ENV, &path);

    let config = ScoutConfig::resolve(None, &ConfigOverrides::default()).unwrap();
    assert_eq!(config.overlap_tokens, 10);

    clear_env();
}

#[test]
#[serial]
fn test_malformed_toml_is_parse_error() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[pipeline\nwindow_tokens = ");

    let result = ScoutConfig::resolve(Some(&path), &ConfigOverrides::default());
    assert!(matches!(result, Err(Error::TomlParse(_))));
}

#[test]
#[serial]
fn test_overlap_not_smaller_than_window_rejected() {
    clear_env();
    let overrides = ConfigOverrides {
        window_tokens: Some(100),
        overlap_tokens: Some(150),
        ..Default::default()
    };

    let result = ScoutConfig::from_sources(&TomlConfig::default(), &overrides);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_env_file_supplies_credentials_and_models() {
    clear_env();
    env::set_var("BULLET_MODEL", "gpt-4o-mini");
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".env");
    fs::write(
        &path,
        "OPENAI_API_KEY=sk-from-file\n\
         FINE_TUNE_MODEL=ft:gs-parser\n\
         BULLET_MODEL=ignored\n\
         GS_DEBUG=1\n",
    )
    .unwrap();

    load_dotenv_from(&path).unwrap();
    let config = ScoutConfig::from_sources(&TomlConfig::default(), &ConfigOverrides::default())
        .unwrap();

    assert_eq!(config.api_key.as_deref(), Some("sk-from-file"));
    assert_eq!(config.extract_model, "ft:gs-parser");
    // Already-set variables are not overwritten by the file
    assert_eq!(config.report_model, "gpt-4o-mini");
    assert!(config.debug);

    clear_env();
}

#[test]
#[serial]
fn test_missing_env_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let result = load_dotenv_from(&dir.path().join("absent.env"));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_matching_policy_tiers() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
        [pipeline]
        name_scorer = "levenshtein"
        tie_break = "most_records"
        "#,
    );

    // Given: TOML only
    let config = ScoutConfig::resolve(Some(&path), &ConfigOverrides::default()).unwrap();
    assert_eq!(config.name_scorer, NameScorer::Levenshtein);
    assert_eq!(config.tie_break, TieBreak::MostRecords);

    // Given: environment above TOML
    env::set_var("GS_TIE_BREAK", "first_created");
    let config = ScoutConfig::resolve(Some(&path), &ConfigOverrides::default()).unwrap();
    assert_eq!(config.tie_break, TieBreak::FirstCreated);

    // Given: CLI above environment
    let overrides = ConfigOverrides {
        name_scorer: Some(NameScorer::TokenSet),
        tie_break: Some(TieBreak::MostRecords),
        ..Default::default()
    };
    let config = ScoutConfig::resolve(Some(&path), &overrides).unwrap();
    assert_eq!(config.name_scorer, NameScorer::TokenSet);
    assert_eq!(config.tie_break, TieBreak::MostRecords);

    clear_env();
}

#[test]
#[serial]
fn test_unknown_tie_break_env_rejected() {
    clear_env();
    env::set_var("GS_TIE_BREAK", "coin_flip");

    let result = ScoutConfig::from_sources(&TomlConfig::default(), &ConfigOverrides::default());
    assert!(matches!(result, Err(Error::Config(_))));

    clear_env();
}
