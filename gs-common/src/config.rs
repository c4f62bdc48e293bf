//! Configuration loading for Greenseam tools
//!
//! Every tunable the scout pipeline uses lives in [`ScoutConfig`], which is
//! resolved once at startup and passed into the pipeline explicitly.
//!
//! Resolution priority, highest first:
//! 1. Command-line overrides ([`ConfigOverrides`])
//! 2. Environment variables (`OPENAI_API_KEY`, `GS_WINDOW_TOKENS`, ...),
//!    including those loaded from a `.env` file by [`load_dotenv`]
//! 3. TOML config file
//! 4. Compiled defaults
//!
//! A missing default config file is not an error: defaults apply. A config
//! file named explicitly (CLI or `GS_CONFIG`) must exist and parse.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "GS_CONFIG";

/// Name fragments that are never players (venue and team abbreviations)
pub const DEFAULT_STOP_WORDS: &[&str] = &["BRDG", "FRNT", "BRIDGEWATER", "FRONT", "ROYAL"];

pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_EXTRACT_MODEL: &str = "gpt-3.5-turbo-1106";
pub const DEFAULT_REPORT_MODEL: &str = "gpt-3.5-turbo-1106";
pub const DEFAULT_WINDOW_TOKENS: usize = 6000;
pub const DEFAULT_OVERLAP_TOKENS: usize = 100;
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 92.0;
pub const DEFAULT_MIN_PLATE_APPEARANCES: u32 = 3;
pub const DEFAULT_EXTRACTION_ATTEMPTS: u32 = 3;
pub const DEFAULT_EXTRACTION_MAX_TOKENS: u32 = 2048;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Fuzzy scorer used to match a name against existing hitters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameScorer {
    /// Token-set ratio: word order and subset names do not matter
    #[default]
    TokenSet,
    /// Normalized Levenshtein over the whole key
    Levenshtein,
}

impl FromStr for NameScorer {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "token_set" => Ok(NameScorer::TokenSet),
            "levenshtein" => Ok(NameScorer::Levenshtein),
            other => Err(format!(
                "unknown name scorer '{}' (expected token_set or levenshtein)",
                other
            )),
        }
    }
}

/// Which hitter wins when several share the top similarity score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Earliest-created hitter (scan order)
    #[default]
    FirstCreated,
    /// Hitter holding the most plays, then earliest-created
    MostRecords,
}

impl FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "first_created" => Ok(TieBreak::FirstCreated),
            "most_records" => Ok(TieBreak::MostRecords),
            other => Err(format!(
                "unknown tie break '{}' (expected first_created or most_records)",
                other
            )),
        }
    }
}

/// Config file contents. Every field is optional; absent fields fall through
/// to the environment and then to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub openai: OpenAiSection,
    pub pipeline: PipelineSection,
    pub logging: LoggingConfig,
}

/// `[openai]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OpenAiSection {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub extract_model: Option<String>,
    pub report_model: Option<String>,
    pub extract_temperature: Option<f32>,
    pub report_temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub request_timeout_secs: Option<u64>,
}

/// `[pipeline]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineSection {
    pub window_tokens: Option<usize>,
    pub overlap_tokens: Option<usize>,
    pub similarity_threshold: Option<f64>,
    pub min_plate_appearances: Option<u32>,
    pub extraction_attempts: Option<u32>,
    pub stop_words: Option<Vec<String>>,
    pub name_scorer: Option<NameScorer>,
    pub tie_break: Option<TieBreak>,
}

/// `[logging]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Debug mode: verbose logging plus raw extraction response previews
    pub debug: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            debug: false,
        }
    }
}

impl TomlConfig {
    /// Load and parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Read config {} failed: {}", path.display(), e))
        })?;
        let config = toml::from_str(&content)?;
        info!("Loaded config file: {}", path.display());
        Ok(config)
    }
}

/// Values supplied on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub window_tokens: Option<usize>,
    pub overlap_tokens: Option<usize>,
    pub similarity_threshold: Option<f64>,
    pub min_plate_appearances: Option<u32>,
    pub name_scorer: Option<NameScorer>,
    pub tie_break: Option<TieBreak>,
    pub debug: bool,
}

/// Fully resolved configuration for one scout run
#[derive(Debug, Clone)]
pub struct ScoutConfig {
    /// Language model API key (required only for live collaborator calls)
    pub api_key: Option<String>,
    pub api_base_url: String,
    /// Model used to turn text windows into play records
    pub extract_model: String,
    /// Model used to write the scouting report
    pub report_model: String,
    pub extract_temperature: f32,
    pub report_temperature: f32,
    /// Completion token cap for one extraction call
    pub extraction_max_tokens: u32,
    pub request_timeout_secs: u64,
    /// Maximum window size `W`, in tokens
    pub window_tokens: usize,
    /// Overlap `O` between consecutive windows, in tokens
    pub overlap_tokens: usize,
    /// Fuzzy name match threshold on the 0-100 scale
    pub similarity_threshold: f64,
    /// Identities below this many plate appearances are not reported
    pub min_plate_appearances: u32,
    /// Extraction attempts per window before the run fails
    pub extraction_attempts: u32,
    pub stop_words: Vec<String>,
    pub name_scorer: NameScorer,
    pub tie_break: TieBreak,
    pub log_level: String,
    pub debug: bool,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            extract_model: DEFAULT_EXTRACT_MODEL.to_string(),
            report_model: DEFAULT_REPORT_MODEL.to_string(),
            extract_temperature: 0.0,
            report_temperature: 0.3,
            extraction_max_tokens: DEFAULT_EXTRACTION_MAX_TOKENS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            window_tokens: DEFAULT_WINDOW_TOKENS,
            overlap_tokens: DEFAULT_OVERLAP_TOKENS,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            min_plate_appearances: DEFAULT_MIN_PLATE_APPEARANCES,
            extraction_attempts: DEFAULT_EXTRACTION_ATTEMPTS,
            stop_words: DEFAULT_STOP_WORDS.iter().map(|s| s.to_string()).collect(),
            name_scorer: NameScorer::default(),
            tie_break: TieBreak::default(),
            log_level: "info".to_string(),
            debug: false,
        }
    }
}

impl ScoutConfig {
    /// Resolve configuration from all sources.
    ///
    /// `explicit_path` is the `--config` argument, if any.
    pub fn resolve(explicit_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let toml_config = match locate_config_file(explicit_path)? {
            Some(path) => TomlConfig::load(&path)?,
            None => {
                debug!("No config file found, using environment and defaults");
                TomlConfig::default()
            }
        };
        Self::from_sources(&toml_config, overrides)
    }

    /// Merge an already-loaded TOML config with environment and CLI overrides
    pub fn from_sources(toml_config: &TomlConfig, overrides: &ConfigOverrides) -> Result<Self> {
        let defaults = Self::default();
        let openai = &toml_config.openai;
        let pipeline = &toml_config.pipeline;

        let api_key = env_string("OPENAI_API_KEY")
            .or_else(|| openai.api_key.clone().filter(|k| is_valid_key(k)));

        let debug = overrides.debug
            || env_string("GS_DEBUG").as_deref() == Some("1")
            || toml_config.logging.debug;

        let config = Self {
            api_key,
            api_base_url: env_string("OPENAI_BASE_URL")
                .or_else(|| openai.base_url.clone())
                .unwrap_or(defaults.api_base_url),
            extract_model: env_string("FINE_TUNE_MODEL")
                .or_else(|| openai.extract_model.clone())
                .unwrap_or(defaults.extract_model),
            report_model: env_string("BULLET_MODEL")
                .or_else(|| openai.report_model.clone())
                .unwrap_or(defaults.report_model),
            extract_temperature: openai
                .extract_temperature
                .unwrap_or(defaults.extract_temperature),
            report_temperature: openai
                .report_temperature
                .unwrap_or(defaults.report_temperature),
            extraction_max_tokens: openai.max_tokens.unwrap_or(defaults.extraction_max_tokens),
            request_timeout_secs: pick(
                None,
                env_parse("GS_REQUEST_TIMEOUT_SECS")?,
                openai.request_timeout_secs,
                defaults.request_timeout_secs,
            ),
            window_tokens: pick(
                overrides.window_tokens,
                env_parse("GS_WINDOW_TOKENS")?,
                pipeline.window_tokens,
                defaults.window_tokens,
            ),
            overlap_tokens: pick(
                overrides.overlap_tokens,
                env_parse("GS_OVERLAP_TOKENS")?,
                pipeline.overlap_tokens,
                defaults.overlap_tokens,
            ),
            similarity_threshold: pick(
                overrides.similarity_threshold,
                env_parse("GS_SIMILARITY_THRESHOLD")?,
                pipeline.similarity_threshold,
                defaults.similarity_threshold,
            ),
            min_plate_appearances: pick(
                overrides.min_plate_appearances,
                env_parse("GS_MIN_PA")?,
                pipeline.min_plate_appearances,
                defaults.min_plate_appearances,
            ),
            extraction_attempts: pick(
                None,
                env_parse("GS_EXTRACTION_ATTEMPTS")?,
                pipeline.extraction_attempts,
                defaults.extraction_attempts,
            ),
            stop_words: pipeline.stop_words.clone().unwrap_or(defaults.stop_words),
            name_scorer: pick(
                overrides.name_scorer,
                env_parse("GS_NAME_SCORER")?,
                pipeline.name_scorer,
                defaults.name_scorer,
            ),
            tie_break: pick(
                overrides.tie_break,
                env_parse("GS_TIE_BREAK")?,
                pipeline.tie_break,
                defaults.tie_break,
            ),
            log_level: if debug {
                "debug".to_string()
            } else {
                toml_config.logging.level.clone()
            },
            debug,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check ranges that would otherwise surface as confusing runtime failures
    pub fn validate(&self) -> Result<()> {
        if self.window_tokens == 0 {
            return Err(Error::Config("window_tokens must be greater than 0".to_string()));
        }
        if self.overlap_tokens >= self.window_tokens {
            return Err(Error::Config(format!(
                "overlap_tokens ({}) must be smaller than window_tokens ({})",
                self.overlap_tokens, self.window_tokens
            )));
        }
        if !(0.0..=100.0).contains(&self.similarity_threshold) {
            return Err(Error::Config(format!(
                "similarity_threshold must be within 0-100, got {}",
                self.similarity_threshold
            )));
        }
        if self.extraction_attempts == 0 {
            return Err(Error::Config("extraction_attempts must be at least 1".to_string()));
        }
        Ok(())
    }

    /// API key for live collaborator calls
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            Error::Config(
                "OpenAI API key not configured. Set OPENAI_API_KEY or add \
                 `api_key` under [openai] in the config file"
                    .to_string(),
            )
        })
    }
}

/// Find the config file to load, if any
///
/// An explicit path (CLI, then `GS_CONFIG`) must exist. The per-user default
/// (`<config_dir>/greenseam/config.toml`) is optional.
pub fn locate_config_file(explicit_path: Option<&Path>) -> Result<Option<PathBuf>> {
    let explicit = explicit_path
        .map(Path::to_path_buf)
        .or_else(|| env_string(CONFIG_PATH_ENV).map(PathBuf::from));

    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        return Ok(Some(path));
    }

    Ok(default_config_path().filter(|p| p.exists()))
}

/// Load a `.env` file from the working directory or its parents
///
/// Variables already present in the process environment win over the file.
/// Returns the path loaded, if one was found.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            debug!("Loaded environment file: {}", path.display());
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            warn!("Ignoring unreadable .env file: {}", e);
            None
        }
    }
}

/// Load a specific env file; unlike [`load_dotenv`] a missing file is an error
pub fn load_dotenv_from(path: &Path) -> Result<()> {
    dotenvy::from_path(path)
        .map_err(|e| Error::Config(format!("Read env file {} failed: {}", path.display(), e)))
}

/// Per-user config file location for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("greenseam").join("config.toml"))
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

fn pick<T>(cli: Option<T>, env: Option<T>, toml: Option<T>, default: T) -> T {
    cli.or(env).or(toml).unwrap_or(default)
}

/// Read a non-blank environment variable
fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| is_valid_key(v))
}

/// Read and parse an environment variable; a present but unparsable value is an error
fn env_parse<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_string(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::Config(format!("Invalid {}={:?}: {}", name, raw, e))),
        None => Ok(None),
    }
}
