//! # Greenseam Common Library
//!
//! Shared code for the Greenseam tools:
//! - Error type used across crates
//! - Configuration loading (TOML file, environment, compiled defaults)

pub mod config;
pub mod error;

pub use config::{ConfigOverrides, NameScorer, ScoutConfig, TieBreak, TomlConfig};
pub use error::{Error, Result};
