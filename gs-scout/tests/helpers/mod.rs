//! Shared fixtures for gs-scout integration tests

#![allow(dead_code)]

pub mod log_capture;

pub use log_capture::LogCapture;

use gs_common::ScoutConfig;
use gs_scout::chunker::CharTokenizer;
use gs_scout::extraction::ScriptedExtractor;
use gs_scout::ScoutPipeline;
use serde_json::json;
use std::sync::Arc;

/// Window large enough that every test log is a single window
pub const ONE_WINDOW: usize = 4096;

/// Defaults with the given window geometry
pub fn test_config(window_tokens: usize, overlap_tokens: usize) -> ScoutConfig {
    ScoutConfig {
        window_tokens,
        overlap_tokens,
        ..ScoutConfig::default()
    }
}

/// Extraction response body for `(name, result, battedBall)` triples
pub fn plays_response(plays: &[(&str, &str, &str)]) -> String {
    let entries: Vec<_> = plays
        .iter()
        .map(|(name, result, batted)| json!({"name": name, "result": result, "battedBall": batted}))
        .collect();
    json!({ "plays": entries }).to_string()
}

/// Pipeline over char tokens with a scripted extractor
pub fn scripted_pipeline(
    config: ScoutConfig,
    responses: Vec<String>,
) -> (ScoutPipeline, Arc<ScriptedExtractor>) {
    let extractor = Arc::new(ScriptedExtractor::from_responses(responses));
    let pipeline = ScoutPipeline::new(config, Box::new(CharTokenizer), extractor.clone())
        .expect("valid pipeline config");
    (pipeline, extractor)
}

/// One game's worth of plays for three Adams-family hitters and a part-timer
///
/// "Jon Adams" is a typo of "John Adams" (token-set ratio ~94.7) and merges;
/// "Jack Adams" scores 70 against him and stays separate.
pub fn adams_game() -> String {
    plays_response(&[
        ("John Adams", "Single", "Ground"),
        ("Jack Adams", "HomeRun", "Fly"),
        ("Mike Lee", "Walk", "None"),
        ("John Adams", "Strikeout", "None"),
        ("Player1", "Single", "Line"),
        ("Jack Adams", "FlyOut", "Fly"),
        ("John Adams", "Walk", "None"),
        ("BRDG", "GroundOut", "Ground"),
        ("Mike Lee", "LineOut", "Line"),
        ("John Adams", "GroundOut", "Ground"),
        ("Jack Adams", "Double", "Line"),
        ("Jon Adams", "Strikeout", "None"),
    ])
}
