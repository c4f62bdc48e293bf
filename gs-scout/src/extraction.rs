//! Play extraction collaborator and response validation
//!
//! The collaborator turns one text window into a raw JSON string. This
//! module owns everything after that: shape validation of the
//! `{"plays": [...]}` envelope, dropping malformed entries, and the bounded
//! retry loop that turns repeated bad output into
//! [`ScoutError::ExtractionFailed`].

use crate::chunker::TextWindow;
use crate::error::{ScoutError, ScoutResult};
use crate::plays::PlayRecord;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Characters of a raw response shown in debug logs
const PREVIEW_CHARS: usize = 120;

/// Source of raw extraction responses, one call per window
#[async_trait]
pub trait PlayExtractor: Send + Sync {
    /// Extractor name for logging
    fn name(&self) -> &'static str;

    /// Raw response text for one window
    async fn extract(&self, window: &str) -> ScoutResult<String>;
}

/// Plays recovered from one response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPlays {
    pub plays: Vec<PlayRecord>,
    /// Entries present in the list but not readable as plays
    pub dropped: usize,
}

#[derive(Deserialize)]
struct PlaysEnvelope {
    plays: Vec<serde_json::Value>,
}

/// Validate a raw response and pull out its plays
///
/// The response must be a JSON object with a `plays` array, otherwise the
/// error string describes why. Entries that are not `{name, result,
/// battedBall?}` with a known result are skipped and counted.
pub fn parse_plays_response(raw: &str) -> Result<ParsedPlays, String> {
    let envelope: PlaysEnvelope =
        serde_json::from_str(raw.trim()).map_err(|e| format!("invalid plays JSON: {}", e))?;

    let mut parsed = ParsedPlays::default();
    for entry in envelope.plays {
        match serde_json::from_value::<PlayRecord>(entry) {
            Ok(play) => parsed.plays.push(play),
            Err(e) => {
                debug!(error = %e, "Dropping malformed play entry");
                parsed.dropped += 1;
            }
        }
    }
    Ok(parsed)
}

/// Extract one window, retrying on malformed output or collaborator errors
pub async fn extract_plays(
    extractor: &dyn PlayExtractor,
    window: &TextWindow,
    attempts: u32,
) -> ScoutResult<ParsedPlays> {
    let mut last_reason = String::from("no attempts made");

    for attempt in 1..=attempts {
        let outcome = extractor
            .extract(&window.text)
            .await
            .and_then(|raw| {
                debug!(
                    window = window.index,
                    attempt,
                    preview = %preview(&raw),
                    "Extraction response"
                );
                parse_plays_response(&raw).map_err(ScoutError::Collaborator)
            });

        match outcome {
            Ok(parsed) => {
                debug!(
                    window = window.index,
                    attempt,
                    plays = parsed.plays.len(),
                    dropped = parsed.dropped,
                    "Window extracted"
                );
                return Ok(parsed);
            }
            Err(e) => {
                warn!(
                    window = window.index,
                    attempt,
                    max_attempts = attempts,
                    extractor = extractor.name(),
                    "Unusable extraction response: {}",
                    e
                );
                last_reason = e.to_string();
            }
        }
    }

    Err(ScoutError::ExtractionFailed {
        window: window.index,
        attempts,
        reason: last_reason,
    })
}

fn preview(raw: &str) -> String {
    let mut out: String = raw.chars().take(PREVIEW_CHARS).collect();
    if raw.chars().count() > PREVIEW_CHARS {
        out.push('…');
    }
    out
}

/// Replays a fixed queue of responses, one per call
///
/// `Err` entries simulate a failed request. Once the queue is empty every
/// call fails.
pub struct ScriptedExtractor {
    responses: Mutex<VecDeque<Result<String, String>>>,
    windows_seen: Mutex<Vec<String>>,
}

impl ScriptedExtractor {
    pub fn new<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = Result<String, String>>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            windows_seen: Mutex::new(Vec::new()),
        }
    }

    /// Every call succeeds with the next response
    pub fn from_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(responses.into_iter().map(|r| Ok(r.into())))
    }

    /// Load a JSON array of raw response strings
    pub fn from_file(path: &Path) -> ScoutResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let responses: Vec<String> = serde_json::from_str(&content).map_err(|e| {
            ScoutError::Config(format!(
                "Replay file {} must be a JSON array of strings: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self::from_responses(responses))
    }

    /// Window texts received so far, in call order
    pub fn windows_seen(&self) -> Vec<String> {
        self.windows_seen
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl PlayExtractor for ScriptedExtractor {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn extract(&self, window: &str) -> ScoutResult<String> {
        if let Ok(mut seen) = self.windows_seen.lock() {
            seen.push(window.to_string());
        }
        let next = self
            .responses
            .lock()
            .map_err(|_| ScoutError::Collaborator("scripted extractor poisoned".to_string()))?
            .pop_front();

        match next {
            Some(Ok(raw)) => Ok(raw),
            Some(Err(message)) => Err(ScoutError::Collaborator(message)),
            None => Err(ScoutError::Collaborator(
                "scripted extractor has no responses left".to_string(),
            )),
        }
    }
}
