//! Scout pipeline orchestration
//!
//! chunk → extract → validate → resolve → aggregate → filter → estimate.
//! Windows are processed strictly in order; each extraction call is awaited
//! before the next is issued, so identity formation follows log order.

use crate::aggregator::{aggregate, RateLine, Tally};
use crate::chunker::{Chunker, Tokenizer};
use crate::error::{ScoutError, ScoutResult};
use crate::extraction::{extract_plays, PlayExtractor};
use crate::identity_resolver::{IdentityResolver, MatchPolicy};
use crate::posterior::{estimate, PosteriorEstimate};
use crate::report::{format_table, ReportView};
use crate::similarity::scorer_for;
use crate::validator::{canonical_key, NameValidator};
use gs_common::ScoutConfig;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Aggregates for one qualifying hitter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HitterStats {
    /// Display name (founding raw name of the identity)
    pub name: String,
    /// Canonical key of the identity
    pub key: String,
    pub tally: Tally,
    pub rates: RateLine,
    pub posterior: PosteriorEstimate,
}

/// Result of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoutingSummary {
    /// Qualifying hitters, PA descending, ties in first-seen order
    pub hitters: Vec<HitterStats>,
    pub windows: usize,
    /// Windows skipped for holding only whitespace
    pub blank_windows: usize,
    pub plays_extracted: usize,
    /// Entries dropped for missing name or unknown result
    pub plays_dropped: usize,
    pub names_rejected: usize,
    pub identities_formed: usize,
}

impl ScoutingSummary {
    pub fn report_view(&self) -> ReportView {
        ReportView::from_hitters(&self.hitters)
    }

    pub fn table(&self) -> String {
        format_table(&self.hitters)
    }

    pub fn hitter(&self, name: &str) -> Option<&HitterStats> {
        self.hitters.iter().find(|h| h.name == name)
    }
}

pub struct ScoutPipeline {
    config: ScoutConfig,
    tokenizer: Box<dyn Tokenizer>,
    extractor: Arc<dyn PlayExtractor>,
    validator: NameValidator,
    policy: MatchPolicy,
}

impl ScoutPipeline {
    /// Fails on chunker parameters that could never produce windows
    pub fn new(
        config: ScoutConfig,
        tokenizer: Box<dyn Tokenizer>,
        extractor: Arc<dyn PlayExtractor>,
    ) -> ScoutResult<Self> {
        Chunker::new(tokenizer.as_ref(), config.window_tokens, config.overlap_tokens)?;
        if config.extraction_attempts == 0 {
            return Err(ScoutError::Config(
                "extraction_attempts must be at least 1".to_string(),
            ));
        }

        let validator = NameValidator::new(&config.stop_words);
        let policy = MatchPolicy {
            threshold: config.similarity_threshold,
            tie_break: config.tie_break,
        };

        Ok(Self {
            config,
            tokenizer,
            extractor,
            validator,
            policy,
        })
    }

    pub fn config(&self) -> &ScoutConfig {
        &self.config
    }

    /// Run the full pipeline over one game log
    pub async fn analyze(&self, text: &str) -> ScoutResult<ScoutingSummary> {
        let chunker = Chunker::new(
            self.tokenizer.as_ref(),
            self.config.window_tokens,
            self.config.overlap_tokens,
        )?;
        let windows = chunker.windows(text);
        info!(
            tokenizer = self.tokenizer.name(),
            total_tokens = windows.total_tokens(),
            window_tokens = self.config.window_tokens,
            overlap_tokens = self.config.overlap_tokens,
            extractor = self.extractor.name(),
            "Starting scout pipeline"
        );

        let scorer = scorer_for(self.config.name_scorer);
        debug!(scorer = scorer.name(), tie_break = ?self.policy.tie_break, "Identity matching");
        let mut resolver = IdentityResolver::with_scorer(scorer, self.policy);
        let mut window_count = 0;
        let mut blank_windows = 0;
        let mut plays_extracted = 0;
        let mut plays_dropped = 0;
        let mut names_rejected = 0;

        for window in windows {
            window_count += 1;

            if window.text.trim().is_empty() {
                debug!(window = window.index, "Skipping blank window");
                blank_windows += 1;
                continue;
            }

            let parsed =
                extract_plays(self.extractor.as_ref(), &window, self.config.extraction_attempts)
                    .await?;
            plays_extracted += parsed.plays.len();
            plays_dropped += parsed.dropped;

            for play in parsed.plays {
                match self.validator.check(&play.raw_name) {
                    Ok(()) => {
                        let raw_name = play.raw_name.clone();
                        let key = canonical_key(&raw_name);
                        resolver.assign(&raw_name, key, play);
                    }
                    Err(reason) => {
                        debug!(name = %play.raw_name, ?reason, "Rejected name");
                        names_rejected += 1;
                    }
                }
            }
        }

        let identities_formed = resolver.len();
        let min_pa = self.config.min_plate_appearances;

        let mut hitters: Vec<HitterStats> = resolver
            .into_identities()
            .into_iter()
            .filter_map(|identity| {
                let tally = aggregate(&identity.plays);
                if !tally.qualifies(min_pa) {
                    debug!(key = %identity.key, pa = tally.pa, "Below minimum PA");
                    return None;
                }
                Some(HitterStats {
                    name: identity.display_name,
                    key: identity.key,
                    rates: tally.rates(),
                    posterior: estimate(&tally),
                    tally,
                })
            })
            .collect();

        if hitters.is_empty() {
            return Err(ScoutError::NoQualifyingIdentity {
                min_plate_appearances: min_pa,
            });
        }

        // Stable: equal PA keeps identity creation order
        hitters.sort_by(|a, b| b.tally.pa.cmp(&a.tally.pa));

        info!(
            windows = window_count,
            plays = plays_extracted,
            dropped = plays_dropped,
            rejected = names_rejected,
            identities = identities_formed,
            hitters = hitters.len(),
            "Scout pipeline complete"
        );

        Ok(ScoutingSummary {
            hitters,
            windows: window_count,
            blank_windows,
            plays_extracted,
            plays_dropped,
            names_rejected,
            identities_formed,
        })
    }
}
