//! Online clustering of hitter names into identities
//!
//! Names arrive one play at a time, in log order. Each canonical key is
//! scored against every identity created so far; the best match at or above
//! the policy threshold absorbs the play, otherwise the key founds a new
//! identity. This is greedy and single-pass: the first spelling seen becomes
//! the anchor for its cluster, so input order affects grouping.

use crate::plays::PlayRecord;
use crate::similarity::{Similarity, TokenSetRatio};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

pub use gs_common::config::TieBreak;

/// Threshold and tie-break for joining an existing identity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchPolicy {
    /// Minimum score (0-100) to join an existing identity
    pub threshold: f64,
    pub tie_break: TieBreak,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            threshold: gs_common::config::DEFAULT_SIMILARITY_THRESHOLD,
            tie_break: TieBreak::FirstCreated,
        }
    }
}

/// One real hitter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identity {
    /// Canonical key of the founding name
    pub key: String,
    /// Founding name as it appeared in the log
    pub display_name: String,
    /// Plays in assignment order
    pub plays: Vec<PlayRecord>,
}

/// Outcome of assigning one play
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Assignment {
    Joined { index: usize, score: f64 },
    Created { index: usize },
}

/// Growing set of identities queried by similarity
pub struct IdentityResolver {
    scorer: Box<dyn Similarity>,
    policy: MatchPolicy,
    identities: Vec<Identity>,
    by_key: HashMap<String, usize>,
}

impl IdentityResolver {
    /// Resolver using the token-set ratio
    pub fn new(policy: MatchPolicy) -> Self {
        Self::with_scorer(Box::new(TokenSetRatio), policy)
    }

    pub fn with_scorer(scorer: Box<dyn Similarity>, policy: MatchPolicy) -> Self {
        Self {
            scorer,
            policy,
            identities: Vec::new(),
            by_key: HashMap::new(),
        }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Best-scoring existing identity for `key`, regardless of threshold
    pub fn best_match(&self, key: &str) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;

        for (index, identity) in self.identities.iter().enumerate() {
            let score = self.scorer.score(key, &identity.key);
            let better = match best {
                None => true,
                Some((best_index, best_score)) => {
                    score > best_score
                        || (score == best_score
                            && self.policy.tie_break == TieBreak::MostRecords
                            && identity.plays.len() > self.identities[best_index].plays.len())
                }
            };
            if better {
                best = Some((index, score));
            }
        }

        best
    }

    /// Route one validated play to an identity
    pub fn assign(&mut self, raw_name: &str, key: String, play: PlayRecord) -> Assignment {
        if let Some((index, score)) = self.best_match(&key) {
            if score >= self.policy.threshold {
                debug!(
                    key = %key,
                    identity = %self.identities[index].key,
                    score,
                    "Joined existing identity"
                );
                self.identities[index].plays.push(play);
                return Assignment::Joined { index, score };
            }
        }

        let index = self.identities.len();
        debug!(key = %key, index, "New identity");
        self.by_key.insert(key.clone(), index);
        self.identities.push(Identity {
            key,
            display_name: raw_name.trim().to_string(),
            plays: vec![play],
        });
        Assignment::Created { index }
    }

    /// Identities in creation order
    pub fn identities(&self) -> &[Identity] {
        &self.identities
    }

    pub fn get(&self, key: &str) -> Option<&Identity> {
        self.by_key.get(key).map(|&i| &self.identities[i])
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Plays across all identities
    pub fn total_plays(&self) -> usize {
        self.identities.iter().map(|i| i.plays.len()).sum()
    }

    pub fn into_identities(self) -> Vec<Identity> {
        self.identities
    }
}

/// Cluster `(raw_name, canonical_key, play)` triples in order
pub fn resolve_identities<I>(triples: I, policy: MatchPolicy) -> Vec<Identity>
where
    I: IntoIterator<Item = (String, String, PlayRecord)>,
{
    let mut resolver = IdentityResolver::new(policy);
    for (raw_name, key, play) in triples {
        resolver.assign(&raw_name, key, play);
    }
    resolver.into_identities()
}
