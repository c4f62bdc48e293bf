//! Smoothed outcome distribution per hitter
//!
//! Five outcome classes, add-one (Laplace) smoothing:
//! `p(c) = (count(c) + 1) / (total + 5)`.

use crate::aggregator::Tally;
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// Outcome classes, in tie-break order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OutcomeClass {
    Hit,
    Out,
    K,
    Walk,
    #[serde(rename = "HBP")]
    Hbp,
}

impl OutcomeClass {
    pub const ALL: [OutcomeClass; 5] = [
        OutcomeClass::Hit,
        OutcomeClass::Out,
        OutcomeClass::K,
        OutcomeClass::Walk,
        OutcomeClass::Hbp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeClass::Hit => "Hit",
            OutcomeClass::Out => "Out",
            OutcomeClass::K => "K",
            OutcomeClass::Walk => "Walk",
            OutcomeClass::Hbp => "HBP",
        }
    }
}

impl fmt::Display for OutcomeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Most likely outcome class with the full smoothed distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PosteriorEstimate {
    pub best_outcome: OutcomeClass,
    /// Posterior probability of `best_outcome`
    pub confidence: f64,
    /// Posterior per class, indexed like [`OutcomeClass::ALL`]
    pub distribution: [f64; 5],
}

impl PosteriorEstimate {
    pub fn probability(&self, class: OutcomeClass) -> f64 {
        self.distribution[class as usize]
    }
}

/// Raw class counts, indexed like [`OutcomeClass::ALL`]
///
/// `Out = ab - h - k` is computed in signed arithmetic so that an
/// inconsistent tally is visible to the caller instead of wrapping.
pub fn class_counts(tally: &Tally) -> [i64; 5] {
    let ab = i64::from(tally.ab);
    let h = i64::from(tally.h);
    let k = i64::from(tally.k);
    [h, ab - h - k, k, i64::from(tally.bb), i64::from(tally.hbp)]
}

/// Laplace-smoothed posterior and its argmax
///
/// A negative raw count (only possible for a tally with `k > ab - h`) is
/// clamped to zero so the result stays a distribution.
pub fn estimate(tally: &Tally) -> PosteriorEstimate {
    let raw = class_counts(tally);
    let counts = raw.map(|c| c.max(0));
    if counts != raw {
        warn!(
            ab = tally.ab,
            h = tally.h,
            k = tally.k,
            "Negative outcome count clamped to zero"
        );
    }

    let total: i64 = counts.iter().sum();
    let denominator = (total + OutcomeClass::ALL.len() as i64) as f64;
    let distribution = counts.map(|c| (c + 1) as f64 / denominator);

    // First maximum wins
    let mut best = 0;
    for (i, &p) in distribution.iter().enumerate().skip(1) {
        if p > distribution[best] {
            best = i;
        }
    }

    PosteriorEstimate {
        best_outcome: OutcomeClass::ALL[best],
        confidence: distribution[best],
        distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_strikeouts() {
        let tally = Tally {
            pa: 3,
            ab: 3,
            k: 3,
            ..Tally::default()
        };
        assert_eq!(class_counts(&tally), [0, 0, 3, 0, 0]);

        let est = estimate(&tally);
        assert_eq!(est.best_outcome, OutcomeClass::K);
        assert_eq!(est.confidence, 0.5);
        assert_eq!(est.probability(OutcomeClass::Hit), 0.125);
    }

    #[test]
    fn test_empty_tally_ties_to_hit() {
        let est = estimate(&Tally::default());
        assert_eq!(est.best_outcome, OutcomeClass::Hit);
        assert_eq!(est.confidence, 0.2);
    }

    #[test]
    fn test_tie_break_follows_class_order() {
        // One walk and one strikeout: K comes before Walk
        let tally = Tally {
            pa: 2,
            ab: 1,
            k: 1,
            bb: 1,
            ..Tally::default()
        };
        let est = estimate(&tally);
        assert_eq!(est.best_outcome, OutcomeClass::K);
        assert!((est.confidence - 2.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_outs_dominate() {
        let tally = Tally {
            pa: 6,
            ab: 6,
            h: 1,
            k: 1,
            ..Tally::default()
        };
        let est = estimate(&tally);
        assert_eq!(est.best_outcome, OutcomeClass::Out);
        assert!((est.confidence - 5.0 / 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_negative_out_count_is_clamped() {
        let tally = Tally {
            pa: 3,
            ab: 1,
            k: 3,
            ..Tally::default()
        };
        assert_eq!(class_counts(&tally)[1], -2);

        let est = estimate(&tally);
        assert_eq!(est.probability(OutcomeClass::Out), 1.0 / 8.0);
        assert_eq!(est.best_outcome, OutcomeClass::K);
        let sum: f64 = est.distribution.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_confidence_in_open_unit_interval() {
        let tally = Tally {
            pa: 50,
            ab: 50,
            h: 50,
            ..Tally::default()
        };
        let est = estimate(&tally);
        assert!(est.confidence > 0.0 && est.confidence < 1.0);
    }

    #[test]
    fn test_class_names() {
        assert_eq!(OutcomeClass::Hbp.to_string(), "HBP");
        assert_eq!(serde_json::to_string(&OutcomeClass::Hbp).unwrap(), "\"HBP\"");
    }
}
