//! Box-score tallies per identity
//!
//! A [`Tally`] is always recomputed from the identity's full play list; the
//! play list is the source of truth.

use crate::plays::{BattedBallKind, OutcomeKind, PlayRecord};
use serde::Serialize;

/// Count statistics for one hitter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub pa: u32,
    pub ab: u32,
    pub h: u32,
    pub bb: u32,
    pub hbp: u32,
    pub k: u32,
    /// Ground balls
    pub gb: u32,
    /// Line drives
    pub ld: u32,
    /// Fly balls (popups excluded)
    pub fb: u32,
}

impl Tally {
    /// Fold one play into the counts
    pub fn record(&mut self, play: &PlayRecord) {
        self.pa += 1;
        if play.result.is_at_bat() {
            self.ab += 1;
        }
        if play.result.is_hit() {
            self.h += 1;
        }
        match play.result {
            OutcomeKind::Walk => self.bb += 1,
            OutcomeKind::Hbp => self.hbp += 1,
            OutcomeKind::Strikeout => self.k += 1,
            _ => {}
        }
        match play.batted_ball {
            BattedBallKind::Ground => self.gb += 1,
            BattedBallKind::Line => self.ld += 1,
            BattedBallKind::Fly => self.fb += 1,
            BattedBallKind::Popup | BattedBallKind::None => {}
        }
    }

    /// Enough plate appearances to report on
    pub fn qualifies(&self, min_plate_appearances: u32) -> bool {
        self.pa >= min_plate_appearances
    }

    pub fn rates(&self) -> RateLine {
        RateLine::from_tally(self)
    }
}

/// Single reduction pass over a play list
pub fn aggregate(plays: &[PlayRecord]) -> Tally {
    plays.iter().fold(Tally::default(), |mut tally, play| {
        tally.record(play);
        tally
    })
}

/// Rate statistics derived from a [`Tally`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RateLine {
    /// Batting average, h / ab
    pub avg: f64,
    /// On-base percentage, (h + bb + hbp) / pa
    pub obp: f64,
    /// Strikeouts per 100 PA
    pub k_pct: f64,
    /// Walks per 100 PA
    pub bb_pct: f64,
    /// Share of tracked batted balls, in percent
    pub gb_pct: f64,
    pub ld_pct: f64,
    pub fb_pct: f64,
}

impl RateLine {
    pub fn from_tally(t: &Tally) -> Self {
        let batted = t.gb + t.ld + t.fb;
        Self {
            avg: ratio(t.h, t.ab),
            obp: ratio(t.h + t.bb + t.hbp, t.pa),
            k_pct: 100.0 * ratio(t.k, t.pa),
            bb_pct: 100.0 * ratio(t.bb, t.pa),
            gb_pct: 100.0 * ratio(t.gb, batted),
            ld_pct: 100.0 * ratio(t.ld, batted),
            fb_pct: 100.0 * ratio(t.fb, batted),
        }
    }
}

fn ratio(num: u32, den: u32) -> f64 {
    if den == 0 {
        0.0
    } else {
        f64::from(num) / f64::from(den)
    }
}
