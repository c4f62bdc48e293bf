//! Play records produced by the extraction collaborator
//!
//! One [`PlayRecord`] per plate appearance. Field names on the wire follow
//! the extraction prompt: `{"name", "result", "battedBall"}`.
//!
//! Models do not always stick to the prompt's spelling, so `result` and
//! `battedBall` are read case-insensitively, ignoring spaces and
//! punctuation, with common scorebook abbreviations accepted ("HR", "BB",
//! "K", "hit by pitch", "line drive").

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// Plate appearance result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum OutcomeKind {
    Single,
    Double,
    Triple,
    HomeRun,
    GroundOut,
    FlyOut,
    LineOut,
    Strikeout,
    Walk,
    #[serde(rename = "HBP")]
    Hbp,
}

impl OutcomeKind {
    pub fn is_hit(self) -> bool {
        matches!(
            self,
            OutcomeKind::Single | OutcomeKind::Double | OutcomeKind::Triple | OutcomeKind::HomeRun
        )
    }

    /// Walks and hit-by-pitch do not count as at-bats
    pub fn is_at_bat(self) -> bool {
        !matches!(self, OutcomeKind::Walk | OutcomeKind::Hbp)
    }
}

impl FromStr for OutcomeKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let kind = match lookup_key(raw).as_str() {
            "single" | "1b" => OutcomeKind::Single,
            "double" | "2b" => OutcomeKind::Double,
            "triple" | "3b" => OutcomeKind::Triple,
            "homerun" | "hr" | "homer" => OutcomeKind::HomeRun,
            "groundout" | "fielderschoice" | "fc" => OutcomeKind::GroundOut,
            "flyout" | "popout" | "popupout" | "foulout" => OutcomeKind::FlyOut,
            "lineout" => OutcomeKind::LineOut,
            "strikeout" | "struckout" | "k" | "so" => OutcomeKind::Strikeout,
            "walk" | "walked" | "bb" | "baseonballs" | "ibb" | "intentionalwalk" => {
                OutcomeKind::Walk
            }
            "hbp" | "hitbypitch" => OutcomeKind::Hbp,
            _ => return Err(format!("unknown result {:?}", raw)),
        };
        Ok(kind)
    }
}

impl TryFrom<String> for OutcomeKind {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

/// Batted ball classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>")]
pub enum BattedBallKind {
    Ground,
    Line,
    Fly,
    Popup,
    /// No ball in play (strikeout, walk, HBP) or not reported
    #[default]
    None,
}

impl BattedBallKind {
    /// Lenient parse; anything unrecognized counts as no tracked batted ball
    pub fn parse_lenient(raw: &str) -> Self {
        match lookup_key(raw).as_str() {
            "ground" | "grounder" | "groundball" | "gb" => BattedBallKind::Ground,
            "line" | "linedrive" | "liner" | "ld" => BattedBallKind::Line,
            "fly" | "flyball" | "fb" => BattedBallKind::Fly,
            "popup" | "popfly" | "pop" => BattedBallKind::Popup,
            "" | "none" | "na" | "null" => BattedBallKind::None,
            _ => {
                debug!(batted_ball = raw, "Unrecognized batted ball type");
                BattedBallKind::None
            }
        }
    }
}

impl From<Option<String>> for BattedBallKind {
    fn from(raw: Option<String>) -> Self {
        raw.as_deref()
            .map(Self::parse_lenient)
            .unwrap_or_default()
    }
}

/// Lower-case alphanumerics only: "Fielder's Choice" -> "fielderschoice"
fn lookup_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// One plate appearance as reported by the extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayRecord {
    /// Hitter name exactly as extracted (untrusted)
    #[serde(rename = "name")]
    pub raw_name: String,

    pub result: OutcomeKind,

    #[serde(rename = "battedBall", default)]
    pub batted_ball: BattedBallKind,
}

impl PlayRecord {
    pub fn new(
        raw_name: impl Into<String>,
        result: OutcomeKind,
        batted_ball: BattedBallKind,
    ) -> Self {
        Self {
            raw_name: raw_name.into(),
            result,
            batted_ball,
        }
    }
}
