//! Report collaborator input, console table, and an offline report writer

use crate::error::ScoutResult;
use crate::pipeline::HitterStats;
use crate::posterior::OutcomeClass;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Hitters below this many PA never get an exploit bullet
pub const BULLET_MIN_PA: u32 = 15;
/// Best-outcome posterior needed for an exploit bullet
pub const BULLET_MIN_CONFIDENCE: f64 = 0.40;

const NAME_WIDTH: usize = 20;
const HITTER_SEPARATOR: &str = "⸻";

/// Per-hitter numbers handed to the report writer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReportEntry {
    pub pa: u32,
    /// Batting average, 3 decimals
    pub avg: f64,
    pub gb: u32,
    pub ld: u32,
    pub fb: u32,
    /// Posterior of the best outcome, 4 decimals
    pub confidence: f64,
    pub best: OutcomeClass,
}

impl ReportEntry {
    pub fn from_stats(stats: &HitterStats) -> Self {
        Self {
            pa: stats.tally.pa,
            avg: round_to(stats.rates.avg, 3),
            gb: stats.tally.gb,
            ld: stats.tally.ld,
            fb: stats.tally.fb,
            confidence: round_to(stats.posterior.confidence, 4),
            best: stats.posterior.best_outcome,
        }
    }
}

/// `{ "<hitter>": {pa, avg, gb, ld, fb, confidence, best} }`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ReportView {
    pub hitters: BTreeMap<String, ReportEntry>,
}

impl ReportView {
    pub fn from_hitters(hitters: &[HitterStats]) -> Self {
        let mut view = Self::default();
        for stats in hitters {
            let mut name = stats.name.clone();
            if view.hitters.contains_key(&name) {
                name = format!("{} ({})", stats.name, stats.key);
            }
            view.hitters.insert(name, ReportEntry::from_stats(stats));
        }
        view
    }

    pub fn to_json(&self) -> String {
        // A map of plain numbers and strings always serializes
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.hitters.is_empty()
    }

    /// Entries by PA descending, then name
    pub fn by_plate_appearances(&self) -> Vec<(&str, &ReportEntry)> {
        let mut entries: Vec<_> = self
            .hitters
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
            .collect();
        entries.sort_by(|a, b| b.1.pa.cmp(&a.1.pa));
        entries
    }
}

/// Turns the aggregate view into prose
#[async_trait]
pub trait ReportWriter: Send + Sync {
    fn name(&self) -> &'static str;

    async fn write_report(&self, view: &ReportView) -> ScoutResult<String>;
}

/// Deterministic report without a language model
///
/// Same shape the scout prompt asks for: hitters by PA, one exploit bullet
/// for confident reads, separated by `⸻`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainReportWriter;

#[async_trait]
impl ReportWriter for PlainReportWriter {
    fn name(&self) -> &'static str {
        "plain"
    }

    async fn write_report(&self, view: &ReportView) -> ScoutResult<String> {
        Ok(plain_report(view))
    }
}

pub fn plain_report(view: &ReportView) -> String {
    view.by_plate_appearances()
        .into_iter()
        .map(|(name, entry)| {
            if entry.pa >= BULLET_MIN_PA && entry.confidence >= BULLET_MIN_CONFIDENCE {
                format!(
                    "#{}\nPitching Strategy:\n    • {}",
                    name,
                    exploit_bullet(entry)
                )
            } else {
                format!("#{} – no confident exploit.", name)
            }
        })
        .collect::<Vec<_>>()
        .join(&format!("\n{}\n", HITTER_SEPARATOR))
}

fn exploit_bullet(entry: &ReportEntry) -> &'static str {
    match entry.best {
        OutcomeClass::K => "Finish with chase pitches; he strikes out more than anything else.",
        OutcomeClass::Hit => "Stay off the heart of the plate; he punishes mistakes.",
        OutcomeClass::Walk => "Get ahead early; he takes pitches and works walks.",
        OutcomeClass::Hbp => "Work away; he crowds the plate and wears pitches inside.",
        OutcomeClass::Out if entry.gb > entry.fb && entry.gb >= entry.ld => {
            "Keep the ball down; he rolls over into ground outs."
        }
        OutcomeClass::Out if entry.fb > entry.gb && entry.fb >= entry.ld => {
            "Elevate fastballs; he lifts them into routine fly outs."
        }
        OutcomeClass::Out => "Attack the zone; his contact mostly turns into outs.",
    }
}

/// Fixed-width `Player PA AVG OBP K%` table, one row per hitter in the order given
pub fn format_table(hitters: &[HitterStats]) -> String {
    let mut out = format!(
        "{:<w$}{:>4}{:>6}{:>6}{:>6}\n",
        "Player",
        "PA",
        "AVG",
        "OBP",
        "K%",
        w = NAME_WIDTH
    );
    for stats in hitters {
        let name: String = stats.name.chars().take(NAME_WIDTH).collect();
        let _ = writeln!(
            out,
            "{:<w$}{:>4}{:>6.3}{:>6.3}{:>6.1}",
            name,
            stats.tally.pa,
            stats.rates.avg,
            stats.rates.obp,
            stats.rates.k_pct,
            w = NAME_WIDTH
        );
    }
    out
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
