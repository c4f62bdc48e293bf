//! gs-scout: game log to scouting report
//!
//! Raw play-by-play text is cut into token windows, turned into play records
//! by an extraction collaborator, filtered and clustered into hitter
//! identities, reduced to count statistics and a smoothed outcome
//! distribution, and finally handed to a report collaborator.

pub mod aggregator;
pub mod chunker;
pub mod error;
pub mod extraction;
pub mod identity_resolver;
pub mod openai_client;
pub mod pipeline;
pub mod plays;
pub mod posterior;
pub mod report;
pub mod similarity;
pub mod validator;

pub use crate::error::{ScoutError, ScoutResult};
pub use crate::pipeline::{HitterStats, ScoutPipeline, ScoutingSummary};
pub use crate::plays::{BattedBallKind, OutcomeKind, PlayRecord};
