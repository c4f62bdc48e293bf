//! gs-scout - Greenseam scouting report generator
//!
//! Reads one game log, prints the per-hitter table and the scouting report.
//! Logs go to stderr; stdout carries only the table and the report.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gs_common::{ConfigOverrides, NameScorer, ScoutConfig, TieBreak};
use gs_scout::chunker::BpeTokenizer;
use gs_scout::extraction::{PlayExtractor, ScriptedExtractor};
use gs_scout::openai_client::OpenAiClient;
use gs_scout::report::{PlainReportWriter, ReportWriter};
use gs_scout::ScoutPipeline;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GS_GIT_HASH"),
    ", built ",
    env!("GS_BUILD_TIMESTAMP"),
    ")"
);

/// Command-line arguments for gs-scout
#[derive(Parser, Debug)]
#[command(name = "gs-scout")]
#[command(about = "Turn a baseball game log into a hitter scouting report")]
#[command(version = VERSION)]
struct Args {
    /// Game log text file
    input: PathBuf,

    /// Config file (default: <config dir>/greenseam/config.toml)
    #[arg(short, long, env = "GS_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose logging, including raw extraction responses
    #[arg(long)]
    debug: bool,

    /// Maximum tokens per extraction window
    #[arg(long)]
    window_tokens: Option<usize>,

    /// Tokens shared by consecutive windows
    #[arg(long)]
    overlap_tokens: Option<usize>,

    /// Name similarity needed to merge into an existing hitter (0-100)
    #[arg(long)]
    threshold: Option<f64>,

    /// Minimum plate appearances for a hitter to be reported
    #[arg(long)]
    min_pa: Option<u32>,

    /// Name matcher: token_set or levenshtein
    #[arg(long, value_parser = NameScorer::from_str)]
    scorer: Option<NameScorer>,

    /// Winner among equally similar hitters: first_created or most_records
    #[arg(long, value_parser = TieBreak::from_str)]
    tie_break: Option<TieBreak>,

    /// Skip the report-generation call
    #[arg(long)]
    no_report: bool,

    /// Write the report without a language model
    #[arg(long, conflicts_with = "no_report")]
    plain_report: bool,

    /// Write the per-hitter aggregate view as JSON
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Replay extraction responses from a JSON array of strings instead of calling the API
    #[arg(long, value_name = "PATH")]
    replay: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            window_tokens: self.window_tokens,
            overlap_tokens: self.overlap_tokens,
            similarity_threshold: self.threshold,
            min_plate_appearances: self.min_pa,
            name_scorer: self.scorer,
            tie_break: self.tie_break,
            debug: self.debug,
        }
    }

    /// The API is needed unless extraction is replayed and the report is offline or skipped
    fn needs_api(&self) -> bool {
        self.replay.is_none() || !(self.no_report || self.plain_report)
    }
}

fn init_tracing(config: &ScoutConfig) {
    let level = if config.debug { "debug" } else { config.log_level.as_str() };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("gs_scout={level},gs_common={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before clap so `.env` values reach `env =` arguments too
    let env_file = gs_common::config::load_dotenv();
    let args = Args::parse();

    let config = ScoutConfig::resolve(args.config.as_deref(), &args.overrides())
        .context("Failed to resolve configuration")?;
    init_tracing(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git = env!("GS_GIT_HASH"),
        profile = env!("GS_BUILD_PROFILE"),
        "Starting gs-scout"
    );
    if let Some(path) = &env_file {
        info!(path = %path.display(), "Loaded environment file");
    }
    info!(
        window_tokens = config.window_tokens,
        overlap_tokens = config.overlap_tokens,
        threshold = config.similarity_threshold,
        min_pa = config.min_plate_appearances,
        scorer = ?config.name_scorer,
        tie_break = ?config.tie_break,
        "Configuration resolved"
    );

    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read game log {}", args.input.display()))?;
    let text = String::from_utf8_lossy(&bytes);

    let client = if args.needs_api() {
        Some(Arc::new(
            OpenAiClient::new(&config).context("OpenAI credentials required for this run")?,
        ))
    } else {
        None
    };

    let extractor: Arc<dyn PlayExtractor> = match (&args.replay, &client) {
        (Some(path), _) => {
            let scripted = ScriptedExtractor::from_file(path)
                .with_context(|| format!("Failed to load replay file {}", path.display()))?;
            Arc::new(scripted) as Arc<dyn PlayExtractor>
        }
        (None, Some(client)) => client.clone() as Arc<dyn PlayExtractor>,
        (None, None) => {
            anyhow::bail!("No extraction source: pass --replay or configure an API key")
        }
    };

    let report_writer: Option<Arc<dyn ReportWriter>> = if args.no_report {
        None
    } else if args.plain_report {
        Some(Arc::new(PlainReportWriter))
    } else {
        client.clone().map(|c| c as Arc<dyn ReportWriter>)
    };

    let tokenizer = BpeTokenizer::cl100k().context("Failed to load tokenizer")?;
    let pipeline = ScoutPipeline::new(config, Box::new(tokenizer), extractor)
        .context("Invalid pipeline configuration")?;

    let summary = pipeline.analyze(&text).await.context("Scouting run failed")?;

    print!("{}", summary.table());

    let view = summary.report_view();
    if let Some(path) = &args.json {
        let json = serde_json::to_string_pretty(&view)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "Wrote aggregate view");
    }

    if let Some(writer) = report_writer {
        info!(writer = writer.name(), "Generating report");
        let prose = writer
            .write_report(&view)
            .await
            .context("Report generation failed")?;
        println!();
        println!("{}", prose);
        println!();
    }

    Ok(())
}
