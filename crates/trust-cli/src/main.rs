//! Contributor Trust - command-line scoring
//!
//! The `trust` command scores contributors from a JSON state file and appends
//! new review events to it.
//!
//! ## Commands
//!
//! - `score`: Score one contributor
//! - `score-all`: Score every contributor in the state file
//! - `append`: Append a review event
//! - `ingest-webhook`: Append the event described by a review webhook payload
//! - `gate`: Check auto-merge eligibility (exit code 1 when blocked)
//! - `tiers`: Show the tier table

mod store;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::{info, Level};

use trust_core::metrics::METRICS;
use trust_core::telemetry::{init_tracing, LogFormat};
use trust_core::{
    evaluate_privilege, normalize_event, normalize_review_payload, obs, ConfigOverrides,
    PrivilegeRuleSet, RawEvent, RawTimestamp, ReviewSeverity, ReviewWebhook, ScoreResult,
    ScoringConfig, TrustLedger,
};

use crate::store::JsonFileStore;

#[derive(Parser)]
#[command(name = "trust")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Contributor trust scoring", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output and JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Contributor state file
    #[arg(long, global = true, env = "TRUST_STATE_FILE", default_value = "trust-state.json")]
    state: PathBuf,

    /// JSON file of scoring config overrides
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base configuration the overrides apply to
    #[arg(long, global = true, value_enum, default_value_t = Preset::Standard)]
    preset: Preset,

    /// Evaluation instant (RFC 3339 or epoch milliseconds; default: now)
    #[arg(long, global = true)]
    now: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    Standard,
    HighVelocity,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one contributor
    Score {
        contributor: String,
    },

    /// Score every contributor in the state file
    ScoreAll,

    /// Append a review event to a contributor's history
    Append {
        contributor: String,

        /// approve, reject, close or selfClose
        #[arg(long = "type")]
        kind: String,

        /// RFC 3339 or epoch milliseconds
        #[arg(long)]
        timestamp: String,

        /// Lines changed by the pull request
        #[arg(long, default_value_t = 0)]
        lines: u64,

        /// PR label (repeatable)
        #[arg(long = "label")]
        labels: Vec<String>,

        /// Pull request number
        #[arg(long)]
        pr: Option<u64>,

        /// Review severity (critical, major, normal, minor, trivial)
        #[arg(long)]
        severity: Option<String>,

        /// Print the updated state without saving it
        #[arg(long)]
        dry_run: bool,
    },

    /// Append the event described by a review webhook payload
    IngestWebhook {
        /// Path to the webhook payload (JSON)
        payload: PathBuf,

        /// Print the updated state without saving it
        #[arg(long)]
        dry_run: bool,
    },

    /// Check whether a contributor may auto-merge
    Gate {
        contributor: String,
    },

    /// Show the tier table
    Tiers,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(LogFormat::from_json_flag(cli.json), level);

    let config = resolve_config(cli.preset, cli.config.as_deref())?;
    let now = resolve_now(cli.now.as_deref())?;

    let store = JsonFileStore::open(&cli.state)
        .with_context(|| format!("Failed to open state file {}", cli.state.display()))?;
    let ledger = TrustLedger::new(store, config);

    let outcome = match cli.command {
        Commands::Score { contributor } => cmd_score(&ledger, &contributor, now, cli.json),
        Commands::ScoreAll => cmd_score_all(&ledger, now, cli.json),
        Commands::Append {
            contributor,
            kind,
            timestamp,
            lines,
            labels,
            pr,
            severity,
            dry_run,
        } => {
            let raw = RawEvent {
                kind: Some(kind),
                timestamp: Some(RawTimestamp::Text(timestamp)),
                lines_changed: Some(Value::from(lines)),
                labels: Some(labels.into_iter().map(Value::from).collect()),
                pr_number: pr.map(Value::from),
                review_severity: severity,
            };
            cmd_append(&ledger, &contributor, raw, dry_run, cli.json)
        }
        Commands::IngestWebhook { payload, dry_run } => {
            cmd_ingest_webhook(&ledger, &payload, now, dry_run, cli.json)
        }
        Commands::Gate { contributor } => cmd_gate(&ledger, &contributor, now, cli.json),
        Commands::Tiers => cmd_tiers(ledger.config(), cli.json),
    };

    METRICS.flush();
    outcome
}

fn resolve_config(preset: Preset, overrides: Option<&Path>) -> Result<ScoringConfig> {
    let base = match preset {
        Preset::Standard => ScoringConfig::standard(),
        Preset::HighVelocity => ScoringConfig::high_velocity(),
    };
    let Some(path) = overrides else {
        return Ok(base);
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let overrides: ConfigOverrides = serde_json::from_str(&text)
        .with_context(|| format!("Invalid config overrides in {}", path.display()))?;
    Ok(base.with_overrides(&overrides))
}

fn resolve_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    let Some(text) = now else {
        return Ok(Utc::now());
    };
    let text = text.trim();
    if let Ok(ms) = text.parse::<i64>() {
        return DateTime::<Utc>::from_timestamp_millis(ms)
            .with_context(|| format!("--now out of range: {text}"));
    }
    let parsed = DateTime::parse_from_rfc3339(text)
        .with_context(|| format!("--now must be RFC 3339 or epoch milliseconds, got '{text}'"))?;
    Ok(parsed.with_timezone(&Utc))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_result(contributor: &str, result: &ScoreResult) {
    println!(
        "{:<24} {:>6.2}  {}",
        contributor, result.score, result.tier
    );
    for warning in &result.warnings {
        println!("  ! {}", warning);
    }
}

/// Score one contributor
fn cmd_score(
    ledger: &TrustLedger<JsonFileStore>,
    contributor: &str,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let result = ledger.score(contributor, now)?;
    if json {
        return print_json(&result);
    }

    print_result(contributor, &result);
    let b = &result.breakdown;
    println!(
        "  events: {}  gained: {:.2}  lost: {:.2}",
        b.event_count, b.positive_points, b.negative_points
    );
    if b.decay_applied > 0.0 || b.floor_applied > 0.0 {
        println!(
            "  inactive {:.1} days: decay -{:.2}, floor +{:.2}",
            b.inactivity_days, b.decay_applied, b.floor_applied
        );
    }
    println!("  {}", result.tier_info.meaning);
    Ok(())
}

/// Score every contributor
fn cmd_score_all(ledger: &TrustLedger<JsonFileStore>, now: DateTime<Utc>, json: bool) -> Result<()> {
    let results = ledger.score_all(now)?;
    if json {
        return print_json(&results);
    }

    if results.is_empty() {
        println!(
            "No contributors found in {}",
            ledger.store().path().display()
        );
        return Ok(());
    }
    for (contributor, result) in &results {
        print_result(contributor, result);
    }
    Ok(())
}

/// Append one review event
fn cmd_append(
    ledger: &TrustLedger<JsonFileStore>,
    contributor: &str,
    raw: RawEvent,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    if let Some(severity) = raw.review_severity.as_deref() {
        if ReviewSeverity::parse(severity).is_none() {
            anyhow::bail!("Unknown severity: {}", severity);
        }
    }
    let event = normalize_event(raw).context("Invalid event")?;
    let state = ledger.append_event(contributor, event, !dry_run)?;

    if json {
        return print_json(&state);
    }
    let verb = if dry_run { "Would append" } else { "Appended" };
    println!(
        "{} event to '{}' ({} events)",
        verb,
        contributor,
        state.events.len()
    );
    Ok(())
}

/// Append the event described by a webhook payload
fn cmd_ingest_webhook(
    ledger: &TrustLedger<JsonFileStore>,
    payload: &Path,
    received_at: DateTime<Utc>,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let text = std::fs::read_to_string(payload)
        .with_context(|| format!("Failed to read payload {}", payload.display()))?;
    let webhook: ReviewWebhook =
        serde_json::from_str(&text).context("Payload is not a review webhook")?;
    let review =
        normalize_review_payload(&webhook, received_at).context("Invalid review webhook")?;

    info!(
        contributor = %review.contributor,
        kind = %review.event.event_type,
        pr = ?review.event.pr_number,
        "Ingesting review webhook"
    );
    let state = ledger.append_event(&review.contributor, review.event, !dry_run)?;

    if json {
        return print_json(&state);
    }
    let verb = if dry_run { "Would append" } else { "Appended" };
    println!(
        "{} {} event to '{}' ({} events)",
        verb,
        state.events.last().map_or("?", |e| e.event_type.as_str()),
        review.contributor,
        state.events.len()
    );
    Ok(())
}

/// Check auto-merge eligibility
fn cmd_gate(
    ledger: &TrustLedger<JsonFileStore>,
    contributor: &str,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let result = ledger.score(contributor, now)?;
    let verdict = evaluate_privilege(
        &PrivilegeRuleSet::auto_merge(),
        &result,
        &ledger.config().tiers,
    );

    if json {
        let mut out = BTreeMap::new();
        out.insert("contributor", serde_json::to_value(contributor)?);
        out.insert("score", serde_json::to_value(result.score)?);
        out.insert("tier", serde_json::to_value(&result.tier)?);
        out.insert("passed", serde_json::to_value(verdict.passed())?);
        out.insert("violations", serde_json::to_value(&verdict.violations)?);
        print_json(&out)?;
    } else if verdict.passed() {
        println!(
            "✓ '{}' may auto-merge ({:.2}, {})",
            contributor, result.score, result.tier
        );
    } else {
        println!(
            "✗ '{}' may not auto-merge ({:.2}, {})",
            contributor, result.score, result.tier
        );
        for violation in &verdict.violations {
            println!("  - {}", violation.reason);
        }
    }

    if !verdict.passed() {
        obs::emit_privilege_blocked(contributor, verdict.violations.len());
        METRICS.flush();
        std::process::exit(1);
    }
    Ok(())
}

/// Show the tier table
fn cmd_tiers(config: &ScoringConfig, json: bool) -> Result<()> {
    if json {
        return print_json(&config.tiers);
    }
    for tier in &config.tiers {
        println!(
            "{:<14} {:>6.2} - {:>6.2}  {}",
            tier.name, tier.min_score, tier.max_score, tier.meaning
        );
    }
    Ok(())
}
