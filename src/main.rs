//! Command-line front end for username-scout.
//!
//! # Usage
//!
//! ```bash
//! # Generate 20 candidates, probe them and store the available ones
//! username-scout scan --count 20
//!
//! # Probe specific usernames
//! username-scout check ab12 x_9q
//!
//! # Ledger and audit log
//! username-scout stats
//! username-scout recent --limit 5
//! username-scout history ab12
//! username-scout clear
//! ```
//!
//! # Environment Variables
//!
//! See [`username_scout::config`]. A `.env` file in the working directory is
//! loaded first.

use username_scout::application::services::BatchReport;
use username_scout::config;
use username_scout::domain::entities::{Availability, ProbeResult};
use username_scout::runtime;
use username_scout::state::AppState;
use username_scout::utils::username_generator::{generate_batch, validate_identifier};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// Finds short, unclaimed usernames.
#[derive(Parser)]
#[command(name = "username-scout")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate random candidates, probe them and store the available ones
    Scan {
        /// Number of candidates to generate
        #[arg(short, long, default_value_t = 10)]
        count: usize,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Also probe candidates already in the ledger
        #[arg(long)]
        include_known: bool,
    },

    /// Probe specific usernames
    Check {
        /// Usernames to probe
        #[arg(required = true)]
        usernames: Vec<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show ledger statistics
    Stats,

    /// Show the most recently stored usernames
    Recent {
        #[arg(short, long, default_value_t = 10)]
        limit: i64,
    },

    /// List every stored username
    List,

    /// Check whether a username is in the ledger
    Exists { username: String },

    /// Show the probe history of a username
    History {
        username: String,

        #[arg(short, long, default_value_t = 20)]
        limit: i64,
    },

    /// Remove a username from the ledger
    Delete { username: String },

    /// Remove every stored username and the whole probe history
    Clear {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Invalid configuration")?;
    init_tracing(&config.log_level, &config.log_format);
    config.print_summary();

    let state = runtime::bootstrap(config).await?;

    let outcome = match cli.command {
        Commands::Scan {
            count,
            json,
            include_known,
        } => handle_scan(&state, count, json, include_known).await,
        Commands::Check { usernames, json } => handle_check(&state, usernames, json).await,
        Commands::Stats => handle_stats(&state).await,
        Commands::Recent { limit } => handle_recent(&state, limit).await,
        Commands::List => handle_list(&state).await,
        Commands::Exists { username } => handle_exists(&state, &username).await,
        Commands::History { username, limit } => handle_history(&state, &username, limit).await,
        Commands::Delete { username } => handle_delete(&state, &username).await,
        Commands::Clear { yes } => handle_clear(&state, yes).await,
        Commands::Db {
            action: DbAction::Check,
        } => handle_db_check(&state).await,
    };

    state.db.close().await;
    outcome
}

/// Logs go to stderr so that `--json` output on stdout stays parseable.
fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Runs a full scan.
///
/// # Flow
///
/// 1. Generate `count` distinct candidates
/// 2. Drop candidates already in the ledger (unless `--include-known`)
/// 3. Probe the rest in paced windows; Ctrl-C aborts without persisting
/// 4. Record every result in the audit log
/// 5. Store the available ones
async fn handle_scan(state: &AppState, count: usize, as_json: bool, include_known: bool) -> Result<()> {
    let generated = generate_batch(count)?;

    let mut candidates = Vec::with_capacity(generated.len());
    for username in generated {
        if include_known || !state.ledger.exists(&username).await? {
            candidates.push(username);
        }
    }

    let skipped = count - candidates.len();
    if skipped > 0 {
        tracing::info!(skipped, "Skipping usernames already in the ledger");
    }

    if candidates.is_empty() {
        println!("{}", "Every generated username is already in the ledger".yellow());
        return Ok(());
    }

    if !as_json {
        println!(
            "{} {} usernames...",
            "🔍 Checking".bright_blue().bold(),
            candidates.len().to_string().bright_white().bold()
        );
        println!();
    }

    let Some(report) = run_interruptible(state, &candidates).await else {
        println!("{}", "❌ Interrupted, nothing was stored".red());
        return Ok(());
    };

    persist_and_print(state, report, as_json).await
}

async fn handle_check(state: &AppState, usernames: Vec<String>, as_json: bool) -> Result<()> {
    let usernames: Vec<String> = usernames.into_iter().map(|u| u.to_lowercase()).collect();
    for username in &usernames {
        validate_identifier(username).with_context(|| format!("'{username}' cannot be probed"))?;
    }

    let Some(report) = run_interruptible(state, &usernames).await else {
        println!("{}", "❌ Interrupted, nothing was stored".red());
        return Ok(());
    };

    persist_and_print(state, report, as_json).await
}

async fn run_interruptible(state: &AppState, usernames: &[String]) -> Option<BatchReport> {
    tokio::select! {
        results = state.orchestrator.check_all(usernames) => Some(BatchReport::new(results)),
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Scan interrupted");
            None
        }
    }
}

async fn persist_and_print(state: &AppState, report: BatchReport, as_json: bool) -> Result<()> {
    state.ledger.record_results(&report.results).await;

    let available = report.available();
    let summary = state.ledger.add_many(&available).await;

    if as_json {
        let output = json!({
            "results": report.results,
            "stored": summary,
            "all_failed": report.all_failed(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for result in &report.results {
            print_result(result);
        }
        println!();

        if report.all_failed() {
            println!(
                "{}",
                "⚠️  The check failed: no username could be classified".red().bold()
            );
        } else if available.is_empty() {
            println!("{}", "No available usernames in this batch".yellow());
        } else {
            println!(
                "  Available: {}  (new: {}, already known: {})",
                available.len().to_string().green().bold(),
                summary.added.to_string().bright_white(),
                summary.duplicates.to_string().bright_black()
            );
        }

        println!(
            "  Taken: {}  Unknown: {}",
            report.taken().len().to_string().bright_white(),
            report.unknown().len().to_string().yellow()
        );

        for failure in &summary.failures {
            println!("  {} {}", "store failed:".red(), failure);
        }
        println!();
    }

    if report.all_failed() {
        anyhow::bail!("every probe was inconclusive");
    }

    Ok(())
}

fn print_result(result: &ProbeResult) {
    let status = match result.availability {
        Availability::Available => "AVAILABLE".green().bold(),
        Availability::Taken => "taken".bright_black(),
        Availability::Unknown(kind) => kind.as_str().yellow(),
    };
    let strategy = result.strategy_used.map(|s| s.as_str()).unwrap_or("-");

    println!(
        "  {:<6} {:<20} {}",
        result.identifier.cyan(),
        status,
        strategy.bright_black()
    );
}

/// Displays ledger statistics.
async fn handle_stats(state: &AppState) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let stats = state
        .ledger
        .statistics()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load statistics: {}", e))?;

    println!(
        "  Stored usernames:       {}",
        stats.total_available.to_string().bright_white().bold()
    );
    println!(
        "  Probes recorded:        {}",
        stats.total_checks.to_string().bright_white().bold()
    );
    println!(
        "  Available in history:   {}",
        stats.available_from_history.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

async fn handle_recent(state: &AppState, limit: i64) -> Result<()> {
    let records = state.ledger.list_recent(limit).await?;
    print_records("🕒 Recent usernames", &records);
    Ok(())
}

async fn handle_list(state: &AppState) -> Result<()> {
    let records = state.ledger.list_all().await?;
    print_records("📋 Stored usernames", &records);
    Ok(())
}

fn print_records(title: &str, records: &[username_scout::domain::entities::AvailableRecord]) {
    println!("{}", title.bright_blue().bold());
    println!();

    if records.is_empty() {
        println!("{}", "  No usernames stored yet".yellow());
        println!();
        println!("  Find some with: {}", "username-scout scan".bright_cyan());
        return;
    }

    println!(
        "  {:<8} {:<20} {}",
        "Username".bright_white().bold(),
        "Stored".bright_white().bold(),
        "Notes".bright_white().bold()
    );
    println!("  {}", "─".repeat(50).bright_black());

    for record in records {
        println!(
            "  {:<8} {:<20} {}",
            record.identifier.cyan(),
            record
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            record.notes.as_deref().unwrap_or("")
        );
    }

    println!();
    println!(
        "  Total: {}",
        records.len().to_string().bright_white().bold()
    );
    println!();
}

async fn handle_exists(state: &AppState, username: &str) -> Result<()> {
    if state.ledger.exists(username).await? {
        println!("{} is in the ledger", username.cyan());
    } else {
        println!("{} is not in the ledger", username.cyan());
    }
    Ok(())
}

async fn handle_history(state: &AppState, username: &str, limit: i64) -> Result<()> {
    println!("{} {}", "📜 History for".bright_blue().bold(), username.cyan());
    println!();

    let entries = state.ledger.history_for(username, limit).await?;
    if entries.is_empty() {
        println!("{}", "  Never probed".yellow());
        return Ok(());
    }

    for entry in &entries {
        let outcome = match entry.availability() {
            Some(true) => entry.outcome.green(),
            Some(false) => entry.outcome.bright_black(),
            None => entry.outcome.yellow(),
        };
        println!(
            "  {}  {:<10} {:<5} {}",
            entry
                .checked_at
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
                .bright_black(),
            outcome,
            entry
                .status_code
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string()),
            entry.error_message.as_deref().unwrap_or("")
        );
    }
    println!();

    Ok(())
}

async fn handle_delete(state: &AppState, username: &str) -> Result<()> {
    if state.ledger.delete(username).await? {
        println!("{} {}", "✅ Removed".green().bold(), username.cyan());
    } else {
        println!("{} is not in the ledger", username.cyan());
    }
    Ok(())
}

/// Empties the ledger and the audit log after confirmation.
async fn handle_clear(state: &AppState, skip_confirm: bool) -> Result<()> {
    let stats = state.ledger.statistics().await?;

    println!(
        "  This removes {} stored usernames and {} history entries.",
        stats.total_available.to_string().bright_white().bold(),
        stats.total_checks.to_string().bright_white().bold()
    );

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Clear everything?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let removed = state.ledger.clear().await?;
    println!(
        "{} ({} usernames)",
        "✅ Ledger cleared".green().bold(),
        removed
    );

    Ok(())
}

async fn handle_db_check(state: &AppState) -> Result<()> {
    print!("Checking database connection... ");

    match state.db.check().await {
        Ok(()) => {
            println!("{}", "OK".green().bold());
            Ok(())
        }
        Err(e) => {
            println!("{}", "FAILED".red().bold());
            Err(anyhow::anyhow!("Database check failed: {}", e))
        }
    }
}
