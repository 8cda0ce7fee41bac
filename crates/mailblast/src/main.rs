//! `mailblast` — bulk-email dispatch command line.
//!
//! Thin glue around `mailblast-core`: option parsing, configuration
//! loading, the interactive confirmation prompt, and campaign
//! orchestration (initial pass, then a bounded number of retry passes).

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod config;

use std::fs::OpenOptions;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mailblast_core::{
    Campaign, DeliveryEngine, LedgerKey, Pass, Recipient, RecipientStore, RetrySink, RunLedger,
    Smtp, Template, ledger,
};

use config::Config;

/// Bulk-email dispatcher: renders an HTML template per recipient and
/// delivers over SMTP, with retry and run accounting.
#[derive(Parser)]
#[command(name = "mailblast", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "mailblast.toml")]
    config: PathBuf,

    /// Skip the interactive confirmation prompt.
    #[arg(long)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send the campaign to every recipient in the database.
    Send {
        /// HTML template document.
        template: PathBuf,
        /// Recipient database (.csv).
        recipients: PathBuf,
        /// Subject line.
        subject: String,
    },
    /// Send the campaign to the configured test recipients only.
    Test {
        /// HTML template document.
        template: PathBuf,
        /// Subject line.
        subject: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    init_logging(config.log_file.as_deref())?;

    ensure_exists(&config.retry_store)?;
    ensure_exists(&config.ledger)?;

    match cli.command {
        Command::Send {
            template,
            recipients,
            subject,
        } => {
            require_extension(&template, "html")?;
            require_extension(&recipients, "csv")?;
            send_campaign(&config, &template, &recipients, &subject, cli.yes).await
        }
        Command::Test { template, subject } => {
            require_extension(&template, "html")?;
            send_test(&config, &template, &subject, cli.yes).await
        }
    }
}

/// Full campaign: initial pass over the database, then bounded retry
/// passes over whatever the failures queued.
async fn send_campaign(
    config: &Config,
    template_path: &Path,
    csv_path: &Path,
    subject: &str,
    assume_yes: bool,
) -> anyhow::Result<()> {
    let template = Template::load(template_path)?;
    let recipients = RecipientStore::new(csv_path).parse(false)?;

    if !assume_yes
        && !confirm(&format!(
            "You are about to send to {} recipients. Continue (yes/no)? ",
            recipients.len()
        ))?
    {
        bail!("aborted");
    }

    let ledger = RunLedger::new(&config.ledger);
    let retry = RetrySink::new(&config.retry_store);
    let engine = build_engine(config, &retry, &ledger);
    let campaign = Campaign {
        template,
        subject: subject.to_string(),
        sender: config.sender(),
    };

    let outcome = engine.run(&campaign, &recipients, Pass::Initial).await?;
    info!(
        succeeded = outcome.succeeded,
        failed = outcome.failed,
        "initial pass complete"
    );

    for pass in 1..=config.retry_passes {
        let queued = retry.as_store().parse(true)?;
        if queued.is_empty() {
            break;
        }
        let outcome = engine.run(&campaign, &queued, Pass::Retry).await?;
        info!(
            pass,
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            "retry pass complete"
        );
    }

    ledger.record(LedgerKey::CsvUsed, csv_path.display())?;
    ledger.record(LedgerKey::EndTime, ledger::timestamp())?;
    Ok(())
}

/// Test campaign: one pass over the configured test recipients, no
/// recipient-total bookkeeping.
async fn send_test(
    config: &Config,
    template_path: &Path,
    subject: &str,
    assume_yes: bool,
) -> anyhow::Result<()> {
    let template = Template::load(template_path)?;

    let recipients: Vec<Recipient> = config
        .test_recipients
        .iter()
        .filter_map(|entry| {
            let recipient = Recipient::new(&entry.name, &entry.email);
            if recipient.is_none() {
                warn!(email = %entry.email, "configured test recipient has an invalid address");
            }
            recipient
        })
        .collect();
    if recipients.is_empty() {
        bail!("no valid test recipients configured");
    }

    if !assume_yes
        && !confirm(&format!(
            "You are about to send a test mail to {} recipients. Continue (yes/no)? ",
            recipients.len()
        ))?
    {
        bail!("aborted");
    }

    let ledger = RunLedger::new(&config.ledger);
    let retry = RetrySink::new(&config.retry_store);
    let engine = build_engine(config, &retry, &ledger);
    let campaign = Campaign {
        template,
        subject: subject.to_string(),
        sender: config.sender(),
    };

    let outcome = engine.run(&campaign, &recipients, Pass::Retry).await?;
    info!(
        succeeded = outcome.succeeded,
        failed = outcome.failed,
        "test pass complete"
    );

    ledger.record(LedgerKey::EndTime, ledger::timestamp())?;
    Ok(())
}

/// Initializes tracing output, to the configured log file when set and
/// stderr otherwise.
fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mailblast=info,mailblast_core=info".into());

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .append(true)
                .create(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::sync::Arc::new(file))
                        .with_ansi(false),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
                .init();
        }
    }
    Ok(())
}

fn build_engine(config: &Config, retry: &RetrySink, ledger: &RunLedger) -> DeliveryEngine<Smtp> {
    DeliveryEngine::new(
        Smtp::new(&config.smtp()),
        retry.clone(),
        ledger.clone(),
        Duration::from_millis(config.send_delay_ms),
    )
}

/// Creates the file if it does not exist yet, leaving content untouched.
fn ensure_exists(path: &Path) -> anyhow::Result<()> {
    OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("creating {}", path.display()))?;
    Ok(())
}

fn require_extension(path: &Path, expected: &str) -> anyhow::Result<()> {
    if path.extension().and_then(|e| e.to_str()) != Some(expected) {
        bail!(
            "{} does not look like a .{expected} file",
            path.display()
        );
    }
    Ok(())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}
