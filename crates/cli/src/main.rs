mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use config::{AppConfig, Overrides};
use contacts::{split_records, CardParser, Contact};
use refresher::{CycleOutcome, ParseDiagnostic, RefreshScheduler};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// cardbook - keeps a qualified contact list fresh from a folder of vCards
#[derive(Parser)]
#[command(name = "cardbook")]
#[command(about = "Periodic vCard contact refresher", long_about = None)]
struct Cli {
    /// Path to a cardbook.toml config file
    #[arg(short, long, env = "CARDBOOK_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the .vcf files
    #[arg(short, long, env = "CARDBOOK_DIRECTORY")]
    directory: Option<PathBuf>,

    /// File extension to pick up
    #[arg(long)]
    extension: Option<String>,

    /// Descend into subdirectories
    #[arg(long)]
    recursive: bool,

    /// Hours between refresh cycles
    #[arg(long)]
    interval_hours: Option<u64>,

    /// Only publish contacts carrying this category (blank for all)
    #[arg(long)]
    match_category: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one refresh cycle and print the qualified contacts
    Scan {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Keep refreshing on the configured interval until Ctrl-C
    Watch,

    /// Parse every card in a file and report each result
    Parse {
        /// The .vcf file to parse
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load_or_default(cli.config.as_deref())?.apply(Overrides {
        directory: cli.directory,
        extension: cli.extension,
        recursive: cli.recursive,
        interval_hours: cli.interval_hours,
        match_category: cli.match_category,
    });
    info!(
        directory = %config.source.directory.display(),
        extension = %config.source.extension,
        recursive = config.source.recursive,
        interval_hours = config.refresh.interval_hours,
        match_category = %config.refresh.match_category,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Scan { json } => handle_scan(&config, json).await?,
        Commands::Watch => handle_watch(&config).await?,
        Commands::Parse { file } => {
            debug!("Parsing single file {}", file.display());
            handle_parse(&file)?
        }
    }

    Ok(())
}

fn build_scheduler(config: &AppConfig) -> RefreshScheduler {
    RefreshScheduler::new(Arc::new(config.collector()), Arc::new(CardParser::new()))
}

/// Handle the 'scan' command
async fn handle_scan(config: &AppConfig, json: bool) -> Result<()> {
    let scheduler = build_scheduler(config);

    let start = Instant::now();
    let report = scheduler.run_cycle(&config.refresh.match_category).await;
    match report.outcome {
        CycleOutcome::Published => {}
        CycleOutcome::SourceFailed => anyhow::bail!(
            "Could not read cards from {}: {}",
            config.source.directory.display(),
            scheduler.status().last_error.unwrap_or_default()
        ),
        CycleOutcome::ParserFailed => anyhow::bail!(
            "Could not parse cards from {}: {}",
            config.source.directory.display(),
            scheduler.status().last_error.unwrap_or_default()
        ),
    }

    let contacts = scheduler.current_contacts();
    if json {
        let out = serde_json::to_string_pretty(&*contacts)
            .context("Failed to serialize contacts")?;
        println!("{}", out);
        return Ok(());
    }

    println!(
        "{} Scanned {} in {:?}: {} read, {} rejected, {} duplicates",
        "✓".green(),
        config.source.directory.display(),
        start.elapsed(),
        report.fetched,
        report.failed,
        report.duplicates
    );
    print_contacts(&contacts);
    print_diagnostics(&scheduler.diagnostics().recent());
    Ok(())
}

/// Handle the 'watch' command
async fn handle_watch(config: &AppConfig) -> Result<()> {
    let scheduler = build_scheduler(config);
    let mut updates = scheduler.subscribe();

    scheduler
        .start(config.refresh_config())
        .context("Failed to start contact refresh")?;
    println!(
        "{} Watching {} every {}h (Ctrl-C to stop)",
        "•".cyan(),
        config.source.directory.display(),
        config.refresh.interval_hours
    );

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let contacts = updates.borrow_and_update().clone();
                print_contacts(&contacts);
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                println!("{} Stopping, waiting for the current cycle", "•".cyan());
                break;
            }
        }
    }

    scheduler.shutdown().await;
    Ok(())
}

/// Handle the 'parse' command
fn handle_parse(file: &Path) -> Result<()> {
    let bytes = std::fs::read(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    let records = split_records(&text);

    let parser = CardParser::new();
    let mut failures = 0;
    for (index, result) in parser.parse_batch(&records).into_iter().enumerate() {
        let number = (index + 1).to_string();
        match result {
            Ok(contact) => {
                println!("{}. {}", number.green(), describe(&contact));
            }
            Err(e) => {
                failures += 1;
                println!("{}. {} {}", number.red(), "error:".red().bold(), e);
            }
        }
    }

    println!(
        "{} cards, {} parsed, {} failed",
        records.len(),
        records.len() - failures,
        failures
    );
    Ok(())
}

fn describe(contact: &Contact) -> String {
    let name = contact.full_name();
    let name = if name.is_empty() {
        "(no name)".dimmed().to_string()
    } else {
        name.bold().to_string()
    };

    let mut details = Vec::new();
    if let Some(birthday) = contact.birthday {
        details.push(format!("born {}", birthday));
    }
    if let Some(phone) = contact.phone_numbers.first() {
        details.push(phone.number.clone());
    }
    if let Some(email) = contact.emails.first() {
        details.push(email.address.clone());
    }
    if !contact.categories.is_empty() {
        let categories: Vec<&str> = contact.categories.iter().map(String::as_str).collect();
        details.push(format!("[{}]", categories.join(", ")));
    }
    if contact.photo.is_some() {
        details.push("photo".to_string());
    }

    if details.is_empty() {
        name
    } else {
        format!("{} - {}", name, details.join(", "))
    }
}

fn print_contacts(contacts: &[Contact]) {
    println!("{}", format!("Contacts ({}):", contacts.len()).bold().blue());
    for (rank, contact) in contacts.iter().enumerate() {
        println!("{}. {}", (rank + 1).to_string().green(), describe(contact));
    }
}

fn print_diagnostics(diagnostics: &[ParseDiagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    println!("{}", format!("Rejected records ({}):", diagnostics.len()).bold().yellow());
    for d in diagnostics {
        println!("  - {} {}: {}", d.fingerprint.short().dimmed(), d.reason, d.excerpt);
    }
}
