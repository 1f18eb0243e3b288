//! Morphcalc Runtime
//!
//! The entry point for the self-rewriting calculator.
//! Handles CLI args, the interactive calculator, and the customize /
//! revert drivers -- the only place that performs the actual process exec.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use dialoguer::{Confirm, Select};

use morphcalc::codegen::OpenAiCodegen;
use morphcalc::config;
use morphcalc::prompts;
use morphcalc::restart;
use morphcalc::self_update::{repository, Controller, TrackedFile};
use morphcalc::types::{CodegenClient, LogLevel, MorphConfig, KNOWN_MODELS};

const VERSION: &str = "0.1.0";

/// Morphcalc -- Self-Rewriting Calculator
#[derive(Parser, Debug)]
#[command(
    name = "morphcalc",
    version = VERSION,
    about = "Morphcalc -- Self-Rewriting Calculator",
    long_about = "A calculator that can rewrite its own tracked source through a \
                  model and restore any previous version from its backups."
)]
struct Cli {
    /// Start the interactive calculator
    #[arg(long)]
    run: bool,

    /// Evaluate a single expression and exit
    #[arg(long, value_name = "EXPR")]
    eval: Option<String>,

    /// Rewrite the tracked source through the configured model
    #[arg(long)]
    customize: bool,

    /// List backup versions of the tracked file
    #[arg(long)]
    backups: bool,

    /// Restore the tracked file from the named backup
    #[arg(long, value_name = "BACKUP")]
    revert: Option<String>,

    /// Show tracked file and configuration status
    #[arg(long)]
    status: bool,

    /// Print the tracked file's current source
    #[arg(long)]
    source: bool,
}

fn init_tracing(level: LogLevel) {
    let max_level = match level {
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Error => tracing::Level::ERROR,
    };
    tracing_subscriber::fmt().with_max_level(max_level).init();
}

/// The working directory is the backup directory: backups land next to
/// wherever the process was started.
fn backup_dir() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to resolve the working directory")
}

// ---- Status Command ---------------------------------------------------------

fn show_status(config: &MorphConfig) {
    let tracked = TrackedFile::from_invocation();

    let (count, next) = match backup_dir()
        .and_then(|dir| {
            let list = repository::list_backups(&dir, tracked.base())?;
            let next = repository::next_version(&dir, tracked.base())?;
            Ok((list.len(), next))
        }) {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("Failed to scan backups: {}", e);
            return;
        }
    };

    println!(
        r#"
=== MORPHCALC STATUS ===
Tracked:    {}
Base name:  {}
Backups:    {}
Next ver:   {}
Model:      {}
API URL:    {}
Config:     {}
Version:    {}
========================
"#,
        tracked.path().display(),
        tracked.base(),
        count,
        next,
        config.model,
        config.api_url,
        config::get_config_path().display(),
        VERSION,
    );
}

// ---- Source Display ---------------------------------------------------------

/// Print the tracked file's current source, the terminal counterpart of a
/// "share current code" view.
fn show_source() -> Result<()> {
    let tracked = TrackedFile::from_invocation();
    print!("{}", tracked.source()?);
    Ok(())
}

// ---- Backup Listing ---------------------------------------------------------

fn show_backups() -> Result<()> {
    let tracked = TrackedFile::from_invocation();
    let dir = backup_dir()?;
    let records = repository::list_backups(&dir, tracked.base())?;

    if records.is_empty() {
        println!("No backups found for {}.", tracked.base());
        return Ok(());
    }

    println!("Backups for {} (oldest first):", tracked.base());
    for record in &records {
        println!(
            "  {}  {}",
            format!("v{}", record.version).green(),
            record.file_name.white()
        );
    }
    println!(
        "{}",
        "Restore one with: morphcalc --revert <BACKUP>".dimmed()
    );
    Ok(())
}

// ---- Calculator -------------------------------------------------------------

fn eval_once(expr: &str) -> Result<()> {
    let value = morphcalc::calc::evaluate(expr)?;
    println!("{}", value);
    Ok(())
}

fn run_repl() -> Result<()> {
    println!("{}", "Morphcalc. Enter an expression, or \"quit\".".white());
    println!(
        "{}",
        "Rewrite this program with: morphcalc --customize".dimmed()
    );

    loop {
        let line: String = dialoguer::Input::new()
            .with_prompt("calc")
            .allow_empty(true)
            .interact_text()?;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            return Ok(());
        }

        match morphcalc::calc::evaluate(line) {
            Ok(value) => println!("= {}", value),
            Err(e) => println!("{}", format!("error: {}", e).red()),
        }
    }
}

// ---- Customize --------------------------------------------------------------

/// Prompt for instruction/model/key, request a rewrite, then hand the new
/// content to the controller. Does not return on success.
async fn customize(mut config: MorphConfig) -> Result<()> {
    let tracked = TrackedFile::from_invocation();

    println!(
        "{}",
        "  Customize morphcalc: the model rewrites the tracked source.".white()
    );

    let instruction = prompts::prompt_instruction("Describe the change you want")?;

    let mut models: Vec<String> = KNOWN_MODELS.iter().map(|m| m.to_string()).collect();
    if !models.iter().any(|m| *m == config.model) {
        models.insert(0, config.model.clone());
    }
    let default_index = models.iter().position(|m| *m == config.model).unwrap_or(0);
    let index = Select::new()
        .with_prompt("  Model")
        .items(&models)
        .default(default_index)
        .interact()?;
    config.model = models[index].clone();

    if config.api_key.is_empty() {
        config.api_key = prompts::prompt_secret("API key")?;
    }
    config::save_config(&config).context("Failed to save config")?;

    let current_source = tracked.source()?;

    println!("{}", "  Waiting for the model to respond...".cyan());
    let client = OpenAiCodegen::new(
        config.api_url.clone(),
        config.api_key.clone(),
        config.model.clone(),
        config.max_tokens,
    );
    let new_content = client.generate(&instruction, &current_source).await?;

    let controller = Controller::new();
    let request = controller.replace(&tracked, &backup_dir()?, &new_content)?;

    println!("{}", "  Tracked file updated. Restarting...".green());
    Err(restart::reexec(request).into())
}

// ---- Revert -----------------------------------------------------------------

/// Confirm, then restore the tracked file from `chosen`. Does not return on
/// success.
fn revert(chosen: &str) -> Result<()> {
    let tracked = TrackedFile::from_invocation();

    let confirmed = Confirm::new()
        .with_prompt(format!(
            "Revert {} to {}?",
            tracked.path().display(),
            chosen
        ))
        .default(false)
        .interact()?;
    if !confirmed {
        println!("Aborted.");
        return Ok(());
    }

    let controller = Controller::new();
    let request = controller.revert(&tracked, &backup_dir()?, chosen)?;

    println!(
        "{}",
        format!("Reverted to {}. Restarting...", chosen).green()
    );
    Err(restart::reexec(request).into())
}

// ---- Entry Point -----------------------------------------------------------

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = config::load_or_default();
    init_tracing(config.log_level);

    if cli.status {
        show_status(&config);
        return;
    }

    if cli.source {
        if let Err(e) = show_source() {
            eprintln!("Failed to read source: {}", e);
            std::process::exit(1);
        }
        return;
    }

    if cli.backups {
        if let Err(e) = show_backups() {
            eprintln!("Failed to list backups: {}", e);
            std::process::exit(1);
        }
        return;
    }

    if let Some(ref chosen) = cli.revert {
        if let Err(e) = revert(chosen) {
            eprintln!("Revert failed: {}", e);
            std::process::exit(1);
        }
        return;
    }

    if cli.customize {
        if let Err(e) = customize(config).await {
            eprintln!("Customize failed: {}", e);
            std::process::exit(1);
        }
        return;
    }

    if let Some(ref expr) = cli.eval {
        if let Err(e) = eval_once(expr) {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        return;
    }

    if cli.run {
        if let Err(e) = run_repl() {
            eprintln!("Fatal: {}", e);
            std::process::exit(1);
        }
        return;
    }

    // Default: show usage hints.
    println!("Run \"morphcalc --run\" to start the calculator.");
    println!("Run \"morphcalc --help\" for all commands.");
}
