//! dancesort - CLI entry point
//!
//! Reads a sheet export, places dances according to saved preferences and
//! talks to the scheduler.

use std::fs;
use std::path::Path;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use dancesort::cli::{Cli, Command, OutputFormat, get_log_path};
use dancesort::config::Config;
use dancesort::conformance::{ConformanceIssue, check_conformance};
use dancesort::domain::Bucket;
use dancesort::registry::{ItemRegistry, SheetValues};
use dancesort::scheduler::{HttpSchedulerClient, SheetSource};
use dancesort::session::Session;
use dancesort::store::ConstraintStore;
use dancesort::wire::{self, ConstraintSpecification, ScheduleResult};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level).map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    // Setup logging with priority: CLI > config > INFO default
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!("dancesort loaded config: scheduler={}", config.scheduler.url);

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Items { sheet } => cmd_items(&config, &sheet),
        Command::Plan {
            sheet,
            preferences,
            format,
        } => cmd_plan(&config, &sheet, preferences.as_deref(), &format),
        Command::Submit {
            sheet,
            spreadsheet_id,
            sheet_name,
            preferences,
            format,
        } => {
            let source = SheetSource::new(spreadsheet_id, sheet_name);
            cmd_submit(&config, &sheet, source, preferences.as_deref(), &format).await
        }
        Command::Check {
            preferences,
            response,
            format,
        } => cmd_check(&preferences, &response, &format),
    }
}

/// Read a sheet export and build the registry from its item column
fn load_registry(config: &Config, path: &Path) -> Result<ItemRegistry> {
    debug!(path = %path.display(), "load_registry: called");
    let content = fs::read_to_string(path).context(format!("Failed to read sheet {}", path.display()))?;
    let sheet: SheetValues = serde_yaml::from_str(&content).context("Failed to parse sheet values")?;

    let registry = ItemRegistry::from_sheet(&sheet, &config.sheet.item_column, &config.sheet.skip_labels)
        .context(format!("No usable items in {}", path.display()))?;
    info!(count = registry.len(), "Loaded items from sheet");
    Ok(registry)
}

fn load_preferences(path: &Path) -> Result<ConstraintSpecification> {
    debug!(path = %path.display(), "load_preferences: called");
    let content = fs::read_to_string(path).context(format!("Failed to read preferences {}", path.display()))?;
    serde_yaml::from_str(&content).context("Failed to parse preferences")
}

/// List the items of a sheet
fn cmd_items(config: &Config, sheet: &Path) -> Result<()> {
    debug!("cmd_items: called");
    let registry = load_registry(config, sheet)?;
    for (i, name) in registry.items().iter().enumerate() {
        println!("{:>3}. {}", i + 1, name);
    }
    Ok(())
}

/// Print the specification for a sheet and optional preferences
fn cmd_plan(config: &Config, sheet: &Path, preferences: Option<&Path>, format: &OutputFormat) -> Result<()> {
    debug!(?format, "cmd_plan: called");
    let registry = load_registry(config, sheet)?;
    let mut store = ConstraintStore::new(&registry);
    if let Some(path) = preferences {
        store.apply_specification(&load_preferences(path)?)?;
    }
    let spec = wire::serialize(&store);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&spec)?),
        OutputFormat::Text => print_plan(&store, &spec),
    }
    Ok(())
}

/// Submit to the scheduler and print the results
async fn cmd_submit(
    config: &Config,
    sheet: &Path,
    source: SheetSource,
    preferences: Option<&Path>,
    format: &OutputFormat,
) -> Result<()> {
    debug!(?source, ?format, "cmd_submit: called");
    config.validate()?;
    let credential = config.scheduler.get_credential()?;

    let registry = load_registry(config, sheet)?;
    let mut session = Session::new(registry, source);
    session.sign_in(credential);
    if let Some(path) = preferences {
        session.apply_specification(&load_preferences(path)?)?;
    }

    let client = HttpSchedulerClient::from_config(&config.scheduler)?;
    let outcome = session.submit(&client).await.context("Scheduling request failed")?;
    debug!(?outcome, "cmd_submit: submission finished");

    let spec = session.specification();
    print_results(&spec, session.results(), format)
}

/// Check a saved response against saved preferences
fn cmd_check(preferences: &Path, response: &Path, format: &OutputFormat) -> Result<()> {
    debug!(?format, "cmd_check: called");
    let spec = load_preferences(preferences)?;
    let body = fs::read_to_string(response).context(format!("Failed to read response {}", response.display()))?;
    let results = wire::parse_results(&body)?;
    print_results(&spec, &results, format)
}

fn print_plan(store: &ConstraintStore, spec: &ConstraintSpecification) {
    println!("{}", "Fixed Positions".bold());
    for fixed in &spec.fixed_positions {
        println!("  #{:<3} {}", fixed.position, fixed.name);
    }
    println!("{}", "Relative Order".bold());
    for name in &spec.relative_order {
        println!("  {}", name);
    }
    for (label, names) in [("Start", &spec.start), ("Middle", &spec.middle), ("End", &spec.end)] {
        println!("{}", label.bold());
        for name in names {
            println!("  {}", name);
        }
    }

    let unassigned: Vec<&str> = store.names(Bucket::Unassigned).collect();
    let excluded: Vec<&str> = store.names(Bucket::Excluded).collect();
    println!("{} {}", "Not sent:".dimmed(), unassigned.join(", ").dimmed());
    if !excluded.is_empty() {
        println!("{} {}", "Excluded:".dimmed(), excluded.join(", ").dimmed());
    }
}

fn print_results(spec: &ConstraintSpecification, results: &[ScheduleResult], format: &OutputFormat) -> Result<()> {
    let reports: Vec<Vec<ConformanceIssue>> = results.iter().map(|r| check_conformance(spec, r)).collect();

    if *format == OutputFormat::Json {
        let body = serde_json::json!({
            "results": results,
            "conformance": reports,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("The scheduler returned no schedules");
        return Ok(());
    }

    for (i, (result, issues)) in results.iter().zip(&reports).enumerate() {
        let header = format!("Schedule {} (Total Collisions: {})", i + 1, result.cost);
        if result.cost == 0 {
            println!("{}", header.green().bold());
        } else {
            println!("{}", header.yellow().bold());
        }

        for (slot, name) in result.schedule.iter().enumerate() {
            println!("{:>3}. {}", slot + 1, name);
        }

        if !result.collisions.is_empty() {
            println!("{}", "Collisions Detected:".red());
            for collision in &result.collisions {
                println!(
                    "  Dancer '{}' between '{}' and '{}'",
                    collision.member, collision.previous_item, collision.current_item
                );
            }
        }

        if !issues.is_empty() {
            println!("{}", "Unmet Constraints:".yellow());
            for issue in issues {
                println!("  {}", issue);
            }
        }
        println!();
    }
    Ok(())
}
