//! Command-line interface components.

use crate::config::ReconcileConfig;
use crate::constants::LAST_MODIFIED_FORMAT;
use crate::models::{LoadReport, MatchTier, OrderItem};
use crate::processor::OrderEngine;
use crate::processor::writer::export_file_name;
use crate::resolver::MatchScore;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args as ClapArgs, Parser, Subcommand};
use colored::*;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "order-reconciler")]
#[command(about = "Reconcile free-text customer orders against a product price list")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON configuration file (markers, columns, matching, export layout)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print every customer's item count and total plus the grand total
    Summary(SheetArgs),
    /// List order lines priced by fuzzy or keyword matching, or not priced at all
    Diagnose(SheetArgs),
    /// Write the reconciled orders to a new xlsx file
    Export(ExportArgs),
}

#[derive(ClapArgs, Debug)]
pub struct SheetArgs {
    /// Order sheet (xlsx, xls, xlsb or ods)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// JSON file with per-customer edits to apply before reporting
    #[arg(long, value_name = "FILE")]
    pub edits: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub sheet: SheetArgs,

    /// Output file (defaults to a timestamped name next to the input)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// One customer's entry in an edits file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditEntry {
    pub items: Vec<OrderItem>,
    pub custom_prices: HashMap<String, f64>,
}

/// Customer name -> edits, applied in name order
pub type EditsFile = BTreeMap<String, EditEntry>;

/// Set up structured logging on stderr
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("order_reconciler={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

pub fn load_config(path: Option<&Path>) -> Result<ReconcileConfig> {
    let Some(path) = path else {
        return Ok(ReconcileConfig::default());
    };
    let config = ReconcileConfig::from_json_file(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

pub fn load_edits(path: &Path) -> Result<EditsFile> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read edits file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Edits file {} is not valid JSON", path.display()))
}

/// Save every entry of an edits file as an overlay; returns how many were applied
pub fn apply_edits(engine: &mut OrderEngine, edits: EditsFile) -> Result<usize> {
    let count = edits.len();
    for (name, entry) in edits {
        engine
            .save_overlay(&name, entry.items, entry.custom_prices)
            .with_context(|| format!("Cannot apply edits for '{}'", name))?;
    }
    Ok(count)
}

/// Build an engine, load the input sheet and apply optional edits
fn open_sheet(config: ReconcileConfig, sheet: &SheetArgs) -> Result<OrderEngine> {
    let mut engine = OrderEngine::new(config)?;
    let bytes = fs::read(&sheet.input)
        .with_context(|| format!("Failed to read {}", sheet.input.display()))?;
    let report = engine
        .load_file(&bytes)
        .with_context(|| format!("Failed to load {}", sheet.input.display()))?;
    print_load_report(&report);

    if let Some(path) = &sheet.edits {
        let applied = apply_edits(&mut engine, load_edits(path)?)?;
        info!("Applied edits for {} customers", applied);
    }
    Ok(engine)
}

fn print_load_report(report: &LoadReport) {
    println!(
        "{} {} customers ({}), {} products ({})",
        "Loaded".bright_green().bold(),
        report.customers,
        report.customer_strategy,
        report.products,
        report.product_strategy
    );
    for warning in &report.warnings {
        println!("  {} {}", "warning:".yellow(), warning);
    }
}

pub fn run(args: Args) -> Result<()> {
    let config = load_config(args.config.as_deref())?;

    match &args.command {
        Commands::Summary(sheet) => run_summary(config, sheet),
        Commands::Diagnose(sheet) => run_diagnose(config, sheet),
        Commands::Export(export) => run_export(config, export),
    }
}

fn run_summary(config: ReconcileConfig, sheet: &SheetArgs) -> Result<()> {
    let engine = open_sheet(config, sheet)?;
    let money = |amount: f64| engine.config().export.money(amount);

    println!();
    for customer in engine.list_customers() {
        let summary = engine.order_summary(&customer.name);
        let marker = if engine.is_edited(&customer.name) {
            "*".bright_yellow().to_string()
        } else {
            " ".to_string()
        };
        let edited_at = summary
            .last_modified
            .map(|ts| format!("  edited {}", ts.format(LAST_MODIFIED_FORMAT)))
            .unwrap_or_default();
        println!(
            "{} {:>4}  {:<16} {:>3} items  {:>12}{}",
            marker,
            customer.seq.display().bright_black(),
            customer.name.bright_cyan(),
            summary.item_count,
            money(summary.total),
            edited_at.bright_black()
        );
    }

    let stats = engine.session_stats();
    println!();
    println!(
        "{} {}",
        "Grand total:".bright_white().bold(),
        money(engine.grand_total()).bright_green().bold()
    );
    if stats.edited_customers > 0 {
        println!("{} {} edited customers", "*".bright_yellow(), stats.edited_customers);
    }
    Ok(())
}

fn run_diagnose(config: ReconcileConfig, sheet: &SheetArgs) -> Result<()> {
    let engine = open_sheet(config, sheet)?;
    let reviews = engine.review_lines();

    println!();
    if reviews.is_empty() {
        println!("{}", "Every order line matched the catalog exactly.".bright_green());
        return Ok(());
    }

    for review in &reviews {
        let resolution = &review.resolution;
        let tier = match resolution.tier {
            MatchTier::Unresolved => resolution.tier.to_string().red().bold(),
            _ => resolution.tier.to_string().yellow(),
        };
        let score = match resolution.score {
            Some(MatchScore::Similarity(ratio)) => format!(" ratio {:.2}", ratio),
            Some(MatchScore::SharedTokens(shared)) => format!(" {} shared words", shared),
            None => String::new(),
        };
        println!(
            "{:<10} {} x{}  [{}{}]",
            review.customer.bright_cyan(),
            resolution.item,
            review.qty,
            tier,
            score
        );
        if let Some(key) = &resolution.matched_key {
            println!(
                "    -> {} @ {}",
                key,
                engine.config().export.money(resolution.price)
            );
        }
        for suggestion in &resolution.suggestions {
            println!(
                "    ?  {} @ {}",
                suggestion.name.bright_black(),
                engine.config().export.money(suggestion.price)
            );
        }
    }

    let unresolved = reviews
        .iter()
        .filter(|review| !review.resolution.is_resolved())
        .count();
    println!();
    println!(
        "{} lines need review, {} unresolved",
        reviews.len().to_string().bold(),
        unresolved.to_string().red().bold()
    );
    Ok(())
}

fn run_export(config: ReconcileConfig, args: &ExportArgs) -> Result<()> {
    let engine = open_sheet(config, &args.sheet)?;
    let bytes = engine.export_all()?;

    let output = args.output.clone().unwrap_or_else(|| {
        args.sheet
            .input
            .parent()
            .unwrap_or(Path::new("."))
            .join(export_file_name(Local::now()))
    });
    fs::write(&output, &bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "{} {} customers to {}",
        "Exported".bright_green().bold(),
        engine.list_customers().len(),
        output.display().to_string().bright_white()
    );
    Ok(())
}
