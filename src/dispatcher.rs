//! Command dispatcher that routes parsed clap commands to the library
//! operations and renders their results.

use anyhow::{bail, Result};
use chrono::{Local, NaiveDate};
use colored::Colorize;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::info;

use crate::cli::formatters::{self, IsrCalculation};
use crate::cli::{Cli, Commands, TaxCommands};
use resico::config::Config;
use resico::db::{self, MemoryStore, RecordStore, ScopeKey};
use resico::{reports, tax};

/// Where records are read from, after flags and configuration are merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSource {
    Sqlite(Option<PathBuf>),
    Snapshot(PathBuf),
}

/// Everything a handler needs besides its own arguments
pub struct Context {
    pub source: StoreSource,
    pub scope: ScopeKey,
    pub json: bool,
}

impl Context {
    pub fn resolve(cli: &Cli, config: &Config) -> Self {
        let source = match (&cli.records, &cli.db) {
            (Some(records), _) => StoreSource::Snapshot(records.clone()),
            (None, Some(db)) => StoreSource::Sqlite(Some(db.clone())),
            (None, None) => StoreSource::Sqlite(config.database_path.clone()),
        };

        Self {
            source,
            scope: config.scope(cli.owner.as_deref(), cli.tenant.as_deref()),
            json: cli.json,
        }
    }

    fn open_store(&self) -> Result<Box<dyn RecordStore>> {
        match &self.source {
            StoreSource::Snapshot(path) => Ok(Box::new(MemoryStore::load(path)?)),
            StoreSource::Sqlite(path) => Ok(Box::new(db::open_db_read_only(path.clone())?)),
        }
    }
}

/// Route a parsed command to its handler
pub fn dispatch_command(command: Commands, ctx: &Context) -> Result<()> {
    match command {
        Commands::Init => dispatch_init(ctx),
        Commands::Tax { action } => match action {
            TaxCommands::Calc { amount } => dispatch_tax_calc(amount, ctx),
            TaxCommands::Month { month, year } => dispatch_tax_month(month, year, ctx),
            TaxCommands::Year { year } => dispatch_tax_year(year, ctx),
        },
        Commands::Dashboard { as_of } => {
            dispatch_dashboard(as_of.unwrap_or_else(|| Local::now().date_naive()), ctx)
        }
    }
}

fn dispatch_init(ctx: &Context) -> Result<()> {
    let path = match &ctx.source {
        StoreSource::Sqlite(path) => path.clone(),
        StoreSource::Snapshot(records) => {
            bail!("--records {:?} is read-only; nothing to initialize", records)
        }
    };

    db::init_database(path.clone())?;
    let location = match path {
        Some(p) => p,
        None => db::get_default_db_path()?,
    };

    if ctx.json {
        println!(
            "{}",
            formatters::format_json(&serde_json::json!({ "database": location }))
        );
    } else {
        println!(
            "{} Database ready at {}",
            "✓".green().bold(),
            location.display()
        );
    }
    Ok(())
}

fn dispatch_tax_calc(amount: Decimal, ctx: &Context) -> Result<()> {
    info!("Calculating ISR for {}", amount);

    let isr = tax::calculate_isr(amount)?;
    let calc = IsrCalculation::new(amount, tax::bracket_for(amount), isr);

    if ctx.json {
        println!("{}", formatters::format_json(&calc));
    } else {
        println!("{}", formatters::format_isr_calculation(&calc));
    }
    Ok(())
}

fn dispatch_tax_month(month: u32, year: i32, ctx: &Context) -> Result<()> {
    info!("Generating tax summary for {}/{} ({})", month, year, ctx.scope);

    // Reject a bad period before touching the store
    resico::error::validate_month(month)?;
    resico::error::validate_year(year)?;

    let store = ctx.open_store()?;
    let summary = tax::summarize_month(store.as_ref(), &ctx.scope, month, year)?;

    if ctx.json {
        println!("{}", formatters::format_json(&summary));
    } else {
        println!("{}", formatters::format_monthly_summary(&summary));
    }
    Ok(())
}

fn dispatch_tax_year(year: i32, ctx: &Context) -> Result<()> {
    info!("Generating annual summary for {} ({})", year, ctx.scope);

    resico::error::validate_year(year)?;

    let store = ctx.open_store()?;
    let summary = tax::summarize_year(store.as_ref(), &ctx.scope, year)?;

    if ctx.json {
        println!("{}", formatters::format_json(&summary));
    } else if summary.active_months() == 0 {
        println!("\n{} No income found for year {}\n", "ℹ".blue().bold(), year);
    } else {
        println!("{}", formatters::format_annual_summary(&summary));
    }
    Ok(())
}

fn dispatch_dashboard(as_of: NaiveDate, ctx: &Context) -> Result<()> {
    info!("Building dashboard as of {} ({})", as_of, ctx.scope);

    let store = ctx.open_store()?;
    let charts = reports::build_dashboard(store.as_ref(), &ctx.scope, as_of)?;

    if ctx.json {
        println!("{}", formatters::format_json(&charts));
    } else {
        println!("{}", formatters::format_dashboard(&charts));
    }
    Ok(())
}
