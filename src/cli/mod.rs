use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

pub mod formatters;

#[derive(Parser)]
#[command(name = "resico")]
#[command(version, about = "RESICO provisional ISR estimator for Mexican freelancers")]
#[command(
    long_about = "Estimate the monthly provisional ISR owed under the RESICO regime, roll months up into annual summaries, and chart the trailing six months of cash flow and MXN/USD exchange rates."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// SQLite database file (defaults to ~/.resico/data.db)
    #[arg(long, global = true, value_name = "PATH", conflicts_with = "records")]
    pub db: Option<PathBuf>,

    /// Read records from a JSON snapshot instead of the database
    #[arg(long, global = true, value_name = "FILE")]
    pub records: Option<PathBuf>,

    /// Owner whose records are summarized
    #[arg(long, global = true, value_name = "ID")]
    pub owner: Option<String>,

    /// Tenant the owner belongs to (multi-tenant deployments)
    #[arg(long, global = true, value_name = "ID")]
    pub tenant: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create or upgrade the database schema
    Init,

    /// Provisional ISR calculations
    Tax {
        #[command(subcommand)]
        action: TaxCommands,
    },

    /// Trailing six-month cash flow and exchange-rate series
    Dashboard {
        /// Reference date (YYYY-MM-DD); the window ends the month before it.
        /// Defaults to today.
        #[arg(long = "as-of", value_name = "DATE")]
        as_of: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
pub enum TaxCommands {
    /// ISR for a monthly income amount
    Calc {
        /// Monthly income in MXN (e.g., 45000.00)
        #[arg(allow_negative_numbers = true)]
        amount: Decimal,
    },

    /// Monthly summary of income, deductions and estimated ISR
    Month {
        /// Month (1-12)
        month: u32,
        /// Year (e.g., 2024)
        year: i32,
    },

    /// Annual summary: twelve months plus totals
    Year {
        /// Year (e.g., 2024)
        year: i32,
    },
}
