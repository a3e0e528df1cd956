//! Error handling for the RESICO tax engine
//!
//! The aggregation core reports caller mistakes as typed `TaxError`
//! variants so an API or CLI layer can map them to client errors. Failures
//! coming out of the record store are carried through untouched.

use rust_decimal::Decimal;
use thiserror::Error;

/// Earliest fiscal year accepted by the aggregators
pub const MIN_YEAR: i32 = 2000;
/// Latest fiscal year accepted by the aggregators
pub const MAX_YEAR: i32 = 2100;

/// Core error types for tax aggregation
#[derive(Error, Debug)]
pub enum TaxError {
    #[error("invalid month {0}: must be between 1 and 12")]
    InvalidMonth(u32),

    #[error("invalid year {0}: must be between 2000 and 2100")]
    InvalidYear(i32),

    #[error("invalid amount {0}: must not be negative")]
    NegativeAmount(Decimal),

    #[error("amount overflow: {0} exceeds the supported decimal range")]
    AmountOverflow(&'static str),

    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

impl TaxError {
    /// True for errors caused by bad caller input (as opposed to store failures)
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, TaxError::Upstream(_))
    }
}

/// Result type alias for aggregation operations
pub type Result<T> = std::result::Result<T, TaxError>;

/// Reject months outside 1..=12
pub fn validate_month(month: u32) -> Result<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(TaxError::InvalidMonth(month))
    }
}

/// Reject years outside the supported fiscal window
pub fn validate_year(year: i32) -> Result<()> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(TaxError::InvalidYear(year))
    }
}

/// Sum amounts, failing instead of panicking when the total does not fit
pub fn checked_sum<I>(amounts: I, what: &'static str) -> Result<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
        .ok_or(TaxError::AmountOverflow(what))
}
