use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::resico::{calculate_isr, effective_rate};
use crate::db::{RecordStore, ScopeKey};
use crate::error::{checked_sum, validate_month, validate_year, Result, TaxError};

/// Day of the following month on which the provisional payment is due
const PAYMENT_DUE_DAY: u32 = 17;

/// Monthly ISR estimate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTaxSummary {
    pub month: u32,
    pub year: i32,
    pub total_income: Decimal,
    pub total_deductible_expenses: Decimal,
    /// Informational only; ISR is computed on total income
    pub taxable_base: Decimal,
    pub estimated_isr: Decimal,
    pub effective_rate: Decimal,
    pub payment_due_date: NaiveDate,
}

/// First and last day of a calendar month
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    validate_month(month)?;
    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or(TaxError::InvalidYear(year))?;
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .ok_or(TaxError::InvalidYear(year))?;
    Ok((start, end))
}

/// Due date of the provisional payment for a period (17th of the next month)
pub fn provisional_payment_due_date(year: i32, month: u32) -> Result<NaiveDate> {
    let (start, _) = month_bounds(year, month)?;
    start
        .checked_add_months(Months::new(1))
        .and_then(|d| d.with_day(PAYMENT_DUE_DAY))
        .ok_or(TaxError::InvalidYear(year))
}

/// Summarize income, deductible expenses and estimated ISR for one month
pub fn summarize_month<S: RecordStore + ?Sized>(
    store: &S,
    scope: &ScopeKey,
    month: u32,
    year: i32,
) -> Result<MonthlyTaxSummary> {
    validate_month(month)?;
    validate_year(year)?;

    let (start, end) = month_bounds(year, month)?;
    debug!("Summarizing {}/{} for {} ({} to {})", month, year, scope, start, end);

    let incomes = store.list_incomes(scope, start, end)?;
    let deductibles = store.list_deductible_expenses(scope, start, end)?;

    let total_income = checked_sum(incomes.iter().map(|i| i.amount_mxn), "total income")?;
    let total_deductible_expenses = checked_sum(
        deductibles.iter().map(|d| d.amount_mxn),
        "total deductible expenses",
    )?;
    let taxable_base = total_income
        .checked_sub(total_deductible_expenses)
        .ok_or(TaxError::AmountOverflow("taxable base"))?;

    let estimated_isr = calculate_isr(total_income)?;

    Ok(MonthlyTaxSummary {
        month,
        year,
        total_income,
        total_deductible_expenses,
        taxable_base,
        estimated_isr,
        effective_rate: effective_rate(estimated_isr, total_income),
        payment_due_date: provisional_payment_due_date(year, month)?,
    })
}
