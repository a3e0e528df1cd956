use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use super::monthly::{summarize_month, MonthlyTaxSummary};
use super::resico::effective_rate;
use crate::db::{RecordStore, ScopeKey};
use crate::error::{checked_sum, validate_year, Result};

/// Year-level roll-up of the twelve monthly summaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnualTaxSummary {
    pub year: i32,
    /// January through December, always 12 entries
    pub monthly_summaries: Vec<MonthlyTaxSummary>,
    pub total_annual_income: Decimal,
    pub total_annual_deductible: Decimal,
    pub total_annual_taxable_base: Decimal,
    pub total_annual_isr: Decimal,
    /// Income-weighted: total ISR over total income
    pub average_effective_rate: Decimal,
}

impl AnnualTaxSummary {
    /// Roll twelve monthly summaries up into a year
    pub fn from_months(year: i32, monthly_summaries: Vec<MonthlyTaxSummary>) -> Result<Self> {
        let total_annual_income = checked_sum(
            monthly_summaries.iter().map(|m| m.total_income),
            "total annual income",
        )?;
        let total_annual_deductible = checked_sum(
            monthly_summaries.iter().map(|m| m.total_deductible_expenses),
            "total annual deductible expenses",
        )?;
        let total_annual_taxable_base = checked_sum(
            monthly_summaries.iter().map(|m| m.taxable_base),
            "total annual taxable base",
        )?;
        let total_annual_isr = checked_sum(
            monthly_summaries.iter().map(|m| m.estimated_isr),
            "total annual ISR",
        )?;

        Ok(Self {
            year,
            monthly_summaries,
            total_annual_income,
            total_annual_deductible,
            total_annual_taxable_base,
            total_annual_isr,
            average_effective_rate: effective_rate(total_annual_isr, total_annual_income),
        })
    }

    /// Months that had any income
    pub fn active_months(&self) -> usize {
        self.monthly_summaries
            .iter()
            .filter(|m| m.total_income > Decimal::ZERO)
            .count()
    }
}

/// Summarize a full calendar year, one monthly computation per month.
///
/// Months are computed in order; the first failing month aborts the whole
/// year.
pub fn summarize_year<S: RecordStore + ?Sized>(
    store: &S,
    scope: &ScopeKey,
    year: i32,
) -> Result<AnnualTaxSummary> {
    validate_year(year)?;

    let monthly_summaries = (1..=12)
        .map(|month| summarize_month(store, scope, month, year))
        .collect::<Result<Vec<_>>>()?;

    let summary = AnnualTaxSummary::from_months(year, monthly_summaries)?;
    info!(
        "Annual summary {} for {}: income {}, ISR {} ({} active months)",
        year,
        scope,
        summary.total_annual_income,
        summary.total_annual_isr,
        summary.active_months()
    );

    Ok(summary)
}
