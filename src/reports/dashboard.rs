use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use tracing::{debug, info};

use crate::db::{RecordStore, ScopeKey};
use crate::error::{checked_sum, Result, TaxError};
use crate::tax::month_bounds;

/// Number of months shown on the dashboard
pub const TRAILING_MONTHS: u32 = 6;

/// Money in and out for one calendar month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashFlowPoint {
    pub month: u32,
    pub year: i32,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub total_tax_payments: Decimal,
}

impl CashFlowPoint {
    pub fn total_outflow(&self) -> Decimal {
        self.total_expenses.saturating_add(self.total_tax_payments)
    }

    pub fn net_flow(&self) -> Decimal {
        self.total_income.saturating_sub(self.total_outflow())
    }
}

// Derived values are emitted alongside the stored ones
impl Serialize for CashFlowPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("CashFlowPoint", 7)?;
        s.serialize_field("month", &self.month)?;
        s.serialize_field("year", &self.year)?;
        s.serialize_field("total_income", &self.total_income)?;
        s.serialize_field("total_expenses", &self.total_expenses)?;
        s.serialize_field("total_tax_payments", &self.total_tax_payments)?;
        s.serialize_field("total_outflow", &self.total_outflow())?;
        s.serialize_field("net_flow", &self.net_flow())?;
        s.end()
    }
}

/// Mean MXN/USD rate of a month's incomes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolatilityPoint {
    pub month: u32,
    pub year: i32,
    pub average_exchange_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardCharts {
    pub as_of: NaiveDate,
    /// Oldest to newest
    pub cash_flow: Vec<CashFlowPoint>,
    /// Oldest to newest, same months as `cash_flow`
    pub volatility: Vec<VolatilityPoint>,
}

/// (year, month) pairs of the six months before `as_of`, oldest first
pub fn trailing_months(as_of: NaiveDate) -> Result<Vec<(i32, u32)>> {
    let current = as_of
        .with_day(1)
        .ok_or(TaxError::InvalidYear(as_of.year()))?;

    (1..=TRAILING_MONTHS)
        .rev()
        .map(|back| {
            current
                .checked_sub_months(Months::new(back))
                .map(|d| (d.year(), d.month()))
                .ok_or(TaxError::InvalidYear(as_of.year()))
        })
        .collect()
}

/// Build the cash-flow and exchange-rate series for the trailing window
pub fn build_dashboard<S: RecordStore + ?Sized>(
    store: &S,
    scope: &ScopeKey,
    as_of: NaiveDate,
) -> Result<DashboardCharts> {
    let mut cash_flow = Vec::with_capacity(TRAILING_MONTHS as usize);
    let mut volatility = Vec::with_capacity(TRAILING_MONTHS as usize);

    for (year, month) in trailing_months(as_of)? {
        let (start, end) = month_bounds(year, month)?;
        debug!("Dashboard month {}/{} for {}", month, year, scope);

        let incomes = store.list_incomes(scope, start, end)?;
        let expenses = store.list_expenses(scope, start, end)?;
        let payments = store.list_tax_payments(scope, start, end)?;

        let total_income = checked_sum(incomes.iter().map(|i| i.amount_mxn), "total income")?;
        let total_expenses =
            checked_sum(expenses.iter().map(|e| e.amount_mxn), "total expenses")?;
        // Only settled payments move money; pending ones due this month do not
        let total_tax_payments = checked_sum(
            payments
                .iter()
                .filter(|p| p.paid_on().is_some_and(|d| d >= start && d <= end))
                .map(|p| p.amount_due),
            "total tax payments",
        )?;
        total_expenses
            .checked_add(total_tax_payments)
            .ok_or(TaxError::AmountOverflow("total outflow"))?;

        let rates: Vec<Decimal> = incomes
            .iter()
            .filter_map(|i| i.exchange_rate)
            .filter(|r| *r > Decimal::ZERO)
            .collect();
        let average_exchange_rate = if rates.is_empty() {
            Decimal::ZERO
        } else {
            checked_sum(rates.iter().copied(), "exchange rate sum")? / Decimal::from(rates.len())
        };

        cash_flow.push(CashFlowPoint {
            month,
            year,
            total_income,
            total_expenses,
            total_tax_payments,
        });
        volatility.push(VolatilityPoint {
            month,
            year,
            average_exchange_rate,
        });
    }

    info!("Dashboard for {} as of {} built", scope, as_of);

    Ok(DashboardCharts {
        as_of,
        cash_flow,
        volatility,
    })
}
