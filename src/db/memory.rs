//! In-memory record store
//!
//! Holds a snapshot of records exported from the CRUD layer (a JSON file
//! with four arrays) and answers the same range queries as the SQLite store.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;

use super::models::{
    DeductibleExpenseRecord, ExpenseRecord, IncomeRecord, ScopeKey, TaxPaymentRecord,
};
use super::validation::{ensure_no_issues, validate_snapshot};
use super::RecordStore;

/// Serialized form of a record export
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordSnapshot {
    #[serde(default)]
    pub incomes: Vec<IncomeRecord>,
    #[serde(default)]
    pub deductible_expenses: Vec<DeductibleExpenseRecord>,
    #[serde(default)]
    pub expenses: Vec<ExpenseRecord>,
    #[serde(default)]
    pub tax_payments: Vec<TaxPaymentRecord>,
}

/// Record store backed by plain vectors
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: RecordSnapshot,
}

impl MemoryStore {
    /// Build a store from a snapshot, rejecting it if any record is invalid
    pub fn new(snapshot: RecordSnapshot) -> Result<Self> {
        ensure_no_issues(&validate_snapshot(&snapshot))?;
        Ok(Self { snapshot })
    }

    /// Parse and validate a JSON snapshot
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let snapshot: RecordSnapshot =
            serde_json::from_reader(reader).context("Failed to parse records JSON")?;
        Self::new(snapshot)
    }

    /// Load a JSON snapshot file
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading records from: {:?}", path);
        let file = File::open(path).context(format!("Failed to open records file {:?}", path))?;
        let store = Self::from_reader(BufReader::new(file))
            .context(format!("Invalid records file {:?}", path))?;
        info!(
            "Loaded {} incomes, {} deductible expenses, {} expenses, {} tax payments",
            store.snapshot.incomes.len(),
            store.snapshot.deductible_expenses.len(),
            store.snapshot.expenses.len(),
            store.snapshot.tax_payments.len()
        );
        Ok(store)
    }
}

fn in_range(date: NaiveDate, from: NaiveDate, to: NaiveDate) -> bool {
    date >= from && date <= to
}

impl RecordStore for MemoryStore {
    fn list_incomes(
        &self,
        scope: &ScopeKey,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<IncomeRecord>> {
        Ok(self
            .snapshot
            .incomes
            .iter()
            .filter(|r| &r.scope == scope && in_range(r.date, from, to))
            .cloned()
            .collect())
    }

    fn list_deductible_expenses(
        &self,
        scope: &ScopeKey,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DeductibleExpenseRecord>> {
        Ok(self
            .snapshot
            .deductible_expenses
            .iter()
            .filter(|r| &r.scope == scope && in_range(r.date, from, to))
            .cloned()
            .collect())
    }

    fn list_expenses(
        &self,
        scope: &ScopeKey,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ExpenseRecord>> {
        Ok(self
            .snapshot
            .expenses
            .iter()
            .filter(|r| &r.scope == scope && in_range(r.date, from, to))
            .cloned()
            .collect())
    }

    fn list_tax_payments(
        &self,
        scope: &ScopeKey,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TaxPaymentRecord>> {
        Ok(self
            .snapshot
            .tax_payments
            .iter()
            .filter(|r| &r.scope == scope && in_range(r.effective_date(), from, to))
            .cloned()
            .collect())
    }
}
