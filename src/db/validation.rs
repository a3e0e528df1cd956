//! Record validation
//!
//! Checks records against the data-model invariants, collecting every issue
//! instead of stopping at the first one. Snapshots are checked when loaded;
//! SQLite rows are checked as they are read.

use anyhow::{bail, Result};
use rust_decimal::Decimal;
use std::fmt;

use super::memory::RecordSnapshot;
use super::models::{
    DeductibleExpenseRecord, ExpenseRecord, IncomeRecord, TaxPaymentRecord, TaxPaymentStatus,
};

/// A validation issue found in a record snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Collection the record belongs to (e.g., "incomes")
    pub kind: &'static str,
    /// Position within its collection (0-indexed)
    pub index: usize,
    /// Field name that has the issue
    pub field: &'static str,
    /// Description of why this is an issue
    pub reason: String,
}

impl ValidationIssue {
    fn new(kind: &'static str, index: usize, field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            kind,
            index,
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}].{}: {}", self.kind, self.index, self.field, self.reason)
    }
}

fn check_non_negative(
    issues: &mut Vec<ValidationIssue>,
    kind: &'static str,
    index: usize,
    field: &'static str,
    value: Decimal,
) {
    if value < Decimal::ZERO {
        issues.push(ValidationIssue::new(
            kind,
            index,
            field,
            format!("amount {} must not be negative", value),
        ));
    }
}

fn check_positive(
    issues: &mut Vec<ValidationIssue>,
    kind: &'static str,
    index: usize,
    field: &'static str,
    value: Option<Decimal>,
) {
    if let Some(v) = value {
        if v <= Decimal::ZERO {
            issues.push(ValidationIssue::new(
                kind,
                index,
                field,
                format!("{} must be greater than zero when present", v),
            ));
        }
    }
}

fn check_owner(issues: &mut Vec<ValidationIssue>, kind: &'static str, index: usize, owner: &str) {
    if owner.trim().is_empty() {
        issues.push(ValidationIssue::new(kind, index, "owner", "owner is required"));
    }
}

/// Check one income record
pub fn validate_income(index: usize, income: &IncomeRecord, issues: &mut Vec<ValidationIssue>) {
    check_owner(issues, "incomes", index, &income.scope.owner);
    check_non_negative(issues, "incomes", index, "amount_mxn", income.amount_mxn);
    check_positive(issues, "incomes", index, "exchange_rate", income.exchange_rate);
    check_positive(issues, "incomes", index, "amount_usd", income.amount_usd);
}

/// Check one deductible expense record
pub fn validate_deductible_expense(
    index: usize,
    expense: &DeductibleExpenseRecord,
    issues: &mut Vec<ValidationIssue>,
) {
    check_owner(issues, "deductible_expenses", index, &expense.scope.owner);
    check_non_negative(issues, "deductible_expenses", index, "amount_mxn", expense.amount_mxn);
}

/// Check one non-deductible expense record
pub fn validate_expense(index: usize, expense: &ExpenseRecord, issues: &mut Vec<ValidationIssue>) {
    check_owner(issues, "expenses", index, &expense.scope.owner);
    check_non_negative(issues, "expenses", index, "amount_mxn", expense.amount_mxn);
}

/// Check one tax payment record
pub fn validate_tax_payment(
    index: usize,
    payment: &TaxPaymentRecord,
    issues: &mut Vec<ValidationIssue>,
) {
    check_owner(issues, "tax_payments", index, &payment.scope.owner);
    check_non_negative(issues, "tax_payments", index, "amount_due", payment.amount_due);

    if !(1..=12).contains(&payment.period_month) {
        issues.push(ValidationIssue::new(
            "tax_payments",
            index,
            "period_month",
            format!("month {} must be between 1 and 12", payment.period_month),
        ));
    }

    match (payment.status, payment.payment_date) {
        (TaxPaymentStatus::Paid, None) => issues.push(ValidationIssue::new(
            "tax_payments",
            index,
            "payment_date",
            "paid payments require a payment date",
        )),
        (TaxPaymentStatus::Pending, Some(_)) => issues.push(ValidationIssue::new(
            "tax_payments",
            index,
            "payment_date",
            "pending payments must not have a payment date",
        )),
        _ => {}
    }
}

/// Run a per-record check over a collection
pub fn validate_records<T>(
    records: &[T],
    check: fn(usize, &T, &mut Vec<ValidationIssue>),
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (i, record) in records.iter().enumerate() {
        check(i, record, &mut issues);
    }
    issues
}

/// Validate every record of a snapshot, returning all issues found
pub fn validate_snapshot(snapshot: &RecordSnapshot) -> Vec<ValidationIssue> {
    let mut issues = validate_records(&snapshot.incomes, validate_income);
    issues.extend(validate_records(
        &snapshot.deductible_expenses,
        validate_deductible_expense,
    ));
    issues.extend(validate_records(&snapshot.expenses, validate_expense));
    issues.extend(validate_records(&snapshot.tax_payments, validate_tax_payment));
    issues
}

/// Turn a non-empty issue list into a single error listing every issue
pub fn ensure_no_issues(issues: &[ValidationIssue]) -> Result<()> {
    if issues.is_empty() {
        return Ok(());
    }
    let details = issues
        .iter()
        .map(|issue| format!("  - {}", issue))
        .collect::<Vec<_>>()
        .join("\n");
    bail!("{} invalid record(s):\n{}", issues.len(), details)
}
