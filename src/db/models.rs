use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Partition key for every record query.
///
/// Single-tenant deployments only set `owner`; multi-tenant deployments set
/// both. Two keys match only when both parts are equal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ScopeKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
    pub owner: String,
}

impl ScopeKey {
    pub fn owner(owner: impl Into<String>) -> Self {
        Self {
            tenant: None,
            owner: owner.into(),
        }
    }

    pub fn tenant(tenant: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            tenant: Some(tenant.into()),
            owner: owner.into(),
        }
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tenant {
            Some(tenant) => write!(f, "{}/{}", tenant, self.owner),
            None => write!(f, "{}", self.owner),
        }
    }
}

/// Income received by the taxpayer, in MXN
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncomeRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(flatten)]
    pub scope: ScopeKey,
    pub date: NaiveDate,
    pub amount_mxn: Decimal,
    #[serde(default)]
    pub exchange_rate: Option<Decimal>, // MXN per USD, 6 decimal places
    #[serde(default)]
    pub amount_usd: Option<Decimal>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Tax-deductible expense (backed by an invoice)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeductibleExpenseRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(flatten)]
    pub scope: ScopeKey,
    pub date: NaiveDate,
    pub amount_mxn: Decimal,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// General cash outflow, deductible or not
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(flatten)]
    pub scope: ScopeKey,
    pub date: NaiveDate,
    pub amount_mxn: Decimal,
    #[serde(default)]
    pub description: Option<String>,
}

/// Tax payment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaxPaymentStatus {
    #[serde(alias = "PENDIENTE", alias = "pending", alias = "pendiente")]
    Pending,
    #[serde(alias = "PAGADO", alias = "paid", alias = "pagado")]
    Paid,
}

impl TaxPaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxPaymentStatus::Pending => "PENDING",
            TaxPaymentStatus::Paid => "PAID",
        }
    }
}

impl FromStr for TaxPaymentStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" | "PENDIENTE" => Ok(TaxPaymentStatus::Pending),
            "PAID" | "PAGADO" => Ok(TaxPaymentStatus::Paid),
            _ => Err(()),
        }
    }
}

/// Provisional ISR payment owed to (or paid to) the SAT
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaxPaymentRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(flatten)]
    pub scope: ScopeKey,
    pub period_month: u32,
    pub period_year: i32,
    pub amount_due: Decimal,
    pub due_date: NaiveDate,
    pub status: TaxPaymentStatus,
    #[serde(default)]
    pub payment_date: Option<NaiveDate>, // Present iff status is PAID
}

impl TaxPaymentRecord {
    /// Date that places the payment on a timeline: when it was paid, or when
    /// it falls due while still pending.
    pub fn effective_date(&self) -> NaiveDate {
        match (self.status, self.payment_date) {
            (TaxPaymentStatus::Paid, Some(paid_on)) => paid_on,
            _ => self.due_date,
        }
    }

    /// Payment date, only for payments actually settled
    pub fn paid_on(&self) -> Option<NaiveDate> {
        match self.status {
            TaxPaymentStatus::Paid => self.payment_date,
            TaxPaymentStatus::Pending => None,
        }
    }
}
