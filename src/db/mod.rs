// Database module - record store seam, SQLite connection and models

pub mod memory;
pub mod models;
pub mod validation;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rusqlite::types::{Type, ValueRef};
use rusqlite::{params, Connection, OpenFlags};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

pub use memory::{MemoryStore, RecordSnapshot};
use validation::{
    ensure_no_issues, validate_deductible_expense, validate_expense, validate_income,
    validate_records, validate_tax_payment,
};
pub use models::{
    DeductibleExpenseRecord, ExpenseRecord, IncomeRecord, ScopeKey, TaxPaymentRecord,
    TaxPaymentStatus,
};

/// Read-only view over the persisted records.
///
/// Every method returns the records of `scope` whose date lies in the
/// inclusive range `[from, to]`. For tax payments the date is the payment
/// date of PAID records and the due date of PENDING ones.
pub trait RecordStore {
    fn list_incomes(
        &self,
        scope: &ScopeKey,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<IncomeRecord>>;

    fn list_deductible_expenses(
        &self,
        scope: &ScopeKey,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DeductibleExpenseRecord>>;

    fn list_expenses(
        &self,
        scope: &ScopeKey,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ExpenseRecord>>;

    fn list_tax_payments(
        &self,
        scope: &ScopeKey,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TaxPaymentRecord>>;
}

/// Get the default database path (~/.resico/data.db)
pub fn get_default_db_path() -> Result<PathBuf> {
    Ok(crate::config::resico_home()?.join("data.db"))
}

/// Open database connection
pub fn open_db(db_path: Option<PathBuf>) -> Result<Connection> {
    let path = match db_path {
        Some(path) => path,
        None => get_default_db_path()?,
    };
    debug!("Opening database at {:?}", path);
    let conn = Connection::open(&path).context(format!("Failed to open database at {:?}", path))?;
    Ok(conn)
}

/// Open an existing database for queries only
///
/// Never creates the file or touches the schema; a missing database asks
/// for `resico init`.
pub fn open_db_read_only(db_path: Option<PathBuf>) -> Result<Connection> {
    let path = match db_path {
        Some(path) => path,
        None => get_default_db_path()?,
    };
    if !path.exists() {
        bail!("Database not found at {:?}. Run `resico init` first", path);
    }
    debug!("Opening database read-only at {:?}", path);
    let conn = Connection::open_with_flags(
        &path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .context(format!("Failed to open database at {:?}", path))?;
    Ok(conn)
}

/// Initialize the database with schema
///
/// Safe to run repeatedly: every statement in the schema is
/// `CREATE ... IF NOT EXISTS`.
pub fn init_database(db_path: Option<PathBuf>) -> Result<()> {
    let path = match db_path {
        Some(path) => path,
        None => get_default_db_path()?,
    };

    info!("Initializing database at: {:?}", path);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create directory {:?}", parent))?;
    }

    let conn = open_db(Some(path))?;
    apply_schema(&conn)?;

    info!("Database initialized successfully");
    Ok(())
}

/// Run the schema SQL on an open connection
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(include_str!("schema.sql"))
        .context("Failed to execute schema")
}

impl RecordStore for Connection {
    fn list_incomes(
        &self,
        scope: &ScopeKey,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<IncomeRecord>> {
        let mut stmt = self.prepare(
            "SELECT id, tenant_id, owner_id, income_date, amount_mxn,
                    exchange_rate, amount_usd, source, description
             FROM incomes
             WHERE owner_id = ?1 AND tenant_id IS ?2
               AND income_date >= ?3 AND income_date <= ?4
             ORDER BY income_date ASC, id ASC",
        )?;

        let incomes = stmt
            .query_map(params![scope.owner, scope.tenant, from, to], |row| {
                Ok(IncomeRecord {
                    id: Some(row.get(0)?),
                    scope: ScopeKey {
                        tenant: row.get(1)?,
                        owner: row.get(2)?,
                    },
                    date: row.get(3)?,
                    amount_mxn: get_decimal_value(row, 4)?,
                    exchange_rate: get_optional_decimal_value(row, 5)?,
                    amount_usd: get_optional_decimal_value(row, 6)?,
                    source: row.get(7)?,
                    description: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read incomes")?;

        ensure_no_issues(&validate_records(&incomes, validate_income))
            .context("Invalid incomes in database")?;
        Ok(incomes)
    }

    fn list_deductible_expenses(
        &self,
        scope: &ScopeKey,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DeductibleExpenseRecord>> {
        let mut stmt = self.prepare(
            "SELECT id, tenant_id, owner_id, expense_date, amount_mxn, vendor, description
             FROM deductible_expenses
             WHERE owner_id = ?1 AND tenant_id IS ?2
               AND expense_date >= ?3 AND expense_date <= ?4
             ORDER BY expense_date ASC, id ASC",
        )?;

        let expenses = stmt
            .query_map(params![scope.owner, scope.tenant, from, to], |row| {
                Ok(DeductibleExpenseRecord {
                    id: Some(row.get(0)?),
                    scope: ScopeKey {
                        tenant: row.get(1)?,
                        owner: row.get(2)?,
                    },
                    date: row.get(3)?,
                    amount_mxn: get_decimal_value(row, 4)?,
                    vendor: row.get(5)?,
                    description: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read deductible expenses")?;

        ensure_no_issues(&validate_records(&expenses, validate_deductible_expense))
            .context("Invalid deductible expenses in database")?;
        Ok(expenses)
    }

    fn list_expenses(
        &self,
        scope: &ScopeKey,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ExpenseRecord>> {
        let mut stmt = self.prepare(
            "SELECT id, tenant_id, owner_id, expense_date, amount_mxn, description
             FROM expenses
             WHERE owner_id = ?1 AND tenant_id IS ?2
               AND expense_date >= ?3 AND expense_date <= ?4
             ORDER BY expense_date ASC, id ASC",
        )?;

        let expenses = stmt
            .query_map(params![scope.owner, scope.tenant, from, to], |row| {
                Ok(ExpenseRecord {
                    id: Some(row.get(0)?),
                    scope: ScopeKey {
                        tenant: row.get(1)?,
                        owner: row.get(2)?,
                    },
                    date: row.get(3)?,
                    amount_mxn: get_decimal_value(row, 4)?,
                    description: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read expenses")?;

        ensure_no_issues(&validate_records(&expenses, validate_expense))
            .context("Invalid expenses in database")?;
        Ok(expenses)
    }

    fn list_tax_payments(
        &self,
        scope: &ScopeKey,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TaxPaymentRecord>> {
        let mut stmt = self.prepare(
            "SELECT id, tenant_id, owner_id, period_month, period_year,
                    amount_due, due_date, status, payment_date
             FROM tax_payments
             WHERE owner_id = ?1 AND tenant_id IS ?2
               AND ((status = 'PAID' AND payment_date >= ?3 AND payment_date <= ?4)
                 OR (status <> 'PAID' AND due_date >= ?3 AND due_date <= ?4))
             ORDER BY period_year ASC, period_month ASC, id ASC",
        )?;

        let payments = stmt
            .query_map(params![scope.owner, scope.tenant, from, to], |row| {
                let status = row
                    .get::<_, String>(7)?
                    .parse::<TaxPaymentStatus>()
                    .map_err(|_| {
                        rusqlite::Error::InvalidColumnType(7, "status".to_string(), Type::Text)
                    })?;

                Ok(TaxPaymentRecord {
                    id: Some(row.get(0)?),
                    scope: ScopeKey {
                        tenant: row.get(1)?,
                        owner: row.get(2)?,
                    },
                    period_month: row.get(3)?,
                    period_year: row.get(4)?,
                    amount_due: get_decimal_value(row, 5)?,
                    due_date: row.get(6)?,
                    status,
                    payment_date: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read tax payments")?;

        ensure_no_issues(&validate_records(&payments, validate_tax_payment))
            .context("Invalid tax payments in database")?;
        Ok(payments)
    }
}

/// Helper to read Decimal from SQLite (handles INTEGER, REAL and TEXT)
pub fn get_decimal_value(row: &rusqlite::Row, idx: usize) -> Result<Decimal, rusqlite::Error> {
    match row.get_ref(idx)? {
        ValueRef::Text(bytes) => {
            let s = std::str::from_utf8(bytes)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))?;
            Decimal::from_str(s.trim())
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
        }
        ValueRef::Integer(i) => Ok(Decimal::from(i)),
        ValueRef::Real(f) => Decimal::try_from(f)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Real, Box::new(e))),
        _ => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "decimal".to_string(),
            Type::Null,
        )),
    }
}

/// Helper to read optional Decimal from SQLite
pub fn get_optional_decimal_value(
    row: &rusqlite::Row,
    idx: usize,
) -> Result<Option<Decimal>, rusqlite::Error> {
    match row.get_ref(idx)? {
        ValueRef::Null => Ok(None),
        _ => get_decimal_value(row, idx).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();
        conn
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_init_database() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");

        init_database(Some(db_path.clone())).unwrap();
        // Second run must be a no-op
        init_database(Some(db_path.clone())).unwrap();

        let conn = Connection::open(&db_path).unwrap();
        let table_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table'
                 AND name IN ('incomes', 'deductible_expenses', 'expenses', 'tax_payments')",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(table_count, 4);
    }

    #[test]
    fn test_list_incomes_filters_scope_and_inclusive_range() {
        let conn = setup();
        conn.execute_batch(
            "INSERT INTO incomes (tenant_id, owner_id, income_date, amount_mxn, exchange_rate, source)
             VALUES (NULL, 'ana', '2024-05-01', '100.00', '17.250000', 'client a'),
                    (NULL, 'ana', '2024-05-31', '200.50', NULL, 'client b'),
                    (NULL, 'ana', '2024-06-01', '999.00', NULL, 'next month'),
                    (NULL, 'luis', '2024-05-10', '500.00', NULL, 'other owner'),
                    ('casa', 'ana', '2024-05-10', '700.00', NULL, 'tenant scoped');",
        )
        .unwrap();

        let incomes = conn
            .list_incomes(&ScopeKey::owner("ana"), date(2024, 5, 1), date(2024, 5, 31))
            .unwrap();

        assert_eq!(incomes.len(), 2);
        assert_eq!(incomes[0].amount_mxn, dec!(100.00));
        assert_eq!(incomes[0].exchange_rate, Some(dec!(17.25)));
        assert_eq!(incomes[1].amount_mxn, dec!(200.50));
        assert_eq!(incomes[1].exchange_rate, None);

        let tenant_incomes = conn
            .list_incomes(
                &ScopeKey::tenant("casa", "ana"),
                date(2024, 5, 1),
                date(2024, 5, 31),
            )
            .unwrap();
        assert_eq!(tenant_incomes.len(), 1);
        assert_eq!(tenant_incomes[0].amount_mxn, dec!(700.00));
    }

    #[test]
    fn test_decimal_columns_tolerate_numeric_affinity() {
        let conn = setup();
        conn.execute_batch(
            "INSERT INTO expenses (owner_id, expense_date, amount_mxn) VALUES ('ana', '2024-01-02', 150);
             INSERT INTO expenses (owner_id, expense_date, amount_mxn) VALUES ('ana', '2024-01-03', 20.25);",
        )
        .unwrap();

        let expenses = conn
            .list_expenses(&ScopeKey::owner("ana"), date(2024, 1, 1), date(2024, 1, 31))
            .unwrap();

        assert_eq!(expenses.len(), 2);
        assert_eq!(expenses[0].amount_mxn, dec!(150));
        assert_eq!(expenses[1].amount_mxn, dec!(20.25));
    }

    #[test]
    fn test_list_tax_payments_uses_effective_date() {
        let conn = setup();
        conn.execute_batch(
            "INSERT INTO tax_payments (owner_id, period_month, period_year, amount_due, due_date, status, payment_date)
             VALUES ('ana', 3, 2024, '300', '2024-04-17', 'PAID', '2024-05-02'),
                    ('ana', 4, 2024, '400', '2024-05-17', 'PENDING', NULL),
                    ('ana', 2, 2024, '200', '2024-05-17', 'PAID', '2024-03-15');",
        )
        .unwrap();

        let payments = conn
            .list_tax_payments(&ScopeKey::owner("ana"), date(2024, 5, 1), date(2024, 5, 31))
            .unwrap();

        // Paid in May (due in April) and pending due in May; the February
        // payment was settled in March
        assert_eq!(payments.len(), 2);
        assert_eq!(payments[0].amount_due, dec!(300));
        assert_eq!(payments[0].status, TaxPaymentStatus::Paid);
        assert_eq!(payments[1].amount_due, dec!(400));
        assert_eq!(payments[1].status, TaxPaymentStatus::Pending);
    }

    #[test]
    fn test_schema_rejects_paid_without_payment_date() {
        let conn = setup();
        let result = conn.execute(
            "INSERT INTO tax_payments (owner_id, period_month, period_year, amount_due, due_date, status)
             VALUES ('ana', 1, 2024, '100', '2024-02-17', 'PAID')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_init_creates_missing_parent_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("data.db");

        init_database(Some(db_path.clone())).unwrap();
        assert!(db_path.exists());
    }

    #[test]
    fn test_read_only_open_needs_an_existing_database() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("missing.db");

        let err = open_db_read_only(Some(db_path.clone())).unwrap_err();
        assert!(err.to_string().contains("resico init"));
        assert!(!db_path.exists());
    }

    #[test]
    fn test_read_only_connection_serves_queries_but_not_writes() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("data.db");
        init_database(Some(db_path.clone())).unwrap();
        Connection::open(&db_path)
            .unwrap()
            .execute(
                "INSERT INTO incomes (owner_id, income_date, amount_mxn) VALUES ('ana', '2024-05-01', '10')",
                [],
            )
            .unwrap();

        let conn = open_db_read_only(Some(db_path)).unwrap();
        let incomes = conn
            .list_incomes(&ScopeKey::owner("ana"), date(2024, 5, 1), date(2024, 5, 31))
            .unwrap();
        assert_eq!(incomes.len(), 1);

        let write = conn.execute(
            "INSERT INTO incomes (owner_id, income_date, amount_mxn) VALUES ('ana', '2024-05-02', '10')",
            [],
        );
        assert!(write.is_err());
    }

    #[test]
    fn test_schema_rejects_negative_amounts_and_non_positive_rates() {
        let conn = setup();
        let insert_income = |amount: &str, rate: Option<&str>| {
            conn.execute(
                "INSERT INTO incomes (owner_id, income_date, amount_mxn, exchange_rate)
                 VALUES ('ana', '2024-05-01', ?1, ?2)",
                params![amount, rate],
            )
        };

        assert!(insert_income("-10000", None).is_err());
        assert!(insert_income("100", Some("0")).is_err());
        assert!(insert_income("100", Some("-17")).is_err());
        assert!(insert_income("0", Some("17.5")).is_ok());

        assert!(conn
            .execute(
                "INSERT INTO expenses (owner_id, expense_date, amount_mxn) VALUES ('ana', '2024-05-01', '-1')",
                [],
            )
            .is_err());
        assert!(conn
            .execute(
                "INSERT INTO deductible_expenses (owner_id, expense_date, amount_mxn) VALUES ('ana', '2024-05-01', '-0.01')",
                [],
            )
            .is_err());
        assert!(conn
            .execute(
                "INSERT INTO tax_payments (owner_id, period_month, period_year, amount_due, due_date)
                 VALUES ('ana', 4, 2024, '-500', '2024-05-17')",
                [],
            )
            .is_err());
    }

    #[test]
    fn test_rows_from_an_unchecked_table_are_validated() {
        // A database created before the amount CHECKs existed
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE incomes (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 tenant_id TEXT,
                 owner_id TEXT NOT NULL,
                 income_date DATE NOT NULL,
                 amount_mxn TEXT NOT NULL,
                 exchange_rate TEXT,
                 amount_usd TEXT,
                 source TEXT NOT NULL DEFAULT '',
                 description TEXT
             );
             INSERT INTO incomes (owner_id, income_date, amount_mxn, exchange_rate)
             VALUES ('ana', '2024-05-01', '30000', NULL),
                    ('ana', '2024-05-02', '-10000', '-17');",
        )
        .unwrap();

        let err = conn
            .list_incomes(&ScopeKey::owner("ana"), date(2024, 5, 1), date(2024, 5, 31))
            .unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Invalid incomes in database"));
        assert!(message.contains("2 invalid record(s)"));
        assert!(message.contains("incomes[1].amount_mxn"));
        assert!(message.contains("incomes[1].exchange_rate"));

        // Zero rates are refused too, so they never reach the dashboard mean
        conn.execute_batch(
            "DELETE FROM incomes;
             INSERT INTO incomes (owner_id, income_date, amount_mxn, exchange_rate)
             VALUES ('ana', '2024-05-03', '500', '0');",
        )
        .unwrap();
        assert!(conn
            .list_incomes(&ScopeKey::owner("ana"), date(2024, 5, 1), date(2024, 5, 31))
            .is_err());
    }

    #[test]
    fn test_unparseable_decimal_is_an_error() {
        let conn = setup();
        conn.execute(
            "INSERT INTO deductible_expenses (owner_id, expense_date, amount_mxn, vendor)
             VALUES ('ana', '2024-01-05', 'twelve', 'CFE')",
            [],
        )
        .unwrap();

        let result =
            conn.list_deductible_expenses(&ScopeKey::owner("ana"), date(2024, 1, 1), date(2024, 1, 31));
        assert!(result.is_err());
    }
}
