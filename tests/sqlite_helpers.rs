#![allow(dead_code)]

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;

pub fn open_conn(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path).context("failed to open test database")?;
    resico::db::apply_schema(&conn)?;
    Ok(conn)
}

pub fn insert_income(
    conn: &Connection,
    owner: &str,
    date: &str,
    amount: &str,
    exchange_rate: Option<&str>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO incomes (owner_id, income_date, amount_mxn, exchange_rate, source)
         VALUES (?1, ?2, ?3, ?4, 'test client')",
        params![owner, date, amount, exchange_rate],
    )?;
    Ok(())
}

pub fn insert_deductible(conn: &Connection, owner: &str, date: &str, amount: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO deductible_expenses (owner_id, expense_date, amount_mxn, vendor)
         VALUES (?1, ?2, ?3, 'test vendor')",
        params![owner, date, amount],
    )?;
    Ok(())
}

pub fn insert_expense(conn: &Connection, owner: &str, date: &str, amount: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO expenses (owner_id, expense_date, amount_mxn) VALUES (?1, ?2, ?3)",
        params![owner, date, amount],
    )?;
    Ok(())
}

pub fn insert_tax_payment(
    conn: &Connection,
    owner: &str,
    period: (u32, i32),
    amount: &str,
    due_date: &str,
    payment_date: Option<&str>,
) -> Result<()> {
    let status = if payment_date.is_some() { "PAID" } else { "PENDING" };
    conn.execute(
        "INSERT INTO tax_payments
            (owner_id, period_month, period_year, amount_due, due_date, status, payment_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![owner, period.0, period.1, amount, due_date, status, payment_date],
    )?;
    Ok(())
}
