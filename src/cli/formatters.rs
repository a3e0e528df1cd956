//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of data calculation from presentation.

use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use resico::reports::DashboardCharts;
use resico::tax::{AnnualTaxSummary, MonthlyTaxSummary, ResicoBracket};
use resico::utils::{format_amount, format_currency, format_exchange_rate, format_rate_pct};

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn month_label(month: u32, year: i32) -> String {
    let name = MONTH_NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("???");
    format!("{} {}", name, year)
}

fn colored_flow(value: Decimal) -> String {
    if value >= Decimal::ZERO {
        format_amount(value).green().to_string()
    } else {
        format_amount(value).red().to_string()
    }
}

/// Pretty JSON for any serializable result
pub fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Result of `tax calc`
#[derive(Debug, Serialize)]
pub struct IsrCalculation {
    pub monthly_income: Decimal,
    pub rate: Decimal,
    pub estimated_isr: Decimal,
    pub effective_rate: Decimal,
}

impl IsrCalculation {
    pub fn new(monthly_income: Decimal, bracket: &ResicoBracket, estimated_isr: Decimal) -> Self {
        Self {
            monthly_income,
            rate: bracket.rate,
            estimated_isr,
            effective_rate: resico::tax::effective_rate(estimated_isr, monthly_income),
        }
    }
}

pub fn format_isr_calculation(calc: &IsrCalculation) -> String {
    format!(
        "\n{} RESICO ISR\n\n  {:<16} {}\n  {:<16} {}\n  {:<16} {}\n",
        "🧮".cyan().bold(),
        "Income:",
        format_currency(calc.monthly_income).cyan(),
        "Rate:",
        format_rate_pct(calc.rate),
        "ISR:".bold(),
        format_currency(calc.estimated_isr).yellow().bold()
    )
}

pub fn format_monthly_summary(summary: &MonthlyTaxSummary) -> String {
    let mut output = format!(
        "\n{} Tax Summary - {}\n\n",
        "📊".cyan().bold(),
        month_label(summary.month, summary.year)
    );

    let lines = [
        ("Income:", format_currency(summary.total_income)),
        (
            "Deductible:",
            format_currency(summary.total_deductible_expenses),
        ),
        ("Taxable base:", format_currency(summary.taxable_base)),
        ("Effective rate:", format_rate_pct(summary.effective_rate)),
        ("Due date:", summary.payment_due_date.format("%Y-%m-%d").to_string()),
    ];
    for (label, value) in lines {
        output.push_str(&format!("  {:<16} {}\n", label, value));
    }
    output.push_str(&format!(
        "  {:<16} {}\n",
        "Estimated ISR:".bold(),
        format_currency(summary.estimated_isr).yellow().bold()
    ));

    output
}

pub fn format_annual_summary(summary: &AnnualTaxSummary) -> String {
    #[derive(Tabled)]
    struct MonthRow {
        #[tabled(rename = "Month")]
        month: String,
        #[tabled(rename = "Income (MXN)")]
        income: String,
        #[tabled(rename = "Deductible (MXN)")]
        deductible: String,
        #[tabled(rename = "Taxable Base (MXN)")]
        base: String,
        #[tabled(rename = "ISR (MXN)")]
        isr: String,
        #[tabled(rename = "Rate")]
        rate: String,
    }

    let rows: Vec<MonthRow> = summary
        .monthly_summaries
        .iter()
        .map(|m| MonthRow {
            month: month_label(m.month, m.year),
            income: format_amount(m.total_income),
            deductible: format_amount(m.total_deductible_expenses),
            base: format_amount(m.taxable_base),
            isr: format_amount(m.estimated_isr),
            rate: format_rate_pct(m.effective_rate),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();

    let mut output = format!("\n{} Tax Summary - {}\n\n", "📊".cyan().bold(), summary.year);
    output.push_str(&table);

    output.push_str(&format!("\n\n{} Annual Total\n", "📈".cyan().bold()));
    output.push_str(&format!(
        "  {:<16} {}\n",
        "Income:",
        format_currency(summary.total_annual_income).cyan()
    ));
    output.push_str(&format!(
        "  {:<16} {}\n",
        "Deductible:",
        format_currency(summary.total_annual_deductible)
    ));
    output.push_str(&format!(
        "  {:<16} {}\n",
        "Average rate:",
        format_rate_pct(summary.average_effective_rate)
    ));
    output.push_str(&format!(
        "  {:<16} {}\n",
        "ISR:".bold(),
        format_currency(summary.total_annual_isr).yellow().bold()
    ));

    output
}

pub fn format_dashboard(charts: &DashboardCharts) -> String {
    #[derive(Tabled)]
    struct DashboardRow {
        #[tabled(rename = "Month")]
        month: String,
        #[tabled(rename = "Income (MXN)")]
        income: String,
        #[tabled(rename = "Expenses (MXN)")]
        expenses: String,
        #[tabled(rename = "Tax Paid (MXN)")]
        tax: String,
        #[tabled(rename = "Net (MXN)")]
        net: String,
        #[tabled(rename = "MXN/USD")]
        rate: String,
    }

    let rows: Vec<DashboardRow> = charts
        .cash_flow
        .iter()
        .zip(charts.volatility.iter())
        .map(|(flow, fx)| DashboardRow {
            month: month_label(flow.month, flow.year),
            income: format_amount(flow.total_income),
            expenses: format_amount(flow.total_expenses),
            tax: format_amount(flow.total_tax_payments),
            net: colored_flow(flow.net_flow()),
            rate: format_exchange_rate(fx.average_exchange_rate),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());

    format!(
        "\n{} Dashboard - 6 months before {}\n\n{}\n",
        "💰".cyan().bold(),
        charts.as_of.format("%Y-%m-%d"),
        table
    )
}
