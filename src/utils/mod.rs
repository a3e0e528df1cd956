//! Formatting helpers for amounts and rates
//!
//! Values are kept at full precision through every calculation and rounded
//! to cents only here, when they are turned into text.

use rust_decimal::Decimal;

/// Currency symbol options for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencySymbol {
    /// Include "$" prefix (Mexican peso)
    MXN,
    /// No currency symbol (for table cells)
    None,
}

/// Core formatting function with full control over output.
///
/// Formats a Decimal value using Mexican conventions:
/// - Thousands separator: `,` (comma)
/// - Decimal separator: `.` (period)
/// - Sign before the symbol: `-$1,234.56`
///
/// Values are rounded to 2 places with banker's rounding.
///
/// # Examples
/// ```
/// use resico::utils::{format_currency_with_width, CurrencySymbol};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(
///     format_currency_with_width(dec!(1234.56), 0, CurrencySymbol::MXN),
///     "$1,234.56"
/// );
///
/// assert_eq!(
///     format_currency_with_width(dec!(1234), 12, CurrencySymbol::None),
///     "    1,234.00"
/// );
/// ```
pub fn format_currency_with_width(value: Decimal, width: usize, symbol: CurrencySymbol) -> String {
    let rounded = value.round_dp(2);
    let is_negative = rounded < Decimal::ZERO;

    let formatted = format!("{:.2}", rounded.abs());
    let (integer_part, decimal_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    // Add thousands separators (,) to integer part
    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if is_negative { "-" } else { "" };
    let prefix = match symbol {
        CurrencySymbol::MXN => "$",
        CurrencySymbol::None => "",
    };

    let result = format!("{}{}{}.{}", sign, prefix, with_separators, decimal_part);

    // Apply width padding (right-align)
    if width > 0 && result.len() < width {
        format!("{:>width$}", result, width = width)
    } else {
        result
    }
}

/// Format as Mexican pesos with symbol: "$1,234.56"
///
/// # Examples
/// ```
/// use resico::utils::format_currency;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_currency(dec!(1234.56)), "$1,234.56");
/// assert_eq!(format_currency(dec!(-500)), "-$500.00");
/// ```
pub fn format_currency(value: Decimal) -> String {
    format_currency_with_width(value, 0, CurrencySymbol::MXN)
}

/// Format number only (no symbol): "1,234.56"
pub fn format_amount(value: Decimal) -> String {
    format_currency_with_width(value, 0, CurrencySymbol::None)
}

/// Format a fractional rate as a percentage with 2 places: 0.011 -> "1.10%"
///
/// # Examples
/// ```
/// use resico::utils::format_rate_pct;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_rate_pct(dec!(0.011)), "1.10%");
/// assert_eq!(format_rate_pct(dec!(0.0183333)), "1.83%");
/// ```
pub fn format_rate_pct(rate: Decimal) -> String {
    format!("{:.2}%", (rate * Decimal::ONE_HUNDRED).round_dp(2))
}

/// Format an MXN/USD exchange rate with 4 places, or "-" when there is none
pub fn format_exchange_rate(rate: Decimal) -> String {
    if rate.is_zero() {
        "-".to_string()
    } else {
        format!("{:.4}", rate.round_dp(4))
    }
}
