//! RESICO monthly ISR schedule
//!
//! RESICO does not stack brackets: the first bracket whose upper bound covers
//! the monthly income selects a single flat rate, and that rate applies to
//! the whole income. A cumulative (marginal) formula gives wrong results here.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::{Result, TaxError};

/// One row of the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResicoBracket {
    /// Inclusive upper bound of monthly income; `None` for the open-ended row
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

/// Schedule in first-match order
pub static RESICO_BRACKETS: [ResicoBracket; 5] = [
    ResicoBracket {
        upper_bound: Some(dec!(25000.00)),
        rate: dec!(0.0100),
    },
    ResicoBracket {
        upper_bound: Some(dec!(50000.00)),
        rate: dec!(0.0110),
    },
    ResicoBracket {
        upper_bound: Some(dec!(83333.33)),
        rate: dec!(0.0150),
    },
    ResicoBracket {
        upper_bound: Some(dec!(208333.33)),
        rate: dec!(0.0200),
    },
    ResicoBracket {
        upper_bound: None,
        rate: dec!(0.0250),
    },
];

/// Bracket applied to a monthly income
pub fn bracket_for(monthly_income: Decimal) -> &'static ResicoBracket {
    let open_ended = &RESICO_BRACKETS[RESICO_BRACKETS.len() - 1];
    RESICO_BRACKETS
        .iter()
        .find(|b| b.upper_bound.is_none_or(|upper| monthly_income <= upper))
        .unwrap_or(open_ended)
}

/// Estimated ISR for a month's gross income.
///
/// The result is not rounded; callers round to cents when presenting it.
/// Negative income is rejected.
pub fn calculate_isr(monthly_income: Decimal) -> Result<Decimal> {
    if monthly_income < Decimal::ZERO {
        return Err(TaxError::NegativeAmount(monthly_income));
    }
    monthly_income
        .checked_mul(bracket_for(monthly_income).rate)
        .ok_or(TaxError::AmountOverflow("estimated ISR"))
}

/// Tax over income, or zero when there is no income
pub fn effective_rate(tax: Decimal, income: Decimal) -> Decimal {
    if income > Decimal::ZERO {
        tax / income
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_per_bracket() {
        assert_eq!(calculate_isr(dec!(10000)).unwrap(), dec!(100));
        assert_eq!(calculate_isr(dec!(25000)).unwrap(), dec!(250));
        assert_eq!(calculate_isr(dec!(30000)).unwrap(), dec!(330));
        assert_eq!(calculate_isr(dec!(60000)).unwrap(), dec!(900));
        assert_eq!(calculate_isr(dec!(100000)).unwrap(), dec!(2000));
        assert_eq!(calculate_isr(dec!(250000)).unwrap(), dec!(6250));
    }

    #[test]
    fn test_boundaries_take_lower_rate() {
        assert_eq!(bracket_for(dec!(25000.00)).rate, dec!(0.01));
        assert_eq!(bracket_for(dec!(50000.00)).rate, dec!(0.011));
        assert_eq!(bracket_for(dec!(83333.33)).rate, dec!(0.015));
        assert_eq!(bracket_for(dec!(208333.33)).rate, dec!(0.02));

        assert_eq!(calculate_isr(dec!(50000.00)).unwrap(), dec!(550));
        assert_eq!(calculate_isr(dec!(83333.33)).unwrap(), dec!(1249.99995));
        assert_eq!(calculate_isr(dec!(208333.33)).unwrap(), dec!(4166.6666));
    }

    #[test]
    fn test_one_cent_over_boundary_takes_next_rate() {
        assert_eq!(calculate_isr(dec!(25000.01)).unwrap(), dec!(275.00011));
        assert_eq!(calculate_isr(dec!(50000.01)).unwrap(), dec!(750.00015));
        assert_eq!(calculate_isr(dec!(83333.34)).unwrap(), dec!(1666.6668));
        assert_eq!(calculate_isr(dec!(208333.34)).unwrap(), dec!(5208.3335));
    }

    #[test]
    fn test_smallest_excess_over_boundary_takes_next_rate() {
        let tiny = Decimal::new(1, 20);
        assert_eq!(bracket_for(dec!(25000) + tiny).rate, dec!(0.011));
        assert_eq!(bracket_for(dec!(50000) + tiny).rate, dec!(0.015));
        assert_eq!(bracket_for(dec!(83333.33) + tiny).rate, dec!(0.02));
        assert_eq!(bracket_for(dec!(208333.33) + tiny).rate, dec!(0.025));
    }

    #[test]
    fn test_flat_rate_not_cumulative() {
        // A stacked schedule would tax the first 25,000 at 1% and the
        // remainder at 1.1% (525); RESICO applies 1.1% to everything.
        assert_eq!(calculate_isr(dec!(50000)).unwrap(), dec!(550));
        assert_ne!(calculate_isr(dec!(50000)).unwrap(), dec!(525));
    }

    #[test]
    fn test_zero_income_is_zero_tax() {
        assert_eq!(calculate_isr(Decimal::ZERO).unwrap(), Decimal::ZERO);
        assert_eq!(effective_rate(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_negative_income_is_rejected() {
        let err = calculate_isr(dec!(-0.01)).unwrap_err();
        assert!(matches!(err, TaxError::NegativeAmount(v) if v == dec!(-0.01)));
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_effective_rate_non_decreasing_across_boundaries() {
        let amounts = [
            dec!(0.01),
            dec!(1000),
            dec!(24999.99),
            dec!(25000),
            dec!(25000.01),
            dec!(49999.99),
            dec!(50000),
            dec!(50000.01),
            dec!(83333.33),
            dec!(83333.34),
            dec!(208333.33),
            dec!(208333.34),
            dec!(1000000),
        ];

        let rates: Vec<Decimal> = amounts
            .iter()
            .map(|a| effective_rate(calculate_isr(*a).unwrap(), *a))
            .collect();

        for pair in rates.windows(2) {
            assert!(pair[0] <= pair[1], "rate dropped: {} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_largest_amount_does_not_panic() {
        let isr = calculate_isr(Decimal::MAX).unwrap();
        assert_eq!(bracket_for(Decimal::MAX).rate, dec!(0.025));
        assert!(isr < Decimal::MAX);
    }

    #[test]
    fn test_result_is_not_rounded() {
        assert_eq!(calculate_isr(dec!(123.45)).unwrap(), dec!(1.2345));
    }
}
