// Tax module - RESICO monthly ISR schedule and period aggregation

pub mod annual;
pub mod monthly;
pub mod resico;

pub use annual::{summarize_year, AnnualTaxSummary};
pub use monthly::{month_bounds, provisional_payment_due_date, summarize_month, MonthlyTaxSummary};
pub use resico::{bracket_for, calculate_isr, effective_rate, ResicoBracket, RESICO_BRACKETS};
