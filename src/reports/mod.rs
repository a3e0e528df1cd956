// Reports module - dashboard chart series

pub mod dashboard;

pub use dashboard::{
    build_dashboard, trailing_months, CashFlowPoint, DashboardCharts, VolatilityPoint,
    TRAILING_MONTHS,
};
