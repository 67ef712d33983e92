//! Core business logic: month records, metrics and period editing

pub mod aggregator;
pub mod autofill;
pub mod cache;
pub mod config;
pub mod log;
pub mod metrics;
pub mod month;
pub mod period;
pub mod rates;

// Re-export main types for cleaner imports
pub use metrics::{PeriodMetrics, compute_period_metrics};
pub use month::{MonthLabel, MonthRecord};
pub use period::{MonthField, Period};
pub use rates::{ExchangeKind, ExchangeRateProvider, InflationProvider};
