//! Per-month and per-series arithmetic over month records.
//!
//! Nothing here fails: empty input yields the neutral value (0 for totals,
//! 1 for multiplicative factors) and records are not validated.
use crate::core::month::MonthRecord;

/// Income of one month in local currency.
pub fn monthly_total(month: &MonthRecord) -> f64 {
    month.local_income + month.foreign_income * month.exchange_rate
}

/// Total of the first month, or 0 for an empty series.
pub fn initial_value(months: &[MonthRecord]) -> f64 {
    months.first().map_or(0.0, monthly_total)
}

/// Total of the last month, or 0 for an empty series.
pub fn final_value(months: &[MonthRecord]) -> f64 {
    months.last().map_or(0.0, monthly_total)
}

fn inflation_term(month: &MonthRecord) -> f64 {
    1.0 + month.inflation_rate_pct / 100.0
}

/// Compounded inflation over the series, seeded at 1.
///
/// An empty series returns 1, which is indistinguishable from a series
/// with 0 % inflation every month.
pub fn inflation_factor(months: &[MonthRecord]) -> f64 {
    months.iter().fold(1.0, |acc, month| acc * inflation_term(month))
}

/// Compounded inflation with each month's term divided by that month's
/// exchange-rate movement, for income converted from the foreign currency.
///
/// Months without a rate change use the plain inflation term. A change of
/// exactly -100 % divides by zero and the factor becomes infinite (or NaN
/// when that month's inflation term is also zero).
pub fn adjusted_inflation_factor(months: &[MonthRecord]) -> f64 {
    months.iter().fold(1.0, |acc, month| {
        let term = if month.exchange_rate_change_pct != 0.0 {
            inflation_term(month) / (1.0 + month.exchange_rate_change_pct / 100.0)
        } else {
            inflation_term(month)
        };
        acc * term
    })
}
