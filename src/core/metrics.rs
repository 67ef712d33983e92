//! Real performance metrics for a period.
//!
//! Computing runs in two phases: the per-month exchange-rate change is
//! rebuilt over the whole sequence, then the sequence is folded into a
//! [`PeriodMetrics`]. Every division by zero yields 0 instead of an error so
//! callers always have something to display.
use crate::core::aggregator;
use crate::core::month::MonthRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Result of one metrics computation. Returns and inflation are fractions,
/// `real_gain_pct` is already a percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodMetrics {
    pub initial_value: f64,
    pub final_value: f64,
    pub nominal_return: f64,
    pub accumulated_inflation: f64,
    pub accumulated_inflation_adjusted: f64,
    pub real_return: f64,
    pub real_purchasing_power: f64,
    pub real_gain: f64,
    pub real_gain_pct: f64,
}

/// Rebuilds `exchange_rate_change_pct` for every month from its predecessor.
///
/// The first month gets 0, and so does any month whose predecessor has no
/// rate. That 0 means "not computable", not "unchanged".
pub fn refresh_exchange_rate_changes(months: &mut [MonthRecord]) {
    let mut previous_rate: Option<f64> = None;
    for month in months.iter_mut() {
        month.exchange_rate_change_pct = match previous_rate {
            Some(prev) if prev != 0.0 => (month.exchange_rate - prev) / prev * 100.0,
            _ => 0.0,
        };
        previous_rate = Some(month.exchange_rate);
    }
}

/// Folds an already refreshed sequence into metrics. Does not touch the months.
pub fn summarize(months: &[MonthRecord]) -> PeriodMetrics {
    if months.is_empty() {
        return PeriodMetrics::default();
    }

    let initial_value = aggregator::initial_value(months);
    let final_value = aggregator::final_value(months);
    let nominal_return = if initial_value == 0.0 {
        0.0
    } else {
        (final_value - initial_value) / initial_value
    };

    let inflation_factor = aggregator::inflation_factor(months);
    let accumulated_inflation = inflation_factor - 1.0;
    let adjusted_inflation_factor = aggregator::adjusted_inflation_factor(months);
    let accumulated_inflation_adjusted = adjusted_inflation_factor - 1.0;

    let real_return = if 1.0 + accumulated_inflation == 0.0 {
        0.0
    } else {
        (1.0 + nominal_return) / (1.0 + accumulated_inflation) - 1.0
    };
    let real_purchasing_power = if inflation_factor == 0.0 {
        0.0
    } else {
        final_value / inflation_factor
    };
    let real_gain = real_purchasing_power - initial_value;
    let real_gain_pct = if initial_value == 0.0 {
        0.0
    } else {
        real_gain / initial_value * 100.0
    };

    PeriodMetrics {
        initial_value,
        final_value,
        nominal_return,
        accumulated_inflation,
        accumulated_inflation_adjusted,
        real_return,
        real_purchasing_power,
        real_gain,
        real_gain_pct,
    }
}

/// Refreshes the derived per-month fields in place and returns the metrics
/// of the sequence.
pub fn compute_period_metrics(months: &mut [MonthRecord]) -> PeriodMetrics {
    refresh_exchange_rate_changes(months);
    let metrics = summarize(months);
    debug!(
        months = months.len(),
        real_gain = metrics.real_gain,
        real_gain_pct = metrics.real_gain_pct,
        "Computed period metrics"
    );
    metrics
}
