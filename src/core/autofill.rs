//! Fills month records from the exchange-rate and inflation providers.
//!
//! A month whose value cannot be obtained gets 0 written into the field,
//! which the metrics treat as "unknown". The caller receives the list of
//! such months in the returned [`FillReport`].
use crate::core::month::MonthLabel;
use crate::core::period::Period;
use crate::core::rates::{
    ExchangeKind, ExchangeRateProvider, InflationProvider, Quote, RateSampling,
};
use anyhow::{Result, anyhow, bail};
use chrono::Datelike;
use clap::ValueEnum;
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Which months an auto-fill may overwrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum FillScope {
    #[default]
    All,
    /// Only months where the field is still 0.
    #[value(name = "empty")]
    EmptyOnly,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FillReport {
    pub updated: Vec<MonthLabel>,
    /// Months that were set to 0 because no value was available.
    pub failed: Vec<MonthLabel>,
    pub skipped: usize,
}

impl FillReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

async fn quote_for_month(
    provider: &dyn ExchangeRateProvider,
    label: MonthLabel,
    kind: ExchangeKind,
    sampling: RateSampling,
) -> Result<f64> {
    match sampling {
        RateSampling::Day(day) => {
            let daily = provider.quote_for_day(label.day(day)).await?;
            daily
                .quote(kind)
                .map(|q| q.sell)
                .ok_or_else(|| anyhow!("No {kind} quote for {}", daily.date))
        }
        RateSampling::MonthlyAverage => {
            let days = 1..=label.last_day().day();
            let results = join_all(days.map(|d| provider.quote_for_day(label.day(d)))).await;
            let valid: Vec<Quote> = results
                .into_iter()
                .filter_map(|r| match r {
                    Ok(daily) => daily.quote(kind),
                    Err(e) => {
                        debug!("Skipping day without quote in {label}: {e}");
                        None
                    }
                })
                .collect();
            debug!("{} valid days for {label}", valid.len());
            Quote::mean(&valid)
                .map(|q| q.sell)
                .ok_or_else(|| anyhow!("No valid {kind} quotes for month {label}"))
        }
    }
}

/// Months fetched concurrently. A monthly average already issues one request
/// per day of the month, so those months go one at a time.
fn months_in_flight(sampling: RateSampling) -> usize {
    match sampling {
        RateSampling::Day(_) => 8,
        RateSampling::MonthlyAverage => 1,
    }
}

/// Writes the `kind` sell rate of every month in `scope` and refreshes the
/// period metrics. `on_progress` is called once per fetched month.
pub async fn fill_exchange_rates(
    period: &mut Period,
    provider: &dyn ExchangeRateProvider,
    kind: ExchangeKind,
    sampling: RateSampling,
    scope: FillScope,
    on_progress: &(dyn Fn() + Sync),
) -> Result<FillReport> {
    if period.months.is_empty() {
        bail!("Period {} has no months to fill", period.name);
    }

    let mut report = FillReport::default();
    let targets: Vec<(usize, MonthLabel)> = period
        .months
        .iter()
        .enumerate()
        .filter(|(_, m)| scope == FillScope::All || m.exchange_rate == 0.0)
        .map(|(i, m)| (i, m.label))
        .collect();
    report.skipped = period.months.len() - targets.len();
    info!(
        "Filling {kind} exchange rate for {} months ({:?})",
        targets.len(),
        sampling
    );

    let results: Vec<(usize, MonthLabel, Result<f64>)> = stream::iter(targets)
        .map(|(index, label)| async move {
            let result = quote_for_month(provider, label, kind, sampling).await;
            on_progress();
            (index, label, result)
        })
        .buffered(months_in_flight(sampling))
        .collect()
        .await;

    for (index, label, result) in results {
        let month = &mut period.months[index];
        match result {
            Ok(rate) => {
                month.exchange_rate = rate;
                report.updated.push(label);
            }
            Err(e) => {
                warn!("Exchange rate unavailable for {label}: {e}");
                month.exchange_rate = 0.0;
                report.failed.push(label);
            }
        }
    }

    period.refresh_metrics();
    Ok(report)
}

/// Writes the monthly inflation of every month in `scope` and refreshes the
/// period metrics.
///
/// The provider is asked for the first month up to the second-to-last one,
/// since the last month's figure is normally not published yet. Months the
/// provider has no figure for get 0.
pub async fn fill_inflation(
    period: &mut Period,
    provider: &dyn InflationProvider,
    scope: FillScope,
) -> Result<FillReport> {
    let count = period.months.len();
    if count < 2 {
        bail!("Period must have at least two months to fill inflation");
    }
    let from = period.months[0].label.first_day();
    let to = period.months[count - 2].label.last_day();
    info!("Requesting inflation from {from} to {to}");

    let points = provider.monthly_inflation(from, to).await?;
    let by_month: HashMap<MonthLabel, f64> = points
        .into_iter()
        .map(|p| (MonthLabel::from(p.date), p.value))
        .collect();

    let mut report = FillReport::default();
    for month in period.months.iter_mut() {
        if scope == FillScope::EmptyOnly && month.inflation_rate_pct != 0.0 {
            report.skipped += 1;
            continue;
        }
        match by_month.get(&month.label) {
            Some(value) => {
                month.inflation_rate_pct = *value;
                report.updated.push(month.label);
            }
            None => {
                month.inflation_rate_pct = 0.0;
                report.failed.push(month.label);
            }
        }
    }

    period.refresh_metrics();
    Ok(report)
}
