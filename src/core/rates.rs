//! Exchange-rate and inflation data source abstractions

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Which market quote of the foreign currency to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeKind {
    #[default]
    Blue,
    Official,
}

impl Display for ExchangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ExchangeKind::Blue => "blue",
                ExchangeKind::Official => "official",
            }
        )
    }
}

/// How a month's exchange rate is derived from daily quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateSampling {
    /// The quote of one day of the month.
    Day(u32),
    /// The mean of every day of the month that has a quote.
    MonthlyAverage,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub buy: f64,
    pub avg: f64,
    pub sell: f64,
}

impl Quote {
    pub fn mean(quotes: &[Quote]) -> Option<Quote> {
        if quotes.is_empty() {
            return None;
        }
        let n = quotes.len() as f64;
        let sum = quotes.iter().fold((0.0, 0.0, 0.0), |acc, q| {
            (acc.0 + q.buy, acc.1 + q.avg, acc.2 + q.sell)
        });
        Some(Quote {
            buy: sum.0 / n,
            avg: sum.1 / n,
            sell: sum.2 / n,
        })
    }
}

/// Official and blue market quotes for one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyQuote {
    pub date: NaiveDate,
    pub official: Option<Quote>,
    pub blue: Option<Quote>,
}

impl DailyQuote {
    pub fn quote(&self, kind: ExchangeKind) -> Option<Quote> {
        match kind {
            ExchangeKind::Blue => self.blue,
            ExchangeKind::Official => self.official,
        }
    }
}

/// Monthly inflation reported for the month containing `date`, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InflationPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    async fn quote_for_day(&self, date: NaiveDate) -> Result<DailyQuote>;
}

#[async_trait]
pub trait InflationProvider: Send + Sync {
    async fn monthly_inflation(&self, from: NaiveDate, to: NaiveDate)
    -> Result<Vec<InflationPoint>>;
}
