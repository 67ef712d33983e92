//! Month identifiers and per-month records

use anyhow::{Context, Result, anyhow};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// A calendar month, written as `MM/YY` where the year means `20YY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthLabel {
    year: i32,
    month: u32,
}

impl MonthLabel {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(anyhow!("Invalid month number: {month}"));
        }
        if !(2000..=2099).contains(&year) {
            return Err(anyhow!("Year out of range for a MM/YY label: {year}"));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The following month. Fails past `12/99`, the last representable label.
    pub fn next(&self) -> Result<Self> {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn last_day(&self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|d| d.pred_opt())
            .unwrap_or_default()
    }

    /// Day `day` of this month, clamped to the month's last day.
    pub fn day(&self, day: u32) -> NaiveDate {
        let last = self.last_day().day();
        NaiveDate::from_ymd_opt(self.year, self.month, day.clamp(1, last)).unwrap_or_default()
    }

    /// Every month from `start` to `end`, both inclusive. Empty when `start` is after `end`.
    pub fn range(start: MonthLabel, end: MonthLabel) -> Vec<MonthLabel> {
        let mut months = Vec::new();
        let mut current = start;
        while current <= end {
            months.push(current);
            match current.next() {
                Ok(next) => current = next,
                Err(_) => break,
            }
        }
        months
    }

    /// Parses the `YYYY-MM` form used for period boundaries.
    pub fn parse_year_month(s: &str) -> Result<Self> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| anyhow!("Month must be formatted as YYYY-MM: {s}"))?;
        if year.len() != 4 || month.len() != 2 {
            return Err(anyhow!("Month must be formatted as YYYY-MM: {s}"));
        }
        let year: i32 = year
            .parse()
            .with_context(|| format!("Invalid year in {s}"))?;
        let month: u32 = month
            .parse()
            .with_context(|| format!("Invalid month in {s}"))?;
        Self::new(year, month)
    }
}

impl From<NaiveDate> for MonthLabel {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl Display for MonthLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}/{:02}", self.month, self.year % 100)
    }
}

impl FromStr for MonthLabel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains('-') {
            return Self::parse_year_month(s);
        }
        let (month, year) = s
            .split_once('/')
            .ok_or_else(|| anyhow!("Month label must be formatted as MM/YY: {s}"))?;
        if month.len() != 2 || year.len() != 2 {
            return Err(anyhow!("Month label must be formatted as MM/YY: {s}"));
        }
        let month: u32 = month
            .parse()
            .with_context(|| format!("Invalid month in label {s}"))?;
        let year: i32 = year
            .parse()
            .with_context(|| format!("Invalid year in label {s}"))?;
        Self::new(2000 + year, month)
    }
}

impl TryFrom<String> for MonthLabel {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthLabel> for String {
    fn from(label: MonthLabel) -> Self {
        label.to_string()
    }
}

/// One month of income data inside a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthRecord {
    pub label: MonthLabel,
    /// Monthly inflation in percent. Zero means unknown.
    #[serde(default)]
    pub inflation_rate_pct: f64,
    /// Local currency units per foreign unit. Zero means unknown.
    #[serde(default)]
    pub exchange_rate: f64,
    #[serde(default)]
    pub local_income: f64,
    #[serde(default)]
    pub foreign_income: f64,
    /// Derived from the previous record's rate, see `metrics::refresh_exchange_rate_changes`.
    #[serde(default)]
    pub exchange_rate_change_pct: f64,
}

impl MonthRecord {
    /// A record with every numeric field at zero.
    pub fn empty(label: MonthLabel) -> Self {
        Self {
            label,
            inflation_rate_pct: 0.0,
            exchange_rate: 0.0,
            local_income: 0.0,
            foreign_income: 0.0,
            exchange_rate_change_pct: 0.0,
        }
    }
}
