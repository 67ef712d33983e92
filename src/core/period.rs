//! Periods and the edits a user can make to their months

use crate::core::metrics::{self, PeriodMetrics};
use crate::core::month::{MonthLabel, MonthRecord};
use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub start: Option<MonthLabel>,
    pub end: Option<MonthLabel>,
    pub months: Vec<MonthRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Written by [`Period::refresh_metrics`], for list views only.
    #[serde(default)]
    pub real_gain: Option<f64>,
    #[serde(default)]
    pub real_gain_pct: Option<f64>,
}

/// Editable fields of a month record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MonthField {
    Label,
    Inflation,
    ExchangeRate,
    LocalIncome,
    ForeignIncome,
}

/// Numeric month input. Anything that is not a finite number becomes 0.
fn parse_amount(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or_else(|| {
            warn!(input = raw, "Not a finite number, storing 0");
            0.0
        })
}

fn new_id(now: DateTime<Utc>) -> String {
    now.timestamp_micros().to_string()
}

impl Period {
    /// Creates a period with one empty month per calendar month from `start`
    /// to `end`, both inclusive.
    pub fn new(
        name: &str,
        description: Option<String>,
        start: MonthLabel,
        end: MonthLabel,
    ) -> Result<Self> {
        if name.trim().is_empty() {
            bail!("Period name cannot be empty");
        }
        if start > end {
            bail!("Period start {start} is after its end {end}");
        }
        let now = Utc::now();
        let months = MonthLabel::range(start, end)
            .into_iter()
            .map(MonthRecord::empty)
            .collect();
        Ok(Self {
            id: new_id(now),
            name: name.trim().to_string(),
            description,
            start: Some(start),
            end: Some(end),
            months,
            created_at: now,
            updated_at: now,
            real_gain: None,
            real_gain_pct: None,
        })
    }

    /// A copy under a new id and name, with fresh timestamps.
    pub fn duplicated(&self) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(now),
            name: format!("Copy of {}", self.name),
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }

    /// Recomputes the metrics over the months and caches the summary fields.
    pub fn refresh_metrics(&mut self) -> PeriodMetrics {
        let result = metrics::compute_period_metrics(&mut self.months);
        if self.months.is_empty() {
            self.real_gain = None;
            self.real_gain_pct = None;
        } else {
            self.real_gain = Some(result.real_gain);
            self.real_gain_pct = Some(result.real_gain_pct);
        }
        result
    }

    pub fn add_month(&mut self, label: MonthLabel) {
        debug!(period = %self.id, %label, "Adding month");
        self.months.push(MonthRecord::empty(label));
        self.refresh_metrics();
    }

    /// Appends a copy of the last month's values under `label`, or under the
    /// month following the last one.
    pub fn repeat_last_month(&mut self, label: Option<MonthLabel>) -> Result<MonthLabel> {
        let last = self
            .months
            .last()
            .ok_or_else(|| anyhow!("Period {} has no month to repeat", self.name))?;
        let label = match label {
            Some(label) => label,
            None => last.label.next()?,
        };
        let repeated = MonthRecord {
            label,
            exchange_rate_change_pct: 0.0,
            ..last.clone()
        };
        self.months.push(repeated);
        self.refresh_metrics();
        Ok(label)
    }

    /// Updates one field of the month at `index` (zero based).
    ///
    /// Numeric input that is not a finite number is stored as 0.
    pub fn set_month_field(&mut self, index: usize, field: MonthField, raw: &str) -> Result<()> {
        let count = self.months.len();
        let month = self
            .months
            .get_mut(index)
            .ok_or_else(|| anyhow!("Month #{} does not exist, period has {count}", index + 1))?;

        match field {
            MonthField::Label => month.label = raw.parse()?,
            MonthField::Inflation => month.inflation_rate_pct = parse_amount(raw),
            MonthField::ExchangeRate => month.exchange_rate = parse_amount(raw),
            MonthField::LocalIncome => month.local_income = parse_amount(raw),
            MonthField::ForeignIncome => month.foreign_income = parse_amount(raw),
        }
        self.refresh_metrics();
        Ok(())
    }

    pub fn remove_month(&mut self, index: usize) -> Result<MonthRecord> {
        if index >= self.months.len() {
            bail!(
                "Month #{} does not exist, period has {}",
                index + 1,
                self.months.len()
            );
        }
        let removed = self.months.remove(index);
        self.refresh_metrics();
        Ok(removed)
    }
}
