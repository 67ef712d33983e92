//! Single period view and month edits

use super::ui;
use crate::core::aggregator::monthly_total;
use crate::core::metrics::PeriodMetrics;
use crate::core::month::MonthLabel;
use crate::core::period::{MonthField, Period};
use crate::store::PeriodStore;
use anyhow::{Result, bail};
use comfy_table::Cell;

fn metrics_block(metrics: &PeriodMetrics) -> String {
    let pct = |fraction: f64| format!("{:.2}%", fraction * 100.0);
    let rows = [
        ("Initial value", format!("{:.2}", metrics.initial_value), None),
        ("Final value", format!("{:.2}", metrics.final_value), None),
        ("Nominal return", pct(metrics.nominal_return), None),
        ("Accumulated inflation", pct(metrics.accumulated_inflation), None),
        (
            "Inflation (adjusted)",
            pct(metrics.accumulated_inflation_adjusted),
            None,
        ),
        (
            "Real return",
            pct(metrics.real_return),
            Some(metrics.real_return),
        ),
        (
            "Real purchasing power",
            format!("{:.2}", metrics.real_purchasing_power),
            None,
        ),
        (
            "Real gain",
            format!("{:.2}", metrics.real_gain),
            Some(metrics.real_gain),
        ),
        (
            "Real gain (%)",
            format!("{:.2}%", metrics.real_gain_pct),
            Some(metrics.real_gain_pct),
        ),
    ];

    rows.iter()
        .map(|(label, text, sign)| {
            let value = match sign {
                Some(v) => ui::signed_text(*v, text),
                None => text.clone(),
            };
            format!("{}: {}", ui::style_text(label, ui::StyleType::TotalLabel), value)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl Period {
    pub fn display_as_table(&self, metrics: &PeriodMetrics) -> String {
        let mut output = format!(
            "Period: {} ({})\n",
            ui::style_text(&self.name, ui::StyleType::Title),
            self.id
        );
        if let Some(description) = &self.description {
            output.push_str(&ui::style_text(description, ui::StyleType::Subtle));
            output.push('\n');
        }
        output.push('\n');

        if self.months.is_empty() {
            output.push_str(&ui::style_text(
                "This period has no months.",
                ui::StyleType::Subtle,
            ));
        } else {
            let mut table = ui::new_styled_table();
            table.set_header(vec![
                ui::header_cell("#"),
                ui::header_cell("Month"),
                ui::header_cell("Inflation (%)"),
                ui::header_cell("Exchange rate"),
                ui::header_cell("Δ rate (%)"),
                ui::header_cell("Local income"),
                ui::header_cell("Foreign income"),
                ui::header_cell("Total"),
            ]);
            for (i, month) in self.months.iter().enumerate() {
                table.add_row(vec![
                    Cell::new(i + 1),
                    Cell::new(month.label),
                    ui::amount_cell(month.inflation_rate_pct),
                    ui::amount_cell(month.exchange_rate),
                    ui::change_cell(month.exchange_rate_change_pct),
                    ui::amount_cell(month.local_income),
                    ui::amount_cell(month.foreign_income),
                    ui::amount_cell(monthly_total(month)),
                ]);
            }
            output.push_str(&table.to_string());
        }

        output.push_str("\n\n");
        output.push_str(&metrics_block(metrics));
        output
    }
}

pub fn show(store: &PeriodStore, id: &str) -> Result<()> {
    let mut period = store.require(id)?;
    let metrics = period.refresh_metrics();
    println!("{}", period.display_as_table(&metrics));
    Ok(())
}

/// Converts a row number as shown by `show` into an index.
fn row_index(row: usize) -> Result<usize> {
    if row == 0 {
        bail!("Month numbers start at 1");
    }
    Ok(row - 1)
}

fn save(store: &PeriodStore, period: &mut Period) -> Result<()> {
    store.update(period)?;
    if let Some(gain) = period.real_gain_pct {
        println!(
            "Real gain now {}",
            ui::signed_text(gain, &format!("{gain:.2}%"))
        );
    }
    Ok(())
}

pub fn add_month(store: &PeriodStore, id: &str, label: MonthLabel) -> Result<()> {
    let mut period = store.require(id)?;
    period.add_month(label);
    save(store, &mut period)?;
    println!("Added {label} to {}", period.name);
    Ok(())
}

pub fn repeat_month(store: &PeriodStore, id: &str, label: Option<MonthLabel>) -> Result<()> {
    let mut period = store.require(id)?;
    let label = period.repeat_last_month(label)?;
    save(store, &mut period)?;
    println!("Repeated last month as {label} in {}", period.name);
    Ok(())
}

pub fn edit_month(
    store: &PeriodStore,
    id: &str,
    row: usize,
    field: MonthField,
    value: &str,
) -> Result<()> {
    let mut period = store.require(id)?;
    period.set_month_field(row_index(row)?, field, value)?;
    save(store, &mut period)?;
    println!("Updated month #{row} of {}", period.name);
    Ok(())
}

pub fn delete_month(store: &PeriodStore, id: &str, row: usize) -> Result<()> {
    let mut period = store.require(id)?;
    let removed = period.remove_month(row_index(row)?)?;
    save(store, &mut period)?;
    println!("Removed {} from {}", removed.label, period.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn label(s: &str) -> MonthLabel {
        s.parse().unwrap()
    }

    fn stored_period(store: &PeriodStore) -> Period {
        let period = Period::new("Salary", None, label("01/24"), label("02/24")).unwrap();
        store.insert(&period).unwrap();
        period
    }

    #[test]
    fn test_display_contains_months_and_metrics() {
        let mut period = Period::new(
            "Salary",
            Some("Main job".to_string()),
            label("01/24"),
            label("02/24"),
        )
        .unwrap();
        period.months[0].exchange_rate = 800.0;
        period.months[0].local_income = 100_000.0;
        period.months[1].exchange_rate = 1000.0;
        period.months[1].local_income = 150_000.0;
        let metrics = period.refresh_metrics();

        let output = period.display_as_table(&metrics);
        assert!(output.contains("Main job"));
        assert!(output.contains("02/24"));
        assert!(output.contains("25.00%"));
        assert!(output.contains("Nominal return"));
        assert!(output.contains("50.00%"));
    }

    #[test]
    fn test_display_empty_period() {
        let mut period = Period::new("Empty", None, label("01/24"), label("01/24")).unwrap();
        period.remove_month(0).unwrap();
        let output = period.display_as_table(&PeriodMetrics::default());
        assert!(output.contains("no months"));
        assert!(output.contains("Real gain"));
    }

    #[test]
    fn test_month_edits_are_persisted() {
        let dir = tempdir().unwrap();
        let store = PeriodStore::open(dir.path(), None).unwrap();
        let period = stored_period(&store);

        edit_month(&store, &period.id, 1, MonthField::ExchangeRate, "800").unwrap();
        edit_month(&store, &period.id, 2, MonthField::ExchangeRate, "1000").unwrap();
        add_month(&store, &period.id, label("03/24")).unwrap();
        repeat_month(&store, &period.id, None).unwrap();

        let saved = store.require(&period.id).unwrap();
        let labels: Vec<String> = saved.months.iter().map(|m| m.label.to_string()).collect();
        assert_eq!(labels, vec!["01/24", "02/24", "03/24", "04/24"]);
        assert_eq!(saved.months[1].exchange_rate_change_pct, 25.0);

        delete_month(&store, &period.id, 4).unwrap();
        assert_eq!(store.require(&period.id).unwrap().months.len(), 3);
    }

    #[test]
    fn test_non_finite_edit_keeps_period_readable() {
        let dir = tempdir().unwrap();
        let store = PeriodStore::open(dir.path(), None).unwrap();
        let period = stored_period(&store);

        edit_month(&store, &period.id, 1, MonthField::Inflation, "nan").unwrap();
        edit_month(&store, &period.id, 2, MonthField::ExchangeRate, "inf").unwrap();

        let saved = store.require(&period.id).unwrap();
        assert_eq!(saved.months[0].inflation_rate_pct, 0.0);
        assert_eq!(saved.months[1].exchange_rate, 0.0);
        assert_eq!(store.list().unwrap().len(), 1);
        show(&store, &period.id).unwrap();
    }

    #[test]
    fn test_repeat_month_past_last_label_is_rejected() {
        let dir = tempdir().unwrap();
        let store = PeriodStore::open(dir.path(), None).unwrap();
        let period = Period::new("Late", None, label("11/99"), label("12/99")).unwrap();
        store.insert(&period).unwrap();

        assert!(repeat_month(&store, &period.id, None).is_err());
        let saved = store.require(&period.id).unwrap();
        let labels: Vec<String> = saved.months.iter().map(|m| m.label.to_string()).collect();
        assert_eq!(labels, vec!["11/99", "12/99"]);
    }

    #[test]
    fn test_row_zero_is_rejected() {
        let dir = tempdir().unwrap();
        let store = PeriodStore::open(dir.path(), None).unwrap();
        let period = stored_period(&store);

        assert!(edit_month(&store, &period.id, 0, MonthField::LocalIncome, "1").is_err());
        assert!(delete_month(&store, &period.id, 3).is_err());
        assert!(show(&store, "missing").is_err());
    }
}
