use super::ui;
use crate::core::month::MonthLabel;
use crate::core::period::Period;
use crate::store::PeriodStore;
use anyhow::Result;
use comfy_table::Cell;
use tracing::info;

fn bound(label: Option<MonthLabel>) -> String {
    label.map_or_else(|| "-".to_string(), |l| l.to_string())
}

pub fn render_list(periods: &[Period]) -> String {
    if periods.is_empty() {
        return ui::style_text(
            "No periods yet. Create one with `realgain create`.",
            ui::StyleType::Subtle,
        );
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id"),
        ui::header_cell("Name"),
        ui::header_cell("From"),
        ui::header_cell("To"),
        ui::header_cell("Months"),
        ui::header_cell("Real gain"),
        ui::header_cell("Real gain (%)"),
        ui::header_cell("Updated"),
    ]);

    for period in periods {
        table.add_row(vec![
            Cell::new(&period.id),
            Cell::new(&period.name),
            Cell::new(bound(period.start)),
            Cell::new(bound(period.end)),
            Cell::new(period.months.len()),
            ui::format_optional_cell(period.real_gain, |v| format!("{v:.2}")),
            period.real_gain_pct.map_or_else(|| ui::na_cell(false), ui::change_cell),
            Cell::new(period.updated_at.format("%Y-%m-%d %H:%M")),
        ]);
    }

    format!(
        "{}\n\n{}",
        ui::style_text("Periods", ui::StyleType::Title),
        table
    )
}

pub fn list(store: &PeriodStore) -> Result<()> {
    let periods = store.list()?;
    println!("{}", render_list(&periods));
    Ok(())
}

pub fn create(
    store: &PeriodStore,
    name: &str,
    description: Option<String>,
    start: MonthLabel,
    end: MonthLabel,
) -> Result<Period> {
    let mut period = Period::new(name, description, start, end)?;
    period.refresh_metrics();
    store.insert(&period)?;
    info!(id = %period.id, months = period.months.len(), "Created period");
    println!(
        "Created period {} ({}) with {} months",
        ui::style_text(&period.name, ui::StyleType::TotalLabel),
        period.id,
        period.months.len()
    );
    Ok(period)
}

pub fn duplicate(store: &PeriodStore, id: &str) -> Result<Period> {
    let copy = store.duplicate(id)?;
    println!(
        "Duplicated {} as {} ({})",
        id,
        ui::style_text(&copy.name, ui::StyleType::TotalLabel),
        copy.id
    );
    Ok(copy)
}

pub fn delete(store: &PeriodStore, id: &str) -> Result<()> {
    if store.delete(id)? {
        println!("Deleted period {id}");
        Ok(())
    } else {
        anyhow::bail!("No period found with id {id}")
    }
}
