use super::ui;
use crate::core::autofill::{self, FillReport, FillScope};
use crate::core::rates::{ExchangeKind, ExchangeRateProvider, InflationProvider, RateSampling};
use crate::store::PeriodStore;
use anyhow::Result;

fn print_report(what: &str, report: &FillReport) {
    println!(
        "{}: {} months updated, {} skipped",
        ui::style_text(what, ui::StyleType::TotalLabel),
        report.updated.len(),
        report.skipped
    );
    if !report.is_complete() {
        let failed: Vec<String> = report.failed.iter().map(|l| l.to_string()).collect();
        println!(
            "{}",
            ui::style_text(
                &format!("No data for {}, set to 0", failed.join(", ")),
                ui::StyleType::Error
            )
        );
    }
}

pub async fn fill_exchange(
    store: &PeriodStore,
    provider: &dyn ExchangeRateProvider,
    id: &str,
    kind: ExchangeKind,
    sampling: RateSampling,
    scope: FillScope,
) -> Result<FillReport> {
    let mut period = store.require(id)?;

    let pb = ui::new_progress_bar(
        period.months.len() as u64,
        format!("Fetching {kind} exchange rates..."),
    );
    let result =
        autofill::fill_exchange_rates(&mut period, provider, kind, sampling, scope, &|| {
            pb.inc(1)
        })
        .await;
    pb.finish_and_clear();

    let report = result?;
    store.update(&mut period)?;
    print_report("Exchange rates", &report);
    Ok(report)
}

pub async fn fill_inflation(
    store: &PeriodStore,
    provider: &dyn InflationProvider,
    id: &str,
    scope: FillScope,
) -> Result<FillReport> {
    let mut period = store.require(id)?;

    let pb = ui::new_progress_bar(1, "Fetching inflation...");
    let result = autofill::fill_inflation(&mut period, provider, scope).await;
    pb.finish_and_clear();

    let report = result?;
    store.update(&mut period)?;
    print_report("Inflation", &report);
    Ok(report)
}
