use realgain::AppCommand;
use realgain::core::autofill::FillScope;
use realgain::core::config::AppConfig;
use realgain::core::{MonthField, MonthLabel, Period};
use realgain::store::PeriodStore;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn quote_json(official: f64, blue: f64) -> String {
        format!(
            r#"{{
                "oficial": {{"value_avg": {official}, "value_sell": {official}, "value_buy": {official}}},
                "blue": {{"value_avg": {blue}, "value_sell": {blue}, "value_buy": {blue}}},
                "last_update": "2024-01-01T00:00:00-03:00"
            }}"#
        )
    }

    /// Serves blue quotes for the 5th of each listed day.
    pub async fn create_bluelytics_mock(days: &[(&str, f64)]) -> MockServer {
        let mock_server = MockServer::start().await;
        for (day, blue) in days {
            Mock::given(method("GET"))
                .and(path("/historical"))
                .and(query_param("day", *day))
                .respond_with(
                    ResponseTemplate::new(200).set_body_string(quote_json(blue / 2.0, *blue)),
                )
                .mount(&mock_server)
                .await;
        }
        mock_server
    }

    pub async fn create_bcra_mock(body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/estadisticas/v3.0/Monetarias/27"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }
}

fn write_config(dir: &Path, bluelytics: &str, bcra: &str, secret_key: Option<&str>) -> String {
    let config_path = dir.join("config.yaml");
    let mut content = format!(
        r#"
providers:
  bluelytics:
    base_url: "{bluelytics}"
  bcra:
    base_url: "{bcra}"
  retries: 0
  retry_delay_ms: 1
autofill:
  exchange_kind: blue
  sampling: day
  rate_day: 5
data_path: "{}"
"#,
        dir.join("data").display()
    );
    if let Some(key) = secret_key {
        content.push_str(&format!("secret_key: \"{key}\"\n"));
    }
    fs::write(&config_path, content).expect("Failed to write config file");
    config_path.to_string_lossy().into_owned()
}

fn stored_periods(config_path: &str) -> Vec<Period> {
    let config = AppConfig::load_from_path(config_path).unwrap();
    let store = PeriodStore::from_config(&config).unwrap();
    store.list().unwrap()
}

async fn run(command: AppCommand, config_path: &str) {
    let description = format!("{command:?}");
    let result = realgain::run_command(command, Some(config_path)).await;
    assert!(
        result.is_ok(),
        "{description} failed with: {:?}",
        result.err()
    );
}

fn label(s: &str) -> MonthLabel {
    s.parse().unwrap()
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let bluelytics = test_utils::create_bluelytics_mock(&[
        ("2024-01-05", 1000.0),
        ("2024-02-05", 1100.0),
        ("2024-03-05", 1210.0),
    ])
    .await;
    let bcra = test_utils::create_bcra_mock(
        r#"{"status": 200, "results": [
            {"idVariable": 27, "fecha": "2024-02-29", "valor": 13.2},
            {"idVariable": 27, "fecha": "2024-01-31", "valor": 20.6}
        ]}"#,
    )
    .await;

    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(temp_dir.path(), &bluelytics.uri(), &bcra.uri(), None);

    run(
        AppCommand::Create {
            name: "Remote job".to_string(),
            description: Some("Paid in dollars".to_string()),
            start: label("2024-01"),
            end: label("2024-03"),
        },
        &config_path,
    )
    .await;

    let periods = stored_periods(&config_path);
    assert_eq!(periods.len(), 1);
    let id = periods[0].id.clone();
    info!(%id, "Created period");

    for row in 1..=3 {
        run(
            AppCommand::EditMonth {
                id: id.clone(),
                row,
                field: MonthField::ForeignIncome,
                value: "1000".to_string(),
            },
            &config_path,
        )
        .await;
    }

    run(
        AppCommand::FillExchange {
            id: id.clone(),
            kind: None,
            sampling: None,
            scope: FillScope::All,
        },
        &config_path,
    )
    .await;
    run(
        AppCommand::FillInflation {
            id: id.clone(),
            scope: FillScope::All,
        },
        &config_path,
    )
    .await;
    run(AppCommand::Show { id: id.clone() }, &config_path).await;
    run(AppCommand::List, &config_path).await;

    let period = stored_periods(&config_path).remove(0);
    let rates: Vec<f64> = period.months.iter().map(|m| m.exchange_rate).collect();
    assert_eq!(rates, vec![1000.0, 1100.0, 1210.0]);
    let inflation: Vec<f64> = period.months.iter().map(|m| m.inflation_rate_pct).collect();
    assert_eq!(inflation, vec![20.6, 13.2, 0.0]);
    assert!((period.months[1].exchange_rate_change_pct - 10.0).abs() < 1e-9);

    // 21% nominal growth against 36.5% inflation is a real loss
    let gain_pct = period.real_gain_pct.unwrap();
    let expected = (1_210_000.0 / (1.206 * 1.132) - 1_000_000.0) / 1_000_000.0 * 100.0;
    assert!((gain_pct - expected).abs() < 1e-9, "{gain_pct} != {expected}");
    assert!(gain_pct < 0.0);
}

#[test_log::test(tokio::test)]
async fn test_period_management_flow() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(
        temp_dir.path(),
        "http://127.0.0.1:9",
        "http://127.0.0.1:9",
        None,
    );

    run(
        AppCommand::Create {
            name: "Salary".to_string(),
            description: None,
            start: label("2024-01"),
            end: label("2024-02"),
        },
        &config_path,
    )
    .await;
    let id = stored_periods(&config_path)[0].id.clone();

    run(
        AppCommand::RepeatMonth {
            id: id.clone(),
            label: None,
        },
        &config_path,
    )
    .await;
    run(
        AppCommand::AddMonth {
            id: id.clone(),
            label: label("05/24"),
        },
        &config_path,
    )
    .await;
    run(AppCommand::DeleteMonth { id: id.clone(), row: 1 }, &config_path).await;
    run(AppCommand::Duplicate { id: id.clone() }, &config_path).await;

    let periods = stored_periods(&config_path);
    assert_eq!(periods.len(), 2);
    let labels: Vec<String> = periods[0]
        .months
        .iter()
        .map(|m| m.label.to_string())
        .collect();
    assert_eq!(labels, vec!["02/24", "03/24", "05/24"]);
    assert_eq!(periods[1].name, "Copy of Salary");

    run(AppCommand::Delete { id: id.clone() }, &config_path).await;
    assert_eq!(stored_periods(&config_path).len(), 1);

    let result = realgain::run_command(AppCommand::Show { id }, Some(&config_path)).await;
    assert!(result.unwrap_err().to_string().contains("No period found"));
}

#[test_log::test(tokio::test)]
async fn test_encrypted_periods_need_the_key() {
    let temp_dir = TempDir::new().unwrap();
    let key = "0123456789abcdef0123456789abcdef";
    let keyed_config = write_config(
        temp_dir.path(),
        "http://127.0.0.1:9",
        "http://127.0.0.1:9",
        Some(key),
    );

    run(
        AppCommand::Create {
            name: "Private".to_string(),
            description: None,
            start: label("2024-01"),
            end: label("2024-01"),
        },
        &keyed_config,
    )
    .await;
    let id = stored_periods(&keyed_config)[0].id.clone();
    run(AppCommand::Show { id: id.clone() }, &keyed_config).await;

    // Same data directory, no key
    let plain_dir = temp_dir.path().join("plain");
    fs::create_dir_all(&plain_dir).unwrap();
    let plain_config = plain_dir.join("config.yaml");
    fs::write(
        &plain_config,
        format!("data_path: \"{}\"\n", temp_dir.path().join("data").display()),
    )
    .unwrap();

    let result =
        realgain::run_command(AppCommand::Show { id }, Some(plain_config.to_str().unwrap())).await;
    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
async fn test_fill_exchange_reports_missing_months() {
    // Only January has a quote
    let bluelytics = test_utils::create_bluelytics_mock(&[("2024-01-05", 1000.0)]).await;
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(
        temp_dir.path(),
        &bluelytics.uri(),
        "http://127.0.0.1:9",
        None,
    );

    run(
        AppCommand::Create {
            name: "Partial".to_string(),
            description: None,
            start: label("2024-01"),
            end: label("2024-02"),
        },
        &config_path,
    )
    .await;
    let id = stored_periods(&config_path)[0].id.clone();

    run(
        AppCommand::FillExchange {
            id: id.clone(),
            kind: None,
            sampling: None,
            scope: FillScope::All,
        },
        &config_path,
    )
    .await;

    let period = stored_periods(&config_path).remove(0);
    assert_eq!(period.months[0].exchange_rate, 1000.0);
    assert_eq!(period.months[1].exchange_rate, 0.0);
}
