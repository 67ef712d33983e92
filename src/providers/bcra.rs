use crate::core::rates::{InflationPoint, InflationProvider};
use crate::providers::util::{RetryPolicy, get_json_with_retry, new_client};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

/// Series id of monthly CPI variation in the BCRA statistics API.
const MONTHLY_INFLATION_SERIES: u32 = 27;

/// Monthly inflation published by the BCRA statistics API.
pub struct BcraInflationProvider {
    base_url: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl BcraInflationProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(BcraInflationProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: new_client()?,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[derive(Debug, Deserialize)]
struct BcraResponse {
    #[serde(default)]
    results: Vec<BcraResult>,
}

#[derive(Debug, Deserialize)]
struct BcraResult {
    fecha: String,
    valor: f64,
}

#[async_trait]
impl InflationProvider for BcraInflationProvider {
    #[instrument(name = "BcraInflationFetch", skip(self), fields(from = %from, to = %to))]
    async fn monthly_inflation(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<InflationPoint>> {
        let url = format!(
            "{}/estadisticas/v3.0/Monetarias/{}?desde={}&hasta={}",
            self.base_url,
            MONTHLY_INFLATION_SERIES,
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d")
        );
        debug!("Requesting inflation from {}", url);

        let data: BcraResponse = get_json_with_retry(&self.client, &url, self.retry)
            .await
            .context("Failed to fetch inflation")?;

        let points: Vec<InflationPoint> = data
            .results
            .into_iter()
            .filter_map(|r| match NaiveDate::parse_from_str(&r.fecha, "%Y-%m-%d") {
                Ok(date) => Some(InflationPoint {
                    date,
                    value: r.valor,
                }),
                Err(e) => {
                    warn!("Ignoring inflation entry with bad date '{}': {}", r.fecha, e);
                    None
                }
            })
            .collect();
        debug!("Received {} inflation points", points.len());
        Ok(points)
    }
}
