use crate::core::cache::QuoteCache;
use crate::core::rates::{DailyQuote, ExchangeRateProvider, Quote};
use crate::providers::util::{RetryPolicy, get_json_with_retry, new_client};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Historical ARS/USD quotes from the Bluelytics API.
pub struct BluelyticsProvider {
    base_url: String,
    client: reqwest::Client,
    cache: Arc<QuoteCache>,
    retry: RetryPolicy,
}

impl BluelyticsProvider {
    pub fn new(base_url: &str, cache: Arc<QuoteCache>) -> Result<Self> {
        Ok(BluelyticsProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: new_client()?,
            cache,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[derive(Debug, Deserialize)]
struct BluelyticsQuote {
    value_buy: f64,
    value_avg: f64,
    value_sell: f64,
}

impl From<BluelyticsQuote> for Quote {
    fn from(q: BluelyticsQuote) -> Self {
        Quote {
            buy: q.value_buy,
            avg: q.value_avg,
            sell: q.value_sell,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BluelyticsHistoricalResponse {
    oficial: Option<BluelyticsQuote>,
    blue: Option<BluelyticsQuote>,
}

#[async_trait]
impl ExchangeRateProvider for BluelyticsProvider {
    #[instrument(name = "BluelyticsQuoteFetch", skip(self), fields(date = %date))]
    async fn quote_for_day(&self, date: NaiveDate) -> Result<DailyQuote> {
        if let Some(cached) = self.cache.get(&date).await {
            return Ok(cached);
        }

        let url = format!(
            "{}/historical?day={}",
            self.base_url,
            date.format("%Y-%m-%d")
        );
        debug!("Requesting exchange rate from {}", url);

        let data: BluelyticsHistoricalResponse = get_json_with_retry(&self.client, &url, self.retry)
            .await
            .with_context(|| format!("Failed to fetch exchange rate for {date}"))?;

        if data.oficial.is_none() && data.blue.is_none() {
            return Err(anyhow!("No exchange rate data found for {}", date));
        }

        let quote = DailyQuote {
            date,
            official: data.oficial.map(Quote::from),
            blue: data.blue.map(Quote::from),
        };
        self.cache.put(date, quote).await;
        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MOCK_JSON: &str = r#"{
        "oficial": {"value_avg": 825.5, "value_sell": 845.0, "value_buy": 806.0},
        "blue": {"value_avg": 1005.0, "value_sell": 1015.0, "value_buy": 995.0},
        "oficial_euro": {"value_avg": 900.0, "value_sell": 920.0, "value_buy": 880.0},
        "last_update": "2024-01-05T18:00:00-03:00"
    }"#;

    async fn create_mock_server(day: &str, status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/historical"))
            .and(query_param("day", day))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn fast_provider(uri: &str) -> BluelyticsProvider {
        BluelyticsProvider::new(uri, Arc::new(QuoteCache::new()))
            .unwrap()
            .with_retry_policy(RetryPolicy {
                retries: 0,
                delay_ms: 1,
            })
    }

    #[tokio::test]
    async fn test_successful_quote_fetch() {
        let mock_server = create_mock_server("2024-01-05", 200, MOCK_JSON).await;
        let provider = fast_provider(&mock_server.uri());

        let quote = provider.quote_for_day(day("2024-01-05")).await.unwrap();
        assert_eq!(quote.date, day("2024-01-05"));
        let official = quote.official.unwrap();
        assert_eq!(official.sell, 845.0);
        assert_eq!(official.buy, 806.0);
        assert_eq!(quote.blue.unwrap().sell, 1015.0);
    }

    #[tokio::test]
    async fn test_quote_is_cached_per_day() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/historical"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MOCK_JSON))
            .expect(1)
            .mount(&mock_server)
            .await;

        let cache = Arc::new(QuoteCache::new());
        let provider = BluelyticsProvider::new(&mock_server.uri(), Arc::clone(&cache)).unwrap();

        provider.quote_for_day(day("2024-01-05")).await.unwrap();
        provider.quote_for_day(day("2024-01-05")).await.unwrap();
        assert_eq!(cache.stats(), (1, 1));
    }

    #[tokio::test]
    async fn test_missing_quotes_is_error() {
        let mock_server =
            create_mock_server("2024-01-06", 200, r#"{"last_update": "2024-01-06"}"#).await;
        let provider = fast_provider(&mock_server.uri());

        let result = provider.quote_for_day(day("2024-01-06")).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "No exchange rate data found for 2024-01-06"
        );
    }

    #[tokio::test]
    async fn test_api_error_response() {
        let mock_server = create_mock_server("2024-01-05", 500, "").await;
        let provider = fast_provider(&mock_server.uri());

        let result = provider.quote_for_day(day("2024-01-05")).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "Failed to fetch exchange rate for 2024-01-05"
        );
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url() {
        let mock_server = create_mock_server("2024-01-05", 200, MOCK_JSON).await;
        let provider = fast_provider(&format!("{}/", mock_server.uri()));
        assert!(provider.quote_for_day(day("2024-01-05")).await.is_ok());
    }
}
