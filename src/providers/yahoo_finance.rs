use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::core::cache::Cache;
use crate::core::price::{HistoryProvider, PriceHistory, RawObservation};

// YahooHistoryProvider implementation for HistoryProvider
pub struct YahooHistoryProvider {
    base_url: String,
    cache: Arc<Cache<String, PriceHistory>>,
}

impl YahooHistoryProvider {
    pub fn new(base_url: &str, cache: Arc<Cache<String, PriceHistory>>) -> Self {
        YahooHistoryProvider {
            base_url: base_url.to_string(),
            cache,
        }
    }
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Option<Vec<ChartItem>>,
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
struct ChartMeta {
    currency: String,
    #[serde(alias = "gmtoffset")]
    gmt_offset: Option<i32>,
}

fn extract_observations(item: &ChartItem) -> Vec<RawObservation> {
    let offset = item
        .meta
        .gmt_offset
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix());

    let (Some(timestamps), Some(closes)) = (
        item.timestamp.as_ref(),
        item.indicators
            .as_ref()
            .and_then(|inds| inds.quote.first())
            .and_then(|q| q.close.as_ref()),
    ) else {
        return Vec::new();
    };

    // Days without a close (halts, partial rows) are left for the normalizer
    // to forward-fill.
    timestamps
        .iter()
        .zip(closes)
        .filter_map(|(ts, close)| {
            let close = (*close)?;
            let timestamp = DateTime::from_timestamp(*ts, 0)?.with_timezone(&offset);
            Some(RawObservation { timestamp, close })
        })
        .collect()
}

#[async_trait]
impl HistoryProvider for YahooHistoryProvider {
    #[instrument(
        name = "YahooHistoryFetch",
        skip(self),
        fields(symbol = %symbol)
    )]
    async fn fetch_history(&self, symbol: &str) -> Result<PriceHistory> {
        if let Some(cached) = self.cache.get(&symbol.to_string()).await {
            return Ok(cached);
        }

        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&range=max",
            self.base_url, symbol
        );
        debug!("Requesting price history from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("etfcmp/0.1")
            .build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {} URL: {}", e, symbol, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for symbol: {}",
                response.status(),
                symbol
            ));
        }

        let text = response.text().await?;
        let data: YahooChartResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", symbol, e))?;

        if let Some(err) = data.chart.error {
            return Err(anyhow!(
                "Provider error for symbol {}: {} ({})",
                symbol,
                err.description,
                err.code
            ));
        }

        let item = data
            .chart
            .result
            .as_ref()
            .and_then(|r| r.first())
            .ok_or_else(|| anyhow!("No price data found for symbol: {}", symbol))?;

        let history = PriceHistory {
            symbol: symbol.to_string(),
            currency: item.meta.currency.clone(),
            observations: extract_observations(item),
        };
        debug!(
            currency = %history.currency,
            observations = history.observations.len(),
            "Received Yahoo history"
        );

        self.cache.put(symbol.to_string(), history.clone()).await;

        Ok(history)
    }
}
