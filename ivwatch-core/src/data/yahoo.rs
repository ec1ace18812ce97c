//! Yahoo Finance price provider.
//!
//! Fetches daily index bars from Yahoo's v8 chart API. Yahoo Finance has no
//! official API and is subject to unannounced format changes; parsing is
//! strict about structure and lenient about null cells.

use super::provider::{FetchError, Lookback, PriceSeriesSource};
use crate::domain::{IndexSymbol, PriceBar};
use chrono::{Days, NaiveDate, Utc};
use serde::Deserialize;
use std::time::Duration;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
}

/// Yahoo Finance price provider.
pub struct YahooPrices {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl YahooPrices {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| FetchError::NetworkUnreachable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }

    /// Build the chart API URL for a ticker and date range.
    fn chart_url(ticker: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_hms_opt(0, 0, 0).map_or(0, |dt| dt.and_utc().timestamp());
        let end_ts = end.and_hms_opt(23, 59, 59).map_or(0, |dt| dt.and_utc().timestamp());
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{ticker}\
             ?period1={start_ts}&period2={end_ts}&interval=1d"
        )
    }

    /// Date range ending today covering `lookback`.
    fn date_range(lookback: Lookback, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = today
            .checked_sub_days(Days::new(u64::from(lookback.days)))
            .unwrap_or(today);
        (start, today)
    }

    /// Parse the chart API response into bars, oldest first.
    fn parse_response(ticker: &str, resp: ChartResponse) -> Result<Vec<PriceBar>, FetchError> {
        let result = resp.chart.result.ok_or_else(|| {
            if let Some(err) = resp.chart.error {
                if err.code == "Not Found" {
                    FetchError::SymbolNotFound {
                        symbol: ticker.to_string(),
                    }
                } else {
                    FetchError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
                }
            } else {
                FetchError::ResponseFormatChanged("empty result with no error".into())
            }
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::ResponseFormatChanged("result array is empty".into()))?;

        // No timestamps means no sessions in range, not a format change.
        let timestamps = data.timestamp.unwrap_or_default();

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::ResponseFormatChanged("no quote data".into()))?;

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| FetchError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))?;

            let open = quote.open.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();

            // Holidays and half-built intraday rows come back as nulls
            if let (Some(open), Some(close)) = (open, close) {
                bars.push(PriceBar::new(date, open, close));
            }
        }

        Ok(bars)
    }
}

impl PriceSeriesSource for YahooPrices {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch_bars(&self, symbol: IndexSymbol, lookback: Lookback) -> Result<Vec<PriceBar>, FetchError> {
        let ticker = symbol.yahoo_ticker();
        let (start, end) = Self::date_range(lookback, Utc::now().date_naive());
        let url = Self::chart_url(ticker, start, end);

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| FetchError::from_transport(e, self.timeout.as_secs()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited { retry_after_secs: 60 });
        }
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                provider: "yahoo_finance",
                status: status.as_u16(),
            });
        }

        let chart: ChartResponse = resp.json().map_err(|e| {
            FetchError::ResponseFormatChanged(format!("failed to parse response for {ticker}: {e}"))
        })?;

        Self::parse_response(ticker, chart)
    }
}
