//! NSE option-chain provider.
//!
//! Fetches the index option chain from NSE's public JSON endpoint. NSE
//! rejects API calls without the cookies its home page sets, so every fetch
//! first warms the session against the home page.

use super::provider::{FetchError, OptionChainSource};
use crate::domain::{ChainRow, IndexSymbol, OptionChainSnapshot};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONNECTION, REFERER, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const HOME_URL: &str = "https://www.nseindia.com";
const CHAIN_URL: &str = "https://www.nseindia.com/api/option-chain-indices";

/// NSE option-chain API response (only the fields we read).
#[derive(Debug, Deserialize)]
struct ChainResponse {
    records: Option<Records>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Records {
    underlying_value: f64,
    #[serde(default)]
    data: Vec<StrikeEntry>,
}

#[derive(Debug, Deserialize)]
struct StrikeEntry {
    #[serde(rename = "strikePrice")]
    strike_price: f64,
    #[serde(rename = "CE")]
    call: Option<LegQuote>,
    #[serde(rename = "PE")]
    put: Option<LegQuote>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegQuote {
    implied_volatility: Option<f64>,
}

/// NSE option-chain provider.
pub struct NseOptionChain {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl NseOptionChain {
    /// Build a provider whose requests each time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .default_headers(browser_headers())
            .build()
            .map_err(|e| FetchError::NetworkUnreachable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }

    fn chain_url(symbol: IndexSymbol) -> String {
        format!("{CHAIN_URL}?symbol={}", symbol.name())
    }

    /// Parse the response body into a snapshot. Row order follows NSE's order.
    fn parse_response(symbol: IndexSymbol, resp: ChainResponse) -> Result<OptionChainSnapshot, FetchError> {
        // NSE answers blocked sessions with `{}` and a 200.
        let records = resp.records.ok_or_else(|| {
            FetchError::ResponseFormatChanged(format!("no records in option chain for {symbol}"))
        })?;

        let rows = records
            .data
            .into_iter()
            .map(|entry| {
                ChainRow::new(
                    entry.strike_price,
                    entry.call.and_then(|leg| leg.implied_volatility),
                    entry.put.and_then(|leg| leg.implied_volatility),
                )
            })
            .collect();

        Ok(OptionChainSnapshot {
            spot: records.underlying_value,
            rows,
        })
    }

    fn timeout_secs(&self) -> u64 {
        self.timeout.as_secs()
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "application/json,text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(REFERER, HeaderValue::from_static("https://www.nseindia.com/option-chain"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers
}

impl OptionChainSource for NseOptionChain {
    fn name(&self) -> &str {
        "nse_option_chain"
    }

    fn fetch_chain(&self, symbol: IndexSymbol) -> Result<OptionChainSnapshot, FetchError> {
        // Cookie warm-up; its status is irrelevant, only the cookies matter.
        if let Err(e) = self.client.get(HOME_URL).send() {
            return Err(FetchError::from_transport(e, self.timeout_secs()));
        }

        let resp = self
            .client
            .get(Self::chain_url(symbol))
            .send()
            .map_err(|e| FetchError::from_transport(e, self.timeout_secs()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(FetchError::RateLimited {
                retry_after_secs: retry_after,
            });
        }
        // NSE answers a missing or expired cookie session with 401/403; the
        // next attempt warms the session again.
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(FetchError::SessionRejected {
                provider: "nse_option_chain",
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                provider: "nse_option_chain",
                status: status.as_u16(),
            });
        }

        let body: ChainResponse = resp.json().map_err(|e| {
            FetchError::ResponseFormatChanged(format!("failed to parse option chain for {symbol}: {e}"))
        })?;

        let snapshot = Self::parse_response(symbol, body)?;
        debug!(%symbol, spot = snapshot.spot, strikes = snapshot.rows.len(), "option chain fetched");
        Ok(snapshot)
    }
}
