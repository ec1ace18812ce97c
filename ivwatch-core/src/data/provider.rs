//! Source traits and structured fetch errors.
//!
//! The option-chain and price-series sources abstract over the HTTP
//! providers (NSE, Yahoo Finance) so the engine can be driven by in-memory
//! fakes in tests. Retry lives in [`super::retry::Retrying`], not here.

use crate::domain::{IndexSymbol, OptionChainSnapshot, PriceBar};
use thiserror::Error;

/// Structured error types for fetch operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("HTTP {status} from {provider}")]
    HttpStatus { provider: &'static str, status: u16 },

    #[error("session rejected by {provider} (HTTP {status}); cookies missing or stale")]
    SessionRejected { provider: &'static str, status: u16 },

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },
}

impl FetchError {
    /// Whether another attempt might succeed.
    ///
    /// Server errors, throttling, rejected sessions and transport failures
    /// are transient; any other 4xx, a missing symbol or an unparseable body
    /// is not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::NetworkUnreachable(_)
            | Self::Timeout { .. }
            | Self::RateLimited { .. }
            | Self::SessionRejected { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 500,
            Self::ResponseFormatChanged(_) | Self::SymbolNotFound { .. } => false,
        }
    }

    /// Map a reqwest transport error, preserving timeouts.
    pub(crate) fn from_transport(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout { timeout_secs }
        } else if err.is_decode() {
            Self::ResponseFormatChanged(err.to_string())
        } else {
            Self::NetworkUnreachable(err.to_string())
        }
    }
}

/// How far back to request daily bars.
///
/// The move signal needs only the last two sessions, but weekends and
/// exchange holidays mean a calendar window wider than two days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookback {
    pub days: u32,
}

impl Default for Lookback {
    fn default() -> Self {
        Self { days: 7 }
    }
}

/// Source of option-chain snapshots.
pub trait OptionChainSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch the current chain for an index.
    fn fetch_chain(&self, symbol: IndexSymbol) -> Result<OptionChainSnapshot, FetchError>;
}

/// Source of daily price bars.
pub trait PriceSeriesSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch daily bars, oldest first.
    fn fetch_bars(&self, symbol: IndexSymbol, lookback: Lookback) -> Result<Vec<PriceBar>, FetchError>;
}
