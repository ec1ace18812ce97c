//! Alert engine — one analysis cycle over the monitored indices.
//!
//! Per index, in report order:
//! 1. Fetch daily bars and evaluate the move. Failure skips the index.
//! 2. Fetch the option chain and extract ATM IV. Failure leaves the IV
//!    signal missing but keeps the index in the report.
//! 3. Append the ATM IV to the history and rank it.
//! 4. Apply the alert policy.
//!
//! Nothing here aborts the cycle: every failure is local to its index.

use super::policy::AlertRecord;
use super::render::{render_blocks, status_line};
use crate::data::{FetchError, Lookback, OptionChainSource, PriceSeriesSource};
use crate::domain::IndexSymbol;
use crate::signals::{evaluate_move, extract_atm_iv, percentile_rank, round2, IvHistory, MoveError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why an index contributed nothing to a cycle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
    #[error("price series unavailable: {0}")]
    PriceFetch(FetchError),

    #[error("{0}")]
    InsufficientData(MoveError),
}

/// Why an index has no IV percentile this cycle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MissingIv {
    #[error("option chain unavailable: {0}")]
    ChainFetch(FetchError),

    #[error("option chain has no strike quoting both call and put IV")]
    NoQuotedStrike,
}

/// Result of one cycle.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    /// Message blocks in report order, ready for [`super::compose_message`].
    pub blocks: Vec<String>,
    /// Records for every index that was evaluated.
    pub records: Vec<AlertRecord>,
    /// Indices that were skipped, with the reason.
    pub skipped: Vec<(IndexSymbol, SkipReason)>,
    /// Indices evaluated without an IV signal, with the reason.
    pub missing_iv: Vec<(IndexSymbol, MissingIv)>,
    /// History after this cycle's appends.
    pub history: IvHistory,
}

/// Drives one analysis cycle against its data sources.
pub struct AlertEngine<'a> {
    chains: &'a dyn OptionChainSource,
    prices: &'a dyn PriceSeriesSource,
    lookback: Lookback,
    symbols: Vec<IndexSymbol>,
}

impl<'a> AlertEngine<'a> {
    pub fn new(chains: &'a dyn OptionChainSource, prices: &'a dyn PriceSeriesSource) -> Self {
        Self {
            chains,
            prices,
            lookback: Lookback::default(),
            symbols: IndexSymbol::ALL.to_vec(),
        }
    }

    pub fn with_lookback(mut self, lookback: Lookback) -> Self {
        self.lookback = lookback;
        self
    }

    /// Run one cycle, consuming the history and returning its successor.
    pub fn run_cycle(&self, mut history: IvHistory) -> CycleOutcome {
        info!(chains = self.chains.name(), prices = self.prices.name(), "analysis cycle started");

        let mut records = Vec::with_capacity(self.symbols.len());
        let mut skipped = Vec::new();
        let mut missing_iv = Vec::new();

        for &symbol in &self.symbols {
            let price_move = match self.fetch_move(symbol) {
                Ok(mv) => mv,
                Err(reason) => {
                    warn!(%symbol, %reason, "skipping index this cycle");
                    skipped.push((symbol, reason));
                    continue;
                }
            };

            let iv_percentile = match self.next_iv_percentile(symbol, &mut history) {
                Ok(p) => Some(p),
                Err(reason) => {
                    warn!(%symbol, %reason, "IV percentile not available");
                    missing_iv.push((symbol, reason));
                    None
                }
            };

            let record = AlertRecord::evaluate(symbol, price_move.percent_move, price_move.close, iv_percentile);
            info!("{}", status_line(&record));
            records.push(record);
        }

        let blocks = render_blocks(&records);
        info!(
            evaluated = records.len(),
            skipped = skipped.len(),
            alerts = records.iter().filter(|r| r.should_alert()).count(),
            "analysis cycle complete"
        );

        CycleOutcome {
            blocks,
            records,
            skipped,
            missing_iv,
            history,
        }
    }

    fn fetch_move(&self, symbol: IndexSymbol) -> Result<crate::signals::PriceMove, SkipReason> {
        let bars = self
            .prices
            .fetch_bars(symbol, self.lookback)
            .map_err(SkipReason::PriceFetch)?;
        evaluate_move(&bars).map_err(SkipReason::InsufficientData)
    }

    /// Fetch, extract, append and rank. History is untouched on failure.
    fn next_iv_percentile(&self, symbol: IndexSymbol, history: &mut IvHistory) -> Result<f64, MissingIv> {
        let snapshot = self.chains.fetch_chain(symbol).map_err(MissingIv::ChainFetch)?;
        let atm = extract_atm_iv(symbol, &snapshot).ok_or(MissingIv::NoQuotedStrike)?;

        let window = history.append(symbol, atm.value);
        // The window holds at least the value just appended.
        let percentile = percentile_rank(window, atm.value).unwrap_or(0.0);
        debug!(%symbol, strike = atm.strike, atm_iv = atm.value, window = window.len(), percentile, "ATM IV ranked");
        Ok(round2(percentile))
    }
}
