//! Option-chain snapshot as handed to the ATM-IV extractor.

use serde::{Deserialize, Serialize};

/// One strike of an option chain.
///
/// Either side may be missing when the exchange lists only calls or only
/// puts at a strike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainRow {
    pub strike: f64,
    pub call_iv: Option<f64>,
    pub put_iv: Option<f64>,
}

impl ChainRow {
    pub fn new(strike: f64, call_iv: Option<f64>, put_iv: Option<f64>) -> Self {
        Self { strike, call_iv, put_iv }
    }

    /// Mean of call and put IV, if both sides are quoted.
    pub fn straddle_iv(&self) -> Option<f64> {
        match (self.call_iv, self.put_iv) {
            (Some(call), Some(put)) => Some((call + put) / 2.0),
            _ => None,
        }
    }
}

/// Snapshot of a full chain plus the underlying spot price.
///
/// Row order is the provider's order and is significant for ATM tie-breaks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionChainSnapshot {
    pub spot: f64,
    pub rows: Vec<ChainRow>,
}
