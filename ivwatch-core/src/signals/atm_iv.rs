//! ATM-IV extractor — reduces an option chain to one implied volatility.
//!
//! The at-the-money IV is the straddle mean (call IV + put IV) / 2 at the
//! strike closest to spot. Only strikes quoting both legs are candidates.

use crate::domain::{IndexSymbol, OptionChainSnapshot};

/// One ATM implied-volatility reading for an index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtmIv {
    pub symbol: IndexSymbol,
    pub strike: f64,
    pub value: f64,
}

/// Extract the ATM IV from a snapshot.
///
/// Returns `None` when no row quotes both legs. On an exact distance tie the
/// earliest row in snapshot order wins.
pub fn extract_atm_iv(symbol: IndexSymbol, snapshot: &OptionChainSnapshot) -> Option<AtmIv> {
    let mut best: Option<(f64, f64, f64)> = None; // (distance, strike, iv)

    for row in &snapshot.rows {
        let Some(iv) = row.straddle_iv() else {
            continue;
        };
        let distance = (row.strike - snapshot.spot).abs();
        // Strict `<` keeps the first row on ties.
        if best.map_or(true, |(d, _, _)| distance < d) {
            best = Some((distance, row.strike, iv));
        }
    }

    best.map(|(_, strike, value)| AtmIv { symbol, strike, value })
}
