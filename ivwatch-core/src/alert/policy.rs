//! Alert policy — fixed thresholds over the move and IV-percentile signals.

use crate::domain::IndexSymbol;

/// Absolute percent move at or above which a move alert fires.
pub const MOVE_ALERT_PCT: f64 = 1.0;
/// IV percentile at or below which the IV is "very low".
pub const IV_LOW_PERCENTILE: f64 = 10.0;
/// IV percentile at or above which the IV is "very high".
pub const IV_HIGH_PERCENTILE: f64 = 90.0;

/// Which side of the IV distribution an alert is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IvExtreme {
    VeryLow,
    VeryHigh,
}

/// Per-index outcome of one cycle. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRecord {
    pub symbol: IndexSymbol,
    pub percent_move: f64,
    pub close_price: f64,
    pub iv_percentile: Option<f64>,
    pub move_alert: bool,
    pub iv_alert: bool,
}

impl AlertRecord {
    /// Apply the policy to raw signals.
    pub fn evaluate(
        symbol: IndexSymbol,
        percent_move: f64,
        close_price: f64,
        iv_percentile: Option<f64>,
    ) -> Self {
        let move_alert = percent_move.abs() >= MOVE_ALERT_PCT;
        let iv_alert = iv_percentile.and_then(classify_iv).is_some();
        Self {
            symbol,
            percent_move,
            close_price,
            iv_percentile,
            move_alert,
            iv_alert,
        }
    }

    pub fn should_alert(&self) -> bool {
        self.move_alert || self.iv_alert
    }

    /// The IV extreme this record sits on, if any.
    pub fn iv_extreme(&self) -> Option<IvExtreme> {
        self.iv_percentile.and_then(classify_iv)
    }
}

fn classify_iv(percentile: f64) -> Option<IvExtreme> {
    if percentile <= IV_LOW_PERCENTILE {
        Some(IvExtreme::VeryLow)
    } else if percentile >= IV_HIGH_PERCENTILE {
        Some(IvExtreme::VeryHigh)
    } else {
        None
    }
}
