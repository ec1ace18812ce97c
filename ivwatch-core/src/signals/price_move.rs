//! Price-move evaluator — last session's open-to-close percent change.

use crate::domain::PriceBar;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MoveError {
    #[error("insufficient data: need at least 2 bars, got {got}")]
    InsufficientBars { got: usize },

    #[error("latest bar has a non-positive or missing open ({open})")]
    InvalidOpen { open: f64 },
}

/// Intraday move of the most recent bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceMove {
    pub percent_move: f64,
    pub close: f64,
}

/// Evaluate `(close - open) / open * 100` on the last bar.
///
/// At least two bars are required; the earlier ones only prove history
/// exists and are not otherwise read.
pub fn evaluate_move(bars: &[PriceBar]) -> Result<PriceMove, MoveError> {
    if bars.len() < 2 {
        return Err(MoveError::InsufficientBars { got: bars.len() });
    }
    let last = &bars[bars.len() - 1];
    if last.open.is_nan() || last.open <= 0.0 {
        return Err(MoveError::InvalidOpen { open: last.open });
    }

    Ok(PriceMove {
        percent_move: (last.close - last.open) / last.open * 100.0,
        close: last.close,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(day: u32, open: f64, close: f64) -> PriceBar {
        PriceBar::new(NaiveDate::from_ymd_opt(2026, 10, day).unwrap(), open, close)
    }

    #[test]
    fn uses_last_bar_only() {
        let bars = [bar(14, 1.0, 1000.0), bar(15, 20000.0, 20240.0)];
        let mv = evaluate_move(&bars).unwrap();
        assert!((mv.percent_move - 1.2).abs() < 1e-9);
        assert_eq!(mv.close, 20240.0);
    }

    #[test]
    fn negative_move() {
        let bars = [bar(14, 100.0, 100.0), bar(15, 200.0, 197.0)];
        assert!((evaluate_move(&bars).unwrap().percent_move + 1.5).abs() < 1e-9);
    }

    #[test]
    fn fewer_than_two_bars_is_insufficient() {
        assert_eq!(evaluate_move(&[]), Err(MoveError::InsufficientBars { got: 0 }));
        assert_eq!(
            evaluate_move(&[bar(15, 100.0, 101.0)]),
            Err(MoveError::InsufficientBars { got: 1 })
        );
    }

    #[test]
    fn zero_or_nan_open_is_rejected() {
        assert!(matches!(
            evaluate_move(&[bar(14, 1.0, 1.0), bar(15, 0.0, 1.0)]),
            Err(MoveError::InvalidOpen { .. })
        ));
        assert!(matches!(
            evaluate_move(&[bar(14, 1.0, 1.0), bar(15, f64::NAN, 1.0)]),
            Err(MoveError::InvalidOpen { .. })
        ));
    }
}
