//! PriceBar — one trading day of the underlying index.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily bar for an index. Only open and close feed the move signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, open: f64, close: f64) -> Self {
        Self { date, open, close }
    }

    /// Returns true if open or close is missing (NaN).
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.close.is_nan()
    }
}
