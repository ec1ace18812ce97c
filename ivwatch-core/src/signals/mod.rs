//! Signals: ATM-IV extraction, rolling IV history, percentile rank, price move

pub mod atm_iv;
pub mod history;
pub mod percentile;
pub mod price_move;

pub use atm_iv::{extract_atm_iv, AtmIv};
pub use history::{HistoryError, HistoryFile, IvHistory, WINDOW_CAPACITY};
pub use percentile::{percentile_rank, round2};
pub use price_move::{evaluate_move, MoveError, PriceMove};
