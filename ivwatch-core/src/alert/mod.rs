//! Alert policy engine: decision, rendering, and the per-cycle driver

pub mod engine;
pub mod policy;
pub mod render;

pub use engine::{AlertEngine, CycleOutcome, MissingIv, SkipReason};
pub use policy::{AlertRecord, IvExtreme, IV_HIGH_PERCENTILE, IV_LOW_PERCENTILE, MOVE_ALERT_PCT};
pub use render::{alert_block, compose_message, render_blocks, summary_line, MESSAGE_HEADER};
