//! ivwatch core — IV percentile and price-move alerting for NIFTY and BANKNIFTY.
//!
//! This crate contains the alerting engine and its collaborators:
//! - Domain types (indices, option-chain snapshots, daily bars)
//! - Source traits with a bounded-retry decorator and NSE / Yahoo providers
//! - Signals: ATM-IV extraction, rolling IV history, percentile rank, price move
//! - Alert policy, text rendering, and the per-cycle engine
//! - Notifiers (Telegram, console) and TOML configuration

pub mod alert;
pub mod config;
pub mod data;
pub mod domain;
pub mod notify;
pub mod signals;
