//! Data acquisition: source traits, retry decorator, HTTP providers

pub mod nse;
pub mod provider;
pub mod retry;
pub mod yahoo;

pub use nse::NseOptionChain;
pub use provider::{FetchError, Lookback, OptionChainSource, PriceSeriesSource};
pub use retry::{RetryPolicy, Retrying};
pub use yahoo::YahooPrices;
