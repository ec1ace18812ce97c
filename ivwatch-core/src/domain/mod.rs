//! Domain types for ivwatch

pub mod bar;
pub mod index;
pub mod option_chain;

pub use bar::PriceBar;
pub use index::IndexSymbol;
pub use option_chain::{ChainRow, OptionChainSnapshot};
