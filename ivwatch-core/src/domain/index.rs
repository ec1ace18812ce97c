//! The two monitored indices and their per-provider identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A monitored market index.
///
/// The declaration order is also the report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IndexSymbol {
    #[serde(rename = "NIFTY")]
    Nifty,
    #[serde(rename = "BANKNIFTY")]
    BankNifty,
}

impl IndexSymbol {
    /// Every monitored index, in report order.
    pub const ALL: [IndexSymbol; 2] = [IndexSymbol::Nifty, IndexSymbol::BankNifty];

    /// Display name, also the NSE option-chain `symbol` query parameter.
    pub fn name(self) -> &'static str {
        match self {
            Self::Nifty => "NIFTY",
            Self::BankNifty => "BANKNIFTY",
        }
    }

    /// Yahoo Finance ticker for the spot index.
    pub fn yahoo_ticker(self) -> &'static str {
        match self {
            Self::Nifty => "^NSEI",
            Self::BankNifty => "^NSEBANK",
        }
    }
}

impl fmt::Display for IndexSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for IndexSymbol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NIFTY" => Ok(Self::Nifty),
            "BANKNIFTY" => Ok(Self::BankNifty),
            other => Err(format!("unknown index symbol: {other}")),
        }
    }
}
