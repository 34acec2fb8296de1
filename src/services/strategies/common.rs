// src/services/strategies/common.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One futures kline as returned by `/fapi/v1/klines`, oldest → newest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Base-asset volume bought by takers
    pub taker_buy_base: f64,
}

/// Direction of aggressive flow we scan for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A confluence-confirmed alert candidate. Lives for one scan only.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub side: Side,
    pub symbol: String,
    pub timeframe: &'static str,
    /// last qualifying spike ÷ baseline
    pub strength: f64,
    pub price: f64,
    /// fractional close-to-close move across the spike window
    pub price_change: f64,
    pub spike_value: f64,
    pub baseline: f64,
    pub spike_time: DateTime<Utc>,
}
