//! Optional liquidation / funding context attached to an alert.

use chrono::{Duration, Utc};

use crate::services::market_data::{KlineSource, LiquidationOrder};
use crate::services::strategies::Side;

/// How far back liquidations are summed.
const LIQUIDATION_WINDOW_MINS: i64 = 60;
const LIQUIDATION_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LiquidationSummary {
    pub long_count: usize,
    pub short_count: usize,
    /// price × qty, quote currency
    pub long_notional: f64,
    pub short_notional: f64,
}

impl LiquidationSummary {
    pub fn from_orders(orders: &[LiquidationOrder]) -> Self {
        orders.iter().fold(Self::default(), |mut acc, o| {
            let notional = o.price * o.qty;
            match o.side {
                // forced sell = long wiped out
                Side::Sell => {
                    acc.long_count += 1;
                    acc.long_notional += notional;
                }
                Side::Buy => {
                    acc.short_count += 1;
                    acc.short_notional += notional;
                }
            }
            acc
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MarketContext {
    pub liquidations: Option<LiquidationSummary>,
    pub funding_rate: Option<f64>,
}

impl MarketContext {
    pub fn is_empty(&self) -> bool {
        self.liquidations.is_none() && self.funding_rate.is_none()
    }
}

/// Both lookups are best-effort; a failure just leaves that half empty.
pub async fn gather<S>(source: &S, symbol: &str) -> MarketContext
where
    S: KlineSource + ?Sized,
{
    let end = Utc::now();
    let start = end - Duration::minutes(LIQUIDATION_WINDOW_MINS);

    let liquidations = match source.liquidations(symbol, start, end, LIQUIDATION_LIMIT).await {
        Ok(orders) => Some(LiquidationSummary::from_orders(&orders)),
        Err(e) => {
            log::warn!("{symbol}: liquidation fetch failed: {e}");
            None
        }
    };

    let funding_rate = match source.funding_rate(symbol).await {
        Ok(r) => Some(r),
        Err(e) => {
            log::warn!("{symbol}: funding fetch failed: {e}");
            None
        }
    };

    MarketContext { liquidations, funding_rate }
}
