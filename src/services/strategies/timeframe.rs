//! Primary / confirmation timeframe resolution.

use crate::config::presets::{PrimarySelection, ScanConfig};
use crate::services::indicators::{enrich, TrendSnapshot};
use crate::services::market_data::KlineSource;
use crate::services::strategies::Candle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeframes {
    pub primary: &'static str,
    pub confirmations: Vec<&'static str>,
}

/// `Some(true)` when the EMA spread on `candles` reaches the strength
/// threshold, `None` when there is too little history to say.
pub fn is_strong_trend(candles: &[Candle], min_history: usize, cfg: &ScanConfig) -> Option<bool> {
    if candles.len() < min_history {
        return None;
    }
    let snap = TrendSnapshot::latest(&enrich(candles, cfg))?;
    Some(snap.ema_spread() >= cfg.trend_strength)
}

pub async fn choose_timeframes<S>(source: &S, symbol: &str, cfg: &ScanConfig) -> Timeframes
where
    S: KlineSource + ?Sized,
{
    match &cfg.primary {
        PrimarySelection::Fixed { primary } => Timeframes {
            primary: *primary,
            confirmations: without(cfg.confirmations, primary),
        },
        PrimarySelection::Auto { slow, fast, fallback, lookback, min_history } => {
            let primary = match source.klines(symbol, slow, *lookback).await {
                Ok(candles) => match is_strong_trend(&candles, *min_history, cfg) {
                    // strong trend: faster TF catches intraday entries
                    Some(true) => *fast,
                    Some(false) => *slow,
                    None => {
                        log::debug!("{symbol}: {slow} history too short ({}), using {fallback}", candles.len());
                        *fallback
                    }
                },
                Err(e) => {
                    log::warn!("{symbol}: {slow} trend fetch failed ({e}), using {fallback}");
                    *fallback
                }
            };

            let opposite = if primary == *slow { *fast } else { *slow };
            let mut confirmations = vec![opposite];
            for tf in without(cfg.confirmations, primary) {
                if !confirmations.contains(&tf) {
                    confirmations.push(tf);
                }
            }
            Timeframes { primary, confirmations }
        }
    }
}

fn without(list: &[&'static str], skip: &str) -> Vec<&'static str> {
    list.iter().copied().filter(|tf| *tf != skip).collect()
}
