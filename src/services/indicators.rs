//! Derived columns over a fetched candle sequence.
//!
//! Everything here is pure: the input slice is never touched and each call
//! hands back fresh vectors / rows, so nothing leaks between symbols.

use crate::config::presets::ScanConfig;
use crate::services::strategies::{Candle, Side};

/// Recursive EMA, `alpha = 2 / (span + 1)`, seeded with the first value.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    values
        .iter()
        .scan(None::<f64>, |prev, &v| {
            let next = match *prev {
                None => v,
                Some(p) => alpha * v + (1.0 - alpha) * p,
            };
            *prev = Some(next);
            Some(next)
        })
        .collect()
}

/// Simple RSI: rolling mean of gains / losses over `period` diffs
/// (min-periods = 1). The first value has no diff and is `NaN`.
pub fn simple_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    const LOSS_EPS: f64 = 1e-9;

    if closes.is_empty() {
        return vec![];
    }
    let period = period.max(1);

    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let d = w[1] - w[0];
            (d.max(0.0), (-d).max(0.0))
        })
        .unzip();

    let mut out = Vec::with_capacity(closes.len());
    out.push(f64::NAN);

    for i in 0..gains.len() {
        let start = (i + 1).saturating_sub(period);
        let n = (i + 1 - start) as f64;
        let up = gains[start..=i].iter().sum::<f64>() / n;
        let mut down = losses[start..=i].iter().sum::<f64>() / n;
        if down == 0.0 {
            down = LOSS_EPS;
        }
        out.push(100.0 - 100.0 / (1.0 + up / down));
    }
    out
}

/// `volume − taker_buy_base`, floored at zero (exchange rounding can push it
/// slightly negative).
#[inline]
pub fn taker_sell_volume(c: &Candle) -> f64 {
    (c.volume - c.taker_buy_base).max(0.0)
}

#[inline]
pub fn taker_buy_volume(c: &Candle) -> f64 {
    c.taker_buy_base.max(0.0)
}

#[inline]
pub fn side_volume(c: &Candle, side: Side) -> f64 {
    match side {
        Side::Buy => taker_buy_volume(c),
        Side::Sell => taker_sell_volume(c),
    }
}

/// Candle plus every derived column the scanner reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorRow {
    pub candle: Candle,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub rsi: f64,
    pub buy_vol: f64,
    pub sell_vol: f64,
}

pub fn enrich(candles: &[Candle], cfg: &ScanConfig) -> Vec<IndicatorRow> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let fast = ema(&closes, cfg.ema_fast);
    let slow = ema(&closes, cfg.ema_slow);
    let rsi = simple_rsi(&closes, cfg.rsi_period);

    candles
        .iter()
        .enumerate()
        .map(|(i, c)| IndicatorRow {
            candle: *c,
            ema_fast: fast[i],
            ema_slow: slow[i],
            rsi: rsi[i],
            buy_vol: taker_buy_volume(c),
            sell_vol: taker_sell_volume(c),
        })
        .collect()
}

/// The trend-filter inputs taken from the newest row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendSnapshot {
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub rsi: f64,
    pub close: f64,
}

impl TrendSnapshot {
    pub fn latest(rows: &[IndicatorRow]) -> Option<Self> {
        let last = rows.last()?;
        Some(Self {
            ema_fast: last.ema_fast,
            ema_slow: last.ema_slow,
            rsi: last.rsi,
            close: last.candle.close,
        })
    }

    /// |fast − slow| as a fraction of the close.
    pub fn ema_spread(&self) -> f64 {
        if self.close == 0.0 {
            return 0.0;
        }
        (self.ema_fast - self.ema_slow).abs() / self.close
    }
}
