//! Taker-volume spike detection on a single timeframe.
//!
//! The newest `window` candles are compared against the mean of everything
//! before them. A candle in the window is a spike when its side volume is at
//! least `baseline × mult` **and** at least the absolute floor.

use chrono::{DateTime, Utc};
use statrs::statistics::Statistics;

use crate::config::presets::ScanConfig;
use crate::services::indicators::side_volume;
use crate::services::strategies::{Candle, Side};

/// Extra history required on top of the window before we trust a baseline.
pub const MIN_EXTRA_HISTORY: usize = 5;

/// Fallback baseline = `max(FALLBACK_FLOOR, FALLBACK_FRACTION × full mean)`.
const FALLBACK_FRACTION: f64 = 0.25;
const FALLBACK_FLOOR: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpikeParams {
    pub window: usize,
    pub mult: f64,
    pub floor: f64,
}

impl From<&ScanConfig> for SpikeParams {
    fn from(cfg: &ScanConfig) -> Self {
        Self {
            window: cfg.spike_window,
            mult: cfg.volume_mult,
            floor: cfg.min_base_volume,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spike {
    pub idx: usize,
    pub value: f64,
    pub ts: DateTime<Utc>,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpikeReport {
    /// always > 0
    pub baseline: f64,
    /// oldest → newest, never empty
    pub spikes: Vec<Spike>,
    pub price_change: f64,
    pub price_now: f64,
}

impl SpikeReport {
    pub fn last(&self) -> &Spike {
        // constructor guarantees at least one entry
        &self.spikes[self.spikes.len() - 1]
    }

    pub fn strength(&self) -> f64 {
        self.last().value / self.baseline
    }
}

/// `None` means "nothing to report": either too little history or no candle
/// in the window cleared the threshold.
pub fn detect_spike(candles: &[Candle], side: Side, p: SpikeParams) -> Option<SpikeReport> {
    let w = p.window;
    if w == 0 || candles.len() < w + MIN_EXTRA_HISTORY {
        return None;
    }

    let metric: Vec<f64> = candles.iter().map(|c| side_volume(c, side)).collect();
    let split = metric.len() - w;

    let mut baseline = metric[..split].iter().mean();
    if !(baseline > 0.0) {
        baseline = (metric.iter().mean() * FALLBACK_FRACTION).max(FALLBACK_FLOOR);
    }

    let spikes: Vec<Spike> = (split..metric.len())
        .filter(|&i| metric[i] >= baseline * p.mult && metric[i] >= p.floor)
        .map(|i| Spike {
            idx: i,
            value: metric[i],
            ts: candles[i].open_time,
            close: candles[i].close,
        })
        .collect();

    if spikes.is_empty() {
        return None;
    }

    let price_start = candles[split - 1].close;
    let price_now = candles[candles.len() - 1].close;
    let price_change = if price_start > 0.0 {
        (price_now - price_start) / price_start
    } else {
        0.0
    };

    Some(SpikeReport {
        baseline,
        spikes,
        price_change,
        price_now,
    })
}
