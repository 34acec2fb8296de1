//! Multi-timeframe confluence gate.
//!
//! An alert for a side needs, all at once:
//! 1. a spike on the primary timeframe,
//! 2. a spike on at least one confirmation timeframe,
//! 3. the trend filter (EMA order + RSI not already stretched),
//! 4. the late-move guard on the primary window's price change.
//!
//! There is no partial / warning outcome.

use crate::config::presets::ScanConfig;
use crate::services::indicators::TrendSnapshot;
use crate::services::strategies::spike::SpikeReport;
use crate::services::strategies::{Side, Signal};

/// EMA order plus RSI bound for `side`.
pub fn trend_agrees(side: Side, trend: &TrendSnapshot, cfg: &ScanConfig) -> bool {
    match side {
        Side::Buy => trend.ema_fast > trend.ema_slow && trend.rsi < cfg.rsi_upper,
        Side::Sell => trend.ema_fast < trend.ema_slow && trend.rsi > cfg.rsi_lower,
    }
}

/// Strict: a move sitting exactly on the bound already counts as too late.
pub fn still_early(side: Side, price_change: f64, cfg: &ScanConfig) -> bool {
    match side {
        Side::Buy => price_change < cfg.max_rise,
        Side::Sell => price_change > -cfg.max_drop,
    }
}

pub fn evaluate(
    symbol: &str,
    timeframe: &'static str,
    side: Side,
    primary: Option<&SpikeReport>,
    confirmations: &[Option<SpikeReport>],
    trend: &TrendSnapshot,
    cfg: &ScanConfig,
) -> Option<Signal> {
    let p = primary?;

    if !confirmations.iter().any(Option::is_some) {
        return None;
    }
    if !trend_agrees(side, trend, cfg) || !still_early(side, p.price_change, cfg) {
        return None;
    }

    let last = p.last();
    Some(Signal {
        side,
        symbol: symbol.to_string(),
        timeframe,
        strength: p.strength(),
        price: trend.close,
        price_change: p.price_change,
        spike_value: last.value,
        baseline: p.baseline,
        spike_time: last.ts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::presets;
    use crate::services::strategies::spike::Spike;
    use chrono::{TimeZone, Utc};

    fn report(value: f64, baseline: f64, price_change: f64) -> SpikeReport {
        SpikeReport {
            baseline,
            spikes: vec![Spike {
                idx: 5,
                value,
                ts: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
                close: 99.0,
            }],
            price_change,
            price_now: 99.0,
        }
    }

    fn bearish() -> TrendSnapshot {
        TrendSnapshot { ema_fast: 98.0, ema_slow: 100.0, rsi: 45.0, close: 99.0 }
    }

    fn bullish() -> TrendSnapshot {
        TrendSnapshot { ema_fast: 101.0, ema_slow: 100.0, rsi: 55.0, close: 102.0 }
    }

    #[test]
    fn sell_alert_with_confirmation() {
        let cfg = presets::auto_tf();
        let p = report(40.0, 5.0, -0.01);
        let s = evaluate("BTCUSDT", "1h", Side::Sell, Some(&p), &[Some(p.clone())], &bearish(), &cfg)
            .expect("all four conditions hold");
        assert_eq!(s.side, Side::Sell);
        assert_eq!(s.strength, 8.0);
        assert_eq!(s.price, 99.0);
        assert_eq!(s.timeframe, "1h");
    }

    #[test]
    fn confirmation_toggle_alone_flips_outcome() {
        let cfg = presets::auto_tf();
        let p = report(40.0, 5.0, -0.01);
        let trend = bearish();

        let without = evaluate("X", "1h", Side::Sell, Some(&p), &[None, None], &trend, &cfg);
        let with = evaluate("X", "1h", Side::Sell, Some(&p), &[None, Some(p.clone())], &trend, &cfg);
        assert!(without.is_none());
        assert!(with.is_some());
    }

    #[test]
    fn no_confirmation_timeframes_means_no_alert() {
        let cfg = presets::auto_tf();
        let p = report(40.0, 5.0, 0.0);
        assert!(evaluate("X", "1h", Side::Sell, Some(&p), &[], &bearish(), &cfg).is_none());
    }

    #[test]
    fn missing_primary_suppresses() {
        let cfg = presets::auto_tf();
        let c = report(40.0, 5.0, 0.0);
        assert!(evaluate("X", "1h", Side::Sell, None, &[Some(c)], &bearish(), &cfg).is_none());
    }

    #[test]
    fn trend_must_agree() {
        let cfg = presets::auto_tf();
        let p = report(40.0, 5.0, 0.0);
        let confirm = [Some(p.clone())];
        assert!(evaluate("X", "1h", Side::Sell, Some(&p), &confirm, &bullish(), &cfg).is_none());
        assert!(evaluate("X", "1h", Side::Buy, Some(&p), &confirm, &bearish(), &cfg).is_none());
        assert!(evaluate("X", "1h", Side::Buy, Some(&p), &confirm, &bullish(), &cfg).is_some());
    }

    #[test]
    fn stretched_rsi_blocks() {
        let cfg = presets::auto_tf();
        let hot = TrendSnapshot { rsi: 70.0, ..bullish() };
        let cold = TrendSnapshot { rsi: 30.0, ..bearish() };
        assert!(!trend_agrees(Side::Buy, &hot, &cfg));
        assert!(!trend_agrees(Side::Sell, &cold, &cfg));
        assert!(trend_agrees(Side::Buy, &TrendSnapshot { rsi: 69.9, ..hot }, &cfg));
    }

    #[test]
    fn undefined_rsi_blocks() {
        let cfg = presets::auto_tf();
        let t = TrendSnapshot { rsi: f64::NAN, ..bearish() };
        assert!(!trend_agrees(Side::Sell, &t, &cfg));
    }

    #[test]
    fn late_move_guard_is_strict() {
        let cfg = presets::auto_tf();
        assert!(!still_early(Side::Buy, cfg.max_rise, &cfg));
        assert!(still_early(Side::Buy, cfg.max_rise - 1e-9, &cfg));
        assert!(!still_early(Side::Sell, -cfg.max_drop, &cfg));
        assert!(still_early(Side::Sell, -cfg.max_drop + 1e-9, &cfg));
    }

    #[test]
    fn late_move_guard_applies_in_gate() {
        let cfg = presets::early_sell();
        let at_bound = report(40.0, 5.0, -0.03);
        let inside = report(40.0, 5.0, -0.0299);
        let t = bearish();
        assert!(evaluate("X", "1h", Side::Sell, Some(&at_bound), &[Some(at_bound.clone())], &t, &cfg).is_none());
        assert!(evaluate("X", "1h", Side::Sell, Some(&inside), &[Some(inside.clone())], &t, &cfg).is_some());
    }

    #[test]
    fn strength_uses_last_spike() {
        let cfg = presets::auto_tf();
        let mut p = report(40.0, 5.0, 0.0);
        p.spikes.push(Spike { idx: 6, value: 25.0, ..p.spikes[0] });
        let s = evaluate("X", "1h", Side::Sell, Some(&p), &[Some(p.clone())], &bearish(), &cfg).unwrap();
        assert_eq!(s.strength, 5.0);
        assert_eq!(s.spike_value, 25.0);
    }
}
