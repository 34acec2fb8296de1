//! Compiled-in scanner presets.
//!
//! Every tunable the pipeline reads lives on [`ScanConfig`]; presets only
//! differ in the numbers. Nothing here is read from disk.
//!
//! | preset              | primary        | confirm      | rise / drop bound |
//! |---------------------|----------------|--------------|-------------------|
//! | `auto_tf`           | auto (4h ↔ 1h) | other + 15m  | 8 % / 12 %        |
//! | `early_sell`        | 1h             | 4h, 15m      | 3 % / 3 %         |
//! | `intraday`          | 15m            | 1h           | 2 % / 2 %         |
//! | `swing`             | 4h             | 1d           | 12 % / 12 %       |
//! | `liquidation_watch` | auto (4h ↔ 1h) | other + 15m  | 8 % / 12 %        |

use std::time::Duration;

use crate::services::strategies::Side;
use crate::utils::errors::ConfigError;

pub const BINANCE_FUTURES_URL: &str = "https://fapi.binance.com";

const MAJORS: &[&str] = &[
    "BTCUSDT", "ETHUSDT", "BNBUSDT", "SOLUSDT", "XRPUSDT", "AVAXUSDT", "ARBUSDT", "OPUSDT",
    "DOGEUSDT",
];

#[derive(Debug, Clone, PartialEq)]
pub enum PrimarySelection {
    Fixed {
        primary: &'static str,
    },
    /// Strong trend on `slow` → scan `fast`; otherwise scan `slow`.
    Auto {
        slow: &'static str,
        fast: &'static str,
        fallback: &'static str,
        /// candles fetched on `slow` for the trend check
        lookback: u32,
        min_history: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub name: &'static str,
    pub symbols: &'static [&'static str],
    pub base_url: &'static str,

    // fetch
    pub lookback: u32,
    pub request_timeout: Duration,

    // spike detector
    pub spike_window: usize,
    pub volume_mult: f64,
    pub min_base_volume: f64,

    // "already too late" guards (fractions, strict)
    pub max_rise: f64,
    pub max_drop: f64,

    // trend filter
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub rsi_period: usize,
    pub rsi_upper: f64,
    pub rsi_lower: f64,
    pub trend_strength: f64,

    // timeframes
    pub primary: PrimarySelection,
    pub confirmations: &'static [&'static str],

    pub sides: &'static [Side],
    pub notify_pause: Duration,
    /// attach liquidations + funding to each alert
    pub market_context: bool,
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::Invalid("symbol list is empty".into()));
        }
        if self.sides.is_empty() {
            return Err(ConfigError::Invalid("no sides to scan".into()));
        }
        if self.spike_window == 0 {
            return Err(ConfigError::Invalid("spike window must be ≥ 1".into()));
        }
        if (self.lookback as usize) < self.spike_window + 5 {
            return Err(ConfigError::Invalid(format!(
                "lookback {} too short for spike window {}",
                self.lookback, self.spike_window
            )));
        }
        if !(self.volume_mult > 0.0) {
            return Err(ConfigError::Invalid("volume multiplier must be > 0".into()));
        }
        if self.ema_fast == 0 || self.ema_fast >= self.ema_slow {
            return Err(ConfigError::Invalid(format!(
                "EMA spans must satisfy 0 < fast < slow (got {}/{})",
                self.ema_fast, self.ema_slow
            )));
        }
        if !(self.max_rise > 0.0 && self.max_drop > 0.0) {
            return Err(ConfigError::Invalid("price-change bounds must be > 0".into()));
        }
        if !(self.rsi_lower < self.rsi_upper) {
            return Err(ConfigError::Invalid("rsi_lower must be below rsi_upper".into()));
        }
        Ok(())
    }
}

/// Original multi-timeframe whale scanner.
pub fn auto_tf() -> ScanConfig {
    ScanConfig {
        name: "auto_tf",
        symbols: MAJORS,
        base_url: BINANCE_FUTURES_URL,
        lookback: 120,
        request_timeout: Duration::from_secs(8),
        spike_window: 3,
        volume_mult: 3.0,
        min_base_volume: 10.0,
        max_rise: 0.08,
        max_drop: 0.12,
        ema_fast: 20,
        ema_slow: 50,
        rsi_period: 14,
        rsi_upper: 70.0,
        rsi_lower: 30.0,
        trend_strength: 0.02,
        primary: PrimarySelection::Auto {
            slow: "4h",
            fast: "1h",
            fallback: "1h",
            lookback: 100,
            min_history: 30,
        },
        confirmations: &["15m"],
        sides: &[Side::Buy, Side::Sell],
        notify_pause: Duration::from_millis(600),
        market_context: false,
    }
}

pub fn early_sell() -> ScanConfig {
    ScanConfig {
        name: "early_sell",
        primary: PrimarySelection::Fixed { primary: "1h" },
        confirmations: &["4h", "15m"],
        max_rise: 0.03,
        max_drop: 0.03,
        ..auto_tf()
    }
}

pub fn intraday() -> ScanConfig {
    ScanConfig {
        name: "intraday",
        symbols: &["BTCUSDT", "ETHUSDT", "SOLUSDT", "XRPUSDT", "DOGEUSDT"],
        primary: PrimarySelection::Fixed { primary: "15m" },
        confirmations: &["1h"],
        volume_mult: 2.5,
        max_rise: 0.02,
        max_drop: 0.02,
        ..auto_tf()
    }
}

pub fn swing() -> ScanConfig {
    ScanConfig {
        name: "swing",
        primary: PrimarySelection::Fixed { primary: "4h" },
        confirmations: &["1d"],
        max_rise: 0.12,
        max_drop: 0.12,
        ..auto_tf()
    }
}

pub fn liquidation_watch() -> ScanConfig {
    ScanConfig {
        name: "liquidation_watch",
        market_context: true,
        ..auto_tf()
    }
}

pub const PRESET_NAMES: &[&str] = &["auto_tf", "early_sell", "intraday", "swing", "liquidation_watch"];

pub fn by_name(name: &str) -> Result<ScanConfig, ConfigError> {
    let cfg = match name.trim().to_lowercase().as_str() {
        "auto_tf" => auto_tf(),
        "early_sell" => early_sell(),
        "intraday" => intraday(),
        "swing" => swing(),
        "liquidation_watch" => liquidation_watch(),
        other => return Err(ConfigError::UnknownPreset(other.to_string())),
    };
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_named_preset_is_valid() {
        for name in PRESET_NAMES {
            let cfg = by_name(name).unwrap();
            assert_eq!(&cfg.name, name);
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(by_name(" Swing ").unwrap().name, "swing");
    }

    #[test]
    fn unknown_preset_rejected() {
        match by_name("moon") {
            Err(ConfigError::UnknownPreset(n)) => assert_eq!(n, "moon"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn auto_tf_matches_original_thresholds() {
        let c = auto_tf();
        assert_eq!(c.symbols.len(), 9);
        assert_eq!(c.spike_window, 3);
        assert_eq!(c.volume_mult, 3.0);
        assert_eq!(c.min_base_volume, 10.0);
        assert_eq!((c.max_rise, c.max_drop), (0.08, 0.12));
        assert_eq!((c.ema_fast, c.ema_slow), (20, 50));
    }

    #[test]
    fn validate_catches_bad_spans() {
        let c = ScanConfig { ema_fast: 50, ema_slow: 20, ..auto_tf() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn validate_catches_zero_window() {
        let c = ScanConfig { spike_window: 0, ..auto_tf() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn validate_catches_short_lookback() {
        let c = ScanConfig { lookback: 6, spike_window: 3, ..auto_tf() };
        assert!(c.validate().is_err());
    }
}
