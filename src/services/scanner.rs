//! One fetch → indicators → detector → gate → notify pass over every symbol.
//!
//! Symbols are handled strictly one after another. Any failure inside a
//! symbol is logged at that boundary and the loop moves on.

use anyhow::Context;
use chrono::Utc;

use crate::config::presets::ScanConfig;
use crate::services::indicators::{enrich, TrendSnapshot};
use crate::services::market_context;
use crate::services::market_data::KlineSource;
use crate::services::notifier::{format_alert, Notifier};
use crate::services::strategies::confluence;
use crate::services::strategies::spike::{detect_spike, SpikeParams, MIN_EXTRA_HISTORY};
use crate::services::strategies::timeframe::choose_timeframes;
use crate::services::strategies::{Candle, Signal};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    pub scanned: usize,
    /// no primary data / too little history
    pub skipped: usize,
    pub failed: usize,
    /// formatted messages handed to the notifier
    pub alerts: Vec<String>,
}

#[derive(Debug, PartialEq)]
pub enum Analysis {
    NoData,
    Signals(Vec<Signal>),
}

pub struct Scanner<S, N> {
    source: S,
    notifier: N,
    cfg: ScanConfig,
}

impl<S, N> Scanner<S, N>
where
    S: KlineSource,
    N: Notifier,
{
    pub fn new(source: S, notifier: N, cfg: ScanConfig) -> Self {
        Self { source, notifier, cfg }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn config(&self) -> &ScanConfig {
        &self.cfg
    }

    pub async fn run_once(&self) -> ScanReport {
        let mut report = ScanReport::default();

        for &symbol in self.cfg.symbols {
            report.scanned += 1;

            let signals = match self.analyze_symbol(symbol).await {
                Ok(Analysis::Signals(s)) => s,
                Ok(Analysis::NoData) => {
                    report.skipped += 1;
                    continue;
                }
                Err(e) => {
                    log::error!("Error analyzing {symbol}: {e:#}");
                    report.failed += 1;
                    continue;
                }
            };

            for sig in signals {
                log::info!(
                    "{} {} on {}: strength {:.2}x, Δprice {:.2}%",
                    sig.side,
                    sig.symbol,
                    sig.timeframe,
                    sig.strength,
                    sig.price_change * 100.0
                );

                let ctx = if self.cfg.market_context {
                    Some(market_context::gather(&self.source, symbol).await)
                } else {
                    None
                };

                let msg = format_alert(&sig, ctx.as_ref().filter(|c| !c.is_empty()), Utc::now());
                self.notifier.notify(&msg).await;
                report.alerts.push(msg);

                // external rate limit on the chat API
                tokio::time::sleep(self.cfg.notify_pause).await;
            }
        }

        report
    }

    pub async fn analyze_symbol(&self, symbol: &str) -> anyhow::Result<Analysis> {
        let cfg = &self.cfg;
        let frames = choose_timeframes(&self.source, symbol, cfg).await;

        let primary = match self.source.klines(symbol, frames.primary, cfg.lookback).await {
            Ok(c) => c,
            Err(e) => {
                log::warn!("{symbol} {}: {e}", frames.primary);
                return Ok(Analysis::NoData);
            }
        };

        let params = SpikeParams::from(cfg);
        if primary.len() < params.window + MIN_EXTRA_HISTORY {
            log::debug!("{symbol} {}: only {} candles", frames.primary, primary.len());
            return Ok(Analysis::NoData);
        }

        let mut confirm_data: Vec<Option<Vec<Candle>>> = Vec::with_capacity(frames.confirmations.len());
        for tf in &frames.confirmations {
            match self.source.klines(symbol, tf, cfg.lookback).await {
                Ok(c) => confirm_data.push(Some(c)),
                Err(e) => {
                    log::warn!("{symbol} {tf}: {e}");
                    confirm_data.push(None);
                }
            }
        }

        let rows = enrich(&primary, cfg);
        let trend = TrendSnapshot::latest(&rows)
            .with_context(|| format!("{symbol}: no indicator rows"))?;

        let mut signals = Vec::new();
        for &side in cfg.sides {
            let p = detect_spike(&primary, side, params);
            let confirms: Vec<_> = confirm_data
                .iter()
                .map(|c| c.as_deref().and_then(|c| detect_spike(c, side, params)))
                .collect();

            if let Some(sig) = confluence::evaluate(
                symbol,
                frames.primary,
                side,
                p.as_ref(),
                &confirms,
                &trend,
                cfg,
            ) {
                signals.push(sig);
            }
        }

        Ok(Analysis::Signals(signals))
    }
}
