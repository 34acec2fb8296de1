//! Binance USDⓈ-M futures REST adapter.
//! -----------------------------------------------------------------
//! ‣ One GET per (symbol, interval); no retries, fixed timeout.
//! ‣ Every call returns `Result<_, FetchError>` so "no data" is never
//!   confused with a legitimately empty answer.
//! ‣ `KlineSource` is the seam the scanner depends on; tests plug in an
//!   in-memory implementation.
//! -----------------------------------------------------------------

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::config::presets::ScanConfig;
use crate::services::strategies::{Candle, Side};
use crate::utils::errors::FetchError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiquidationOrder {
    /// Side of the forced order: `Sell` closes a long, `Buy` closes a short.
    pub side: Side,
    pub price: f64,
    pub qty: f64,
    pub time: DateTime<Utc>,
}

#[async_trait]
pub trait KlineSource: Send + Sync {
    async fn klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<Candle>, FetchError>;

    async fn liquidations(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<LiquidationOrder>, FetchError>;

    /// Most recent settled funding rate.
    async fn funding_rate(&self, symbol: &str) -> Result<f64, FetchError>;
}

pub struct BinanceFutures {
    http: Client,
    base_url: String,
}

impl BinanceFutures {
    pub fn new(cfg: &ScanConfig) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(cfg.request_timeout).build()?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_text(&self, path: &str, query: &[(&str, String)]) -> Result<String, FetchError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if status != StatusCode::OK {
            return Err(FetchError::Status(status, body));
        }
        Ok(body)
    }
}

#[async_trait]
impl KlineSource for BinanceFutures {
    async fn klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<Candle>, FetchError> {
        let body = self
            .get_text(
                "/fapi/v1/klines",
                &[
                    ("symbol", symbol.to_string()),
                    ("interval", interval.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        parse_klines(&body)
    }

    async fn liquidations(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<LiquidationOrder>, FetchError> {
        let body = self
            .get_text(
                "/fapi/v1/allForceOrders",
                &[
                    ("symbol", symbol.to_string()),
                    ("startTime", start.timestamp_millis().to_string()),
                    ("endTime", end.timestamp_millis().to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        parse_liquidations(&body)
    }

    async fn funding_rate(&self, symbol: &str) -> Result<f64, FetchError> {
        let body = self
            .get_text(
                "/fapi/v1/fundingRate",
                &[("symbol", symbol.to_string()), ("limit", "1".to_string())],
            )
            .await?;
        parse_funding_rate(&body)
    }
}

/* ─────────────────────────────────────────  wire shapes ────── */

/// `[openTime, o, h, l, c, v, closeTime, quoteVol, trades, takerBuyBase,
///   takerBuyQuote, ignore]`
#[derive(Debug, Deserialize)]
struct RawKline(
    i64,
    String,
    String,
    String,
    String,
    String,
    i64,
    String,
    u64,
    String,
    String,
    serde_json::Value,
);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawForceOrder {
    side: String,
    price: String,
    orig_qty: String,
    time: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFunding {
    funding_rate: String,
}

fn num(field: &str, s: &str) -> Result<f64, FetchError> {
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FetchError::Malformed(format!("{field}={s:?}")))
}

fn ts_ms(ms: i64) -> Result<DateTime<Utc>, FetchError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| FetchError::Malformed(format!("timestamp {ms}")))
}

pub fn parse_klines(body: &str) -> Result<Vec<Candle>, FetchError> {
    let raw: Vec<RawKline> = serde_json::from_str(body)?;
    if raw.is_empty() {
        return Err(FetchError::EmptyPayload);
    }
    raw.into_iter()
        .map(|k| {
            Ok(Candle {
                open_time: ts_ms(k.0)?,
                open: num("open", &k.1)?,
                high: num("high", &k.2)?,
                low: num("low", &k.3)?,
                close: num("close", &k.4)?,
                volume: num("volume", &k.5)?,
                taker_buy_base: num("taker_buy_base", &k.9)?,
            })
        })
        .collect()
}

/// An empty list is a valid answer here (quiet hour), unlike klines.
pub fn parse_liquidations(body: &str) -> Result<Vec<LiquidationOrder>, FetchError> {
    let raw: Vec<RawForceOrder> = serde_json::from_str(body)?;
    raw.into_iter()
        .map(|o| {
            let side = match o.side.as_str() {
                "BUY" => Side::Buy,
                "SELL" => Side::Sell,
                other => return Err(FetchError::Malformed(format!("side={other:?}"))),
            };
            Ok(LiquidationOrder {
                side,
                price: num("price", &o.price)?,
                qty: num("origQty", &o.orig_qty)?,
                time: ts_ms(o.time)?,
            })
        })
        .collect()
}

pub fn parse_funding_rate(body: &str) -> Result<f64, FetchError> {
    let raw: Vec<RawFunding> = serde_json::from_str(body)?;
    let last = raw.last().ok_or(FetchError::EmptyPayload)?;
    num("fundingRate", &last.funding_rate)
}
