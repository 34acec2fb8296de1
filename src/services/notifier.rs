//! Alert text + Telegram delivery.
//!
//! Delivery is fire-and-forget: one POST, no retry, failures are logged and
//! swallowed so a dead bot never stops a scan.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::services::market_context::MarketContext;
use crate::services::strategies::{Side, Signal};
use crate::utils::errors::NotifyError;

const TELEGRAM_API: &str = "https://api.telegram.org";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Best effort; never fails from the caller's point of view.
    async fn notify(&self, text: &str);
}

pub struct TelegramNotifier {
    http: Client,
    token: Option<String>,
    chat_id: Option<String>,
}

impl TelegramNotifier {
    pub fn new(token: Option<String>, chat_id: Option<String>) -> Self {
        let http = Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("telegram client builder failed ({e}), using defaults");
                Client::new()
            });
        Self { http, token, chat_id }
    }

    pub fn is_configured(&self) -> bool {
        self.token.is_some() && self.chat_id.is_some()
    }

    pub async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let (Some(token), Some(chat_id)) = (&self.token, &self.chat_id) else {
            return Err(NotifyError::NotConfigured);
        };

        let resp = self
            .http
            .post(format!("{TELEGRAM_API}/bot{token}/sendMessage"))
            .form(&[("chat_id", chat_id.as_str()), ("text", text), ("parse_mode", "HTML")])
            .send()
            .await?;

        if resp.status() != StatusCode::OK {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Status(status, body));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) {
        match self.send(text).await {
            Ok(()) => log::debug!("telegram: delivered {} bytes", text.len()),
            Err(NotifyError::NotConfigured) => {
                println!("Telegram not configured. Message:\n{text}");
            }
            Err(e) => log::error!("telegram: {e}"),
        }
    }
}

/// Human-readable HTML block for one signal.
pub fn format_alert(sig: &Signal, ctx: Option<&MarketContext>, now: DateTime<Utc>) -> String {
    let flow = match sig.side {
        Side::Buy => "buy",
        Side::Sell => "sell",
    };
    let mut msg = format!(
        "🐋 <b>Early {side} Alert</b> - {sym}\n\
         Primary TF: {tf}  Price: {price:.6}\n\
         Spike: {val:.1} ({ratio:.2}x avg)  Δprice: {chg:.2}%\n\
         Large taker {flow} volume detected; move not played out yet, watch closely.\n\
         {time}",
        side = sig.side,
        sym = sig.symbol,
        tf = sig.timeframe,
        price = sig.price,
        val = sig.spike_value,
        ratio = sig.strength,
        chg = sig.price_change * 100.0,
        time = now.format("%Y-%m-%d %H:%M UTC"),
    );

    if let Some(ctx) = ctx {
        if let Some(l) = ctx.liquidations {
            msg.push_str(&format!(
                "\nLiqs 1h: longs {} (${:.0})  shorts {} (${:.0})",
                l.long_count, l.long_notional, l.short_count, l.short_notional
            ));
        }
        if let Some(r) = ctx.funding_rate {
            msg.push_str(&format!("\nFunding: {:.4}%", r * 100.0));
        }
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::market_context::LiquidationSummary;
    use chrono::TimeZone;

    fn sell_signal() -> Signal {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        Signal {
            side: Side::Sell,
            symbol: "ETHUSDT".into(),
            timeframe: "1h",
            strength: 8.0,
            price: 3012.5,
            price_change: -0.0125,
            spike_value: 40.0,
            baseline: 5.0,
            spike_time: t,
        }
    }

    #[test]
    fn formats_core_fields() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 34, 0).unwrap();
        let m = format_alert(&sell_signal(), None, now);
        assert!(m.contains("<b>Early SELL Alert</b> - ETHUSDT"));
        assert!(m.contains("Primary TF: 1h  Price: 3012.500000"));
        assert!(m.contains("Spike: 40.0 (8.00x avg)"));
        assert!(m.contains("Δprice: -1.25%"));
        assert!(m.contains("taker sell volume"));
        assert!(m.contains("2024-03-01 12:34 UTC"));
        assert!(!m.contains("Funding"));
    }

    #[test]
    fn appends_market_context() {
        let ctx = MarketContext {
            liquidations: Some(LiquidationSummary {
                long_count: 3,
                short_count: 1,
                long_notional: 150_000.0,
                short_notional: 2_000.0,
            }),
            funding_rate: Some(0.0001),
        };
        let m = format_alert(&sell_signal(), Some(&ctx), Utc::now());
        assert!(m.contains("longs 3 ($150000)"));
        assert!(m.contains("shorts 1 ($2000)"));
        assert!(m.contains("Funding: 0.0100%"));
    }

    #[tokio::test]
    async fn unconfigured_send_reports_not_configured() {
        let n = TelegramNotifier::new(None, Some("1".into()));
        assert!(!n.is_configured());
        assert!(matches!(n.send("hi").await, Err(NotifyError::NotConfigured)));
        // and notify() swallows it
        n.notify("hi").await;
    }
}
