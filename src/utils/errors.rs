// src/utils/errors.rs

use std::{error::Error, fmt};
use reqwest::{self, StatusCode};
use serde_json;

/// Why a market-data request produced no usable data.
///
/// Every variant is transient from the scanner's point of view: the caller
/// logs it and moves on to the next symbol / timeframe.
#[derive(Debug)]
pub enum FetchError {
    Http(reqwest::Error),
    Status(StatusCode, String),
    Json(serde_json::Error),
    Malformed(String),
    /// The exchange answered with `[]`.
    EmptyPayload,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Http(e)            => write!(f, "HTTP error: {}", e),
            FetchError::Status(code, body) => write!(f, "HTTP {}: {}", code, body),
            FetchError::Json(e)            => write!(f, "JSON error: {}", e),
            FetchError::Malformed(msg)     => write!(f, "malformed payload: {}", msg),
            FetchError::EmptyPayload       => write!(f, "empty payload"),
        }
    }
}

impl Error for FetchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FetchError::Http(e) => Some(e),
            FetchError::Json(e) => Some(e),
            _                   => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self { FetchError::Http(err) }
}
impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self { FetchError::Json(err) }
}

/// Outbound chat delivery failures. Never escapes `Notifier::notify`.
#[derive(thiserror::Error, Debug)]
pub enum NotifyError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("telegram answered {0}: {1}")]
    Status(StatusCode, String),
    #[error("bot token / chat id not configured")]
    NotConfigured,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_display() {
        assert_eq!(FetchError::EmptyPayload.to_string(), "empty payload");
        let e = FetchError::Status(StatusCode::TOO_MANY_REQUESTS, "slow down".into());
        assert!(e.to_string().contains("429"));
        assert!(e.source().is_none());
    }

    #[test]
    fn json_error_keeps_source() {
        let raw = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let e: FetchError = raw.into();
        assert!(e.source().is_some());
        assert!(e.to_string().starts_with("JSON error"));
    }

    #[test]
    fn config_error_display() {
        assert_eq!(
            ConfigError::UnknownPreset("x".into()).to_string(),
            "unknown preset 'x'"
        );
    }
}
