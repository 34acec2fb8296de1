use dotenv::dotenv;
use std::env;

use crate::config::presets::{self, ScanConfig};
use crate::utils::errors::ConfigError;

pub const DEFAULT_PRESET: &str = "auto_tf";

/// Process-level inputs. Only the two chat secrets and the preset name come
/// from the environment; every threshold is compiled in.
#[derive(Clone)]
pub struct Settings {
    pub telegram_token: Option<String>,
    pub chat_id: Option<String>,
    pub preset: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok(); // loads `.env` file automatically

        let telegram_token = non_empty(env::var("TELEGRAM_TOKEN").ok());
        let chat_id = non_empty(env::var("CHAT_ID").ok());
        let preset = non_empty(env::var("SCANNER_PRESET").ok())
            .unwrap_or_else(|| DEFAULT_PRESET.into());

        // fail at start-up rather than mid-scan
        presets::by_name(&preset)?;

        Ok(Self {
            telegram_token,
            chat_id,
            preset,
        })
    }

    pub fn scan_config(&self) -> Result<ScanConfig, ConfigError> {
        presets::by_name(&self.preset)
    }
}

// never print the token
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("telegram_token", &self.telegram_token.as_ref().map(|_| "***"))
            .field("chat_id", &self.chat_id)
            .field("preset", &self.preset)
            .finish()
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_count_as_missing() {
        assert_eq!(non_empty(Some("  ".into())), None);
        assert_eq!(non_empty(Some(" abc ".into())), Some("abc".into()));
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn debug_hides_token() {
        let s = Settings {
            telegram_token: Some("123:secret".into()),
            chat_id: Some("42".into()),
            preset: DEFAULT_PRESET.into(),
        };
        let dbg = format!("{s:?}");
        assert!(!dbg.contains("secret"));
        assert!(dbg.contains("***"));
        assert_eq!(s.scan_config().unwrap().name, "auto_tf");
    }
}
