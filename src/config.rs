use anyhow::{Context, Result, bail};
use std::time::Duration;
use tracing::info;
use url::Url;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_API_BASE_URL: &str = "https://api.line.me/";
const DEFAULT_API_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub channel_access_token: String,
    pub channel_secret: String,
    pub bind_addr: String,
    pub api_base_url: Url,
    pub api_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let (Some(channel_access_token), Some(channel_secret)) = (
            required("LINE_CHANNEL_ACCESS_TOKEN"),
            required("LINE_CHANNEL_SECRET"),
        ) else {
            bail!(
                "Specify LINE_CHANNEL_ACCESS_TOKEN and LINE_CHANNEL_SECRET as environment variable."
            );
        };

        let bind_addr = lookup("BIND_ADDR")
            .or_else(|| lookup("PORT").map(|p| format!("0.0.0.0:{p}")))
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let raw_base_url =
            lookup("LINE_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let api_base_url = parse_base_url(&raw_base_url)
            .with_context(|| format!("Invalid LINE_API_BASE_URL '{raw_base_url}'"))?;

        let api_timeout = match lookup("LINE_API_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid LINE_API_TIMEOUT_SECS '{raw}'"))?;
                if secs == 0 {
                    bail!("LINE_API_TIMEOUT_SECS must be at least 1");
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
        };

        Ok(Self {
            channel_access_token,
            channel_secret,
            bind_addr,
            api_base_url,
            api_timeout,
        })
    }

    pub fn log_startup_info(&self) {
        info!("Listening on {}", self.bind_addr);
        info!("Webhook endpoint: POST /callback");
        info!("Messaging API base URL: {}", self.api_base_url);
    }
}

/// Relative joins drop the last path segment unless the base ends with '/'.
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
