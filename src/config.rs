use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

const ENV_PREFIX: &str = "MEDIA_DOWNLOADER";

/// Runtime settings for talking to the download server.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub base_url: String,
    /// Directory the server stores finished files under, relative to its root.
    pub storage_root: String,
    pub poll_interval: Duration,
    pub paste_settle_delay: Duration,
    pub request_timeout: Duration,
    pub download_timeout: Duration,
    /// Consecutive failed progress polls before a download is abandoned. 0 disables.
    pub max_missed_polls: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            storage_root: "descargas".to_string(),
            poll_interval: Duration::from_millis(1000),
            paste_settle_delay: Duration::from_millis(100),
            request_timeout: Duration::from_secs(30),
            download_timeout: Duration::from_secs(30 * 60),
            max_missed_polls: 30,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Applies `MEDIA_DOWNLOADER_*` overrides found through `lookup` on top of the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |name: &str| {
            lookup(&format!("{ENV_PREFIX}_{name}"))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(base_url) = get("BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(root) = get("STORAGE_ROOT") {
            config.storage_root = root.trim_matches('/').to_string();
        }
        if let Some(ms) = parse_or_warn::<u64>("POLL_INTERVAL_MS", get("POLL_INTERVAL_MS")) {
            if ms == 0 {
                warn!("ignoring zero poll interval");
            } else {
                config.poll_interval = Duration::from_millis(ms);
            }
        }
        if let Some(ms) = parse_or_warn::<u64>("PASTE_DELAY_MS", get("PASTE_DELAY_MS")) {
            config.paste_settle_delay = Duration::from_millis(ms);
        }
        if let Some(secs) =
            parse_or_warn::<u64>("REQUEST_TIMEOUT_SECS", get("REQUEST_TIMEOUT_SECS"))
        {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) =
            parse_or_warn::<u64>("DOWNLOAD_TIMEOUT_SECS", get("DOWNLOAD_TIMEOUT_SECS"))
        {
            config.download_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = parse_or_warn::<u32>("MAX_MISSED_POLLS", get("MAX_MISSED_POLLS")) {
            config.max_missed_polls = n;
        }

        config
    }
}

fn parse_or_warn<T: FromStr>(name: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(
                variable = %format!("{ENV_PREFIX}_{name}"),
                value = %raw,
                "ignoring unparseable setting"
            );
            None
        }
    }
}
