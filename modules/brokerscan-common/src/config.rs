use std::time::Duration;

use crate::error::ScanError;
use crate::types::ScanOptions;

const DEFAULT_SKIPTRACE_HOST: &str = "skip-tracing-working-api.p.rapidapi.com";

/// Application configuration loaded from environment variables.
/// API credentials are optional: a missing key only fails the broker that needs it.
#[derive(Debug, Clone)]
pub struct Config {
    // Skip-trace API
    pub skiptrace_api_key: Option<String>,
    pub skiptrace_api_host: String,

    // People-search actor (Apify)
    pub apify_api_key: Option<String>,
    pub people_search_actor_id: Option<String>,

    // Scan policy
    pub scan_priority: u8,
    pub scan_batch_size: usize,
    pub batch_cooldown: Duration,
    pub broker_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ScanError> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.log_keys();
        Ok(config)
    }

    /// Build from any key lookup. `from_env` is this over the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ScanError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            skiptrace_api_key: non_empty("SKIPTRACE_API_KEY"),
            skiptrace_api_host: non_empty("SKIPTRACE_API_HOST")
                .unwrap_or_else(|| DEFAULT_SKIPTRACE_HOST.to_string()),
            apify_api_key: non_empty("APIFY_API_KEY"),
            people_search_actor_id: non_empty("PEOPLE_SEARCH_ACTOR_ID"),
            scan_priority: parse_or("SCAN_PRIORITY", non_empty("SCAN_PRIORITY"), 3)?,
            scan_batch_size: parse_or("SCAN_BATCH_SIZE", non_empty("SCAN_BATCH_SIZE"), 5)?,
            batch_cooldown: Duration::from_millis(parse_or(
                "SCAN_BATCH_COOLDOWN_MS",
                non_empty("SCAN_BATCH_COOLDOWN_MS"),
                2000,
            )?),
            broker_timeout: Duration::from_secs(parse_or(
                "BROKER_TIMEOUT_SECS",
                non_empty("BROKER_TIMEOUT_SECS"),
                30,
            )?),
        })
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            priority: self.scan_priority,
            batch_size: self.scan_batch_size,
        }
    }

    fn log_keys(&self) {
        fn preview(val: &Option<String>) -> String {
            match val {
                Some(v) => {
                    let n = v.chars().take(5).map(char::len_utf8).sum::<usize>();
                    format!("{}...({} chars)", &v[..n], v.len())
                }
                None => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  SKIPTRACE_API_KEY: {}", preview(&self.skiptrace_api_key));
        tracing::info!("  SKIPTRACE_API_HOST: {}", self.skiptrace_api_host);
        tracing::info!("  APIFY_API_KEY: {}", preview(&self.apify_api_key));
        tracing::info!(
            "  PEOPLE_SEARCH_ACTOR_ID: {}",
            self.people_search_actor_id.as_deref().unwrap_or("<not set>")
        );
        tracing::info!(
            priority = self.scan_priority,
            batch_size = self.scan_batch_size,
            cooldown_ms = self.batch_cooldown.as_millis() as u64,
            timeout_secs = self.broker_timeout.as_secs(),
            "  Scan policy"
        );
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &str,
    raw: Option<String>,
    default: T,
) -> Result<T, ScanError> {
    match raw {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ScanError::Config(format!("{key} must be a number, got {v:?}"))),
        None => Ok(default),
    }
}
