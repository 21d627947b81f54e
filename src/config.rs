use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub refresh_interval: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let api_base_url = std::env::var("FAQBOARD_API_URL")
            .ok()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let refresh_interval = std::env::var("FAQBOARD_REFRESH_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS));

        Self {
            api_base_url,
            refresh_interval,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
        }
    }
}
