use serde::Deserialize;
use std::env;

/// Process configuration. Credential sections are optional: a missing pair
/// simply leaves the corresponding provider unconfigured, it is never an
/// error. Everything is read once at startup and never reloaded.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub amadeus: Option<AmadeusConfig>,
    #[serde(default)]
    pub serpapi: Option<SerpApiConfig>,
    #[serde(default)]
    pub razorpay: Option<RazorpayConfig>,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AmadeusConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_amadeus_base_url")]
    pub base_url: String,
}

fn default_amadeus_base_url() -> String {
    "https://test.api.amadeus.com".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SerpApiConfig {
    pub api_key: String,
    #[serde(default = "default_serpapi_base_url")]
    pub base_url: String,
}

fn default_serpapi_base_url() -> String {
    "https://serpapi.com".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: String,
    #[serde(default = "default_razorpay_base_url")]
    pub base_url: String,
}

fn default_razorpay_base_url() -> String {
    "https://api.razorpay.com".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Upper bound for one provider call; a stalled upstream is recorded as
    /// that provider's failure once this elapses.
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider_timeout_secs: default_provider_timeout(),
        }
    }
}

fn default_provider_timeout() -> u64 {
    30
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `FARELINK_AMADEUS__CLIENT_ID=...`
            .add_source(config::Environment::with_prefix("FARELINK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_deserializes_with_defaults() {
        let cfg: Config = serde_json::from_str("{}").expect("empty config");
        assert!(cfg.amadeus.is_none());
        assert!(cfg.serpapi.is_none());
        assert!(cfg.razorpay.is_none());
        assert_eq!(cfg.search.provider_timeout_secs, 30);
    }

    #[test]
    fn test_credential_section_parses() {
        let cfg: Config = serde_json::from_str(
            r#"{
                "amadeus": {"client_id": "id", "client_secret": "secret"},
                "search": {"provider_timeout_secs": 10}
            }"#,
        )
        .expect("config");
        let amadeus = cfg.amadeus.expect("amadeus section");
        assert_eq!(amadeus.client_id, "id");
        assert_eq!(amadeus.base_url, "https://test.api.amadeus.com");
        assert_eq!(cfg.search.provider_timeout_secs, 10);
    }
}
