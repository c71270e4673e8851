use crate::AdvisorError;
use secrecy::SecretString;
use std::time::Duration;

pub const DEFAULT_WEATHER_BASE_URL: &str = "https://restapi.amap.com";
pub const DEFAULT_USDA_BASE_URL: &str = "https://api.nal.usda.gov";
pub const DEFAULT_CITY_CODE: &str = "110000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_BAD_WEATHER_KEYWORDS: &[&str] = &[
    "雨", "雪", "霾", "沙", "rain", "snow", "haze", "smog", "sand", "dust",
];

#[derive(Clone, Debug)]
pub struct AdvisorConfig {
    pub amap_api_key: SecretString,
    pub usda_api_key: SecretString,
    pub weather_base_url: String,
    pub usda_base_url: String,
    /// Administrative area code of the fixed location (Beijing by default).
    pub city_code: String,
    pub timeout: Duration,
    pub bad_weather_keywords: Vec<String>,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            amap_api_key: SecretString::new("".into()),
            usda_api_key: SecretString::new("DEMO_KEY".into()),
            weather_base_url: DEFAULT_WEATHER_BASE_URL.into(),
            usda_base_url: DEFAULT_USDA_BASE_URL.into(),
            city_code: DEFAULT_CITY_CODE.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            bad_weather_keywords: DEFAULT_BAD_WEATHER_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

impl AdvisorConfig {
    pub fn from_env() -> Result<Self, AdvisorError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function instead of the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, AdvisorError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(key) = get("HEALTHGUARD_AMAP_API_KEY") {
            cfg.amap_api_key = SecretString::new(key.into());
        }
        if let Some(key) = get("HEALTHGUARD_USDA_API_KEY") {
            cfg.usda_api_key = SecretString::new(key.into());
        }
        if let Some(url) = get("HEALTHGUARD_WEATHER_BASE_URL") {
            cfg.weather_base_url = url;
        }
        if let Some(url) = get("HEALTHGUARD_USDA_BASE_URL") {
            cfg.usda_base_url = url;
        }
        if let Some(code) = get("HEALTHGUARD_CITY_CODE") {
            cfg.city_code = code;
        }
        if let Some(raw) = get("HEALTHGUARD_HTTP_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                AdvisorError::Config(format!("HEALTHGUARD_HTTP_TIMEOUT_SECS is not a number: {raw}"))
            })?;
            if secs == 0 {
                return Err(AdvisorError::Config(
                    "HEALTHGUARD_HTTP_TIMEOUT_SECS must be positive".into(),
                ));
            }
            cfg.timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = get("HEALTHGUARD_BAD_WEATHER_KEYWORDS") {
            let keywords: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from)
                .collect();
            if !keywords.is_empty() {
                cfg.bad_weather_keywords = keywords;
            }
        }
        Ok(cfg)
    }
}
