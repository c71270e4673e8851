use std::sync::Arc;

use crate::config::DEFAULT_BAD_WEATHER_KEYWORDS;
use crate::observability::{DataSource, WEATHER_REQUESTS, record_source};
use crate::random::{RandomSource, pick};
use crate::{AdvisorClient, WeatherSnapshot};

/// Above this temperature outdoor exercise is discouraged (°C, exclusive).
pub const HOT_ABOVE_C: f64 = 30.0;
/// Below this temperature outdoor exercise is discouraged (°C, exclusive).
pub const COLD_BELOW_C: f64 = 5.0;

/// Plausible conditions used when the live lookup fails.
pub fn fallback_scenarios() -> [WeatherSnapshot; 4] {
    let scenario = |temperature: f64, description: &str, display_text: &str| WeatherSnapshot {
        temperature,
        description: description.to_string(),
        display_text: display_text.to_string(),
    };
    [
        scenario(35.0, "hot and clear", "Today 35°C, hot"),
        scenario(28.0, "cloudy", "Cloudy today, 28°C"),
        scenario(24.0, "comfortable", "Pleasant weather today, 24°C"),
        scenario(12.0, "cold", "Chilly today, 12°C"),
    ]
}

/// Current conditions, never failing. Not cached: every call asks the
/// weather service again.
#[derive(Clone)]
pub struct WeatherProvider {
    client: Arc<dyn AdvisorClient>,
    random: Arc<dyn RandomSource>,
}

impl WeatherProvider {
    pub fn new(client: Arc<dyn AdvisorClient>, random: Arc<dyn RandomSource>) -> Self {
        Self { client, random }
    }

    pub async fn get_weather(&self) -> WeatherSnapshot {
        match self.client.fetch_weather().await {
            Ok(snapshot) => {
                record_source(WEATHER_REQUESTS, DataSource::Live);
                tracing::debug!(
                    temperature = snapshot.temperature,
                    description = %snapshot.description,
                    "live weather"
                );
                snapshot
            }
            Err(e) => {
                record_source(WEATHER_REQUESTS, DataSource::Fallback);
                tracing::warn!(error = %e, "weather lookup failed, using a fallback scenario");
                random_fallback(self.random.as_ref())
            }
        }
    }
}

/// Decides whether the weather calls for indoor exercise: a temperature
/// extreme, or a description containing any configured keyword.
#[derive(Clone, Debug, PartialEq)]
pub struct WeatherRules {
    keywords: Vec<String>,
    hot_above: f64,
    cold_below: f64,
}

impl Default for WeatherRules {
    fn default() -> Self {
        Self::new(DEFAULT_BAD_WEATHER_KEYWORDS.iter().map(|k| k.to_string()))
    }
}

impl WeatherRules {
    pub fn new(keywords: impl IntoIterator<Item = String>) -> Self {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            hot_above: HOT_ABOVE_C,
            cold_below: COLD_BELOW_C,
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_bad(&self, weather: &WeatherSnapshot) -> bool {
        if weather.temperature > self.hot_above || weather.temperature < self.cold_below {
            return true;
        }
        let description = weather.description.to_lowercase();
        self.keywords.iter().any(|k| description.contains(k.as_str()))
    }
}

/// Pick one of the fallback scenarios with the given source.
pub fn random_fallback(random: &dyn RandomSource) -> WeatherSnapshot {
    let scenarios = fallback_scenarios();
    pick(random, &scenarios)
        .cloned()
        .unwrap_or_else(|| scenarios[0].clone())
}
