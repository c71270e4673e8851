//! Recommendation core for HealthGuard: live weather, a nutrition catalog and
//! the latest blood-pressure reading combined into one daily suggestion.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub mod engine;
pub mod food;
pub mod http_client;
pub mod observability;
pub mod random;
pub mod weather;

pub use engine::{BloodPressure, DietTip, Recommendation, RecommendationEngine};
pub use food::{FoodCache, FoodCatalogProvider};
pub use random::{RandomSource, ScriptedRandom, ThreadRandom};
pub use weather::{WeatherProvider, WeatherRules};

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed payload: {0}")]
    Payload(String),
    #[error("configuration error: {0}")]
    Config(String),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeatherSnapshot {
    /// Degrees Celsius.
    pub temperature: f64,
    pub description: String,
    pub display_text: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FoodItem {
    pub name: String,
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
    pub sodium_mg_per_100g: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExerciseOption {
    pub name: String,
    pub calories_burned: u32,
}

/// The subset of a stored health record the engine reads.
///
/// Both readings are optional; absent, null or non-numeric values are kept as
/// `None` and defaulted by [`BloodPressure::from_records`]. The short field
/// names used by the client forms (`sys_bp`, `dia_bp`) are accepted as aliases.
/// Each reading is decoded on its own, so one bad or doubled field never
/// discards the other.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "serde_json::Value")]
pub struct HealthRecord {
    pub systolic_bp: Option<f64>,
    pub diastolic_bp: Option<f64>,
}

impl HealthRecord {
    pub fn new(systolic_bp: Option<f64>, diastolic_bp: Option<f64>) -> Self {
        Self {
            systolic_bp,
            diastolic_bp,
        }
    }
}

impl From<&serde_json::Value> for HealthRecord {
    /// Anything that is not an object yields an empty record. The long column
    /// name wins when both spellings of a reading are present.
    fn from(value: &serde_json::Value) -> Self {
        let reading = |long: &str, short: &str| {
            value
                .get(long)
                .and_then(number_like)
                .or_else(|| value.get(short).and_then(number_like))
        };
        Self {
            systolic_bp: reading("systolic_bp", "sys_bp"),
            diastolic_bp: reading("diastolic_bp", "dia_bp"),
        }
    }
}

impl From<serde_json::Value> for HealthRecord {
    fn from(value: serde_json::Value) -> Self {
        Self::from(&value)
    }
}

/// Read a JSON number or a numeric string as `f64`.
pub(crate) fn number_like(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Raw access to the two remote services. Implementations report failures;
/// the providers built on top of them turn failures into fallback data.
#[async_trait]
pub trait AdvisorClient: Send + Sync + 'static {
    /// Current conditions for the configured location.
    async fn fetch_weather(&self) -> Result<WeatherSnapshot, AdvisorError>;
    /// Foods with positive energy values. An empty result is an error.
    async fn fetch_foods(&self) -> Result<Vec<FoodItem>, AdvisorError>;
}
