//! HTTP client for the weather and nutrition services.
//!
//! This module provides a reqwest-based implementation of the [`AdvisorClient`](crate::AdvisorClient) trait.
//! It reports every failure; the providers decide what to fall back to.

use crate::config::AdvisorConfig;
use crate::{AdvisorClient, AdvisorError, FoodItem, WeatherSnapshot, number_like};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;

const WEATHER_PATH: &str = "/v3/weather/weatherInfo";
const FOOD_SEARCH_PATH: &str = "/fdc/v1/foods/search";
const FOOD_QUERY: &str = "cooked";
const FOOD_PAGE_SIZE: &str = "20";
const FOOD_DATA_TYPES: [&str; 2] = ["Foundation", "SR Legacy"];

pub const NUTRIENT_ENERGY_KCAL: i64 = 1008;
pub const NUTRIENT_PROTEIN: i64 = 1003;
pub const NUTRIENT_SODIUM: i64 = 1093;

const DEFAULT_TEMPERATURE: f64 = 25.0;
const DEFAULT_DESCRIPTION: &str = "晴";
const DEFAULT_CITY: &str = "北京";

/// Client for the Amap weather and USDA FoodData Central APIs using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestAdvisorClient {
    weather_base_url: String,
    usda_base_url: String,
    city_code: String,
    amap_api_key: SecretString,
    usda_api_key: SecretString,
    client: reqwest::Client,
}

impl ReqwestAdvisorClient {
    /// Create a new client; every request inherits `config.timeout`.
    pub fn new(config: &AdvisorConfig) -> Result<Self, AdvisorError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            weather_base_url: config.weather_base_url.trim_end_matches('/').to_string(),
            usda_base_url: config.usda_base_url.trim_end_matches('/').to_string(),
            city_code: config.city_code.clone(),
            amap_api_key: config.amap_api_key.clone(),
            usda_api_key: config.usda_api_key.clone(),
            client,
        })
    }

    /// Execute a request and decode a JSON body, rejecting non-200 responses.
    async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, AdvisorError> {
        let resp = request.send().await?;
        if resp.status() != reqwest::StatusCode::OK {
            return Err(self.error_from_response(resp).await);
        }
        Ok(resp.json::<T>().await?)
    }

    /// Extract error information from a failed response.
    async fn error_from_response(&self, resp: reqwest::Response) -> AdvisorError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        AdvisorError::Status {
            status,
            body: body.chars().take(256).collect(),
        }
    }
}

#[async_trait]
impl AdvisorClient for ReqwestAdvisorClient {
    async fn fetch_weather(&self) -> Result<WeatherSnapshot, AdvisorError> {
        let url = format!("{}{}", self.weather_base_url, WEATHER_PATH);
        let request = self.client.get(&url).query(&[
            ("key", self.amap_api_key.expose_secret()),
            ("city", self.city_code.as_str()),
            ("extensions", "base"),
            ("output", "json"),
        ]);
        let body: Value = self.execute_json(request).await?;
        parse_weather(&body)
    }

    async fn fetch_foods(&self) -> Result<Vec<FoodItem>, AdvisorError> {
        let url = format!("{}{}", self.usda_base_url, FOOD_SEARCH_PATH);
        let mut params = vec![
            ("api_key", self.usda_api_key.expose_secret()),
            ("query", FOOD_QUERY),
            ("pageSize", FOOD_PAGE_SIZE),
        ];
        params.extend(FOOD_DATA_TYPES.iter().map(|t| ("dataType", *t)));
        let request = self.client.get(&url).query(&params);
        let body: FoodSearchResponse = self.execute_json(request).await?;
        let foods: Vec<FoodItem> = body.foods.into_iter().filter_map(food_item).collect();
        if foods.is_empty() {
            return Err(AdvisorError::Payload(
                "food search returned no items with positive energy".into(),
            ));
        }
        Ok(foods)
    }
}

/// Decode an Amap `weatherInfo` body: `{"status": "1", "lives": [{...}]}`.
pub fn parse_weather(body: &Value) -> Result<WeatherSnapshot, AdvisorError> {
    if body.get("status").and_then(Value::as_str) != Some("1") {
        return Err(AdvisorError::Payload(format!(
            "weather status flag not set: {}",
            body.get("info").and_then(Value::as_str).unwrap_or("no info")
        )));
    }
    let live = body
        .get("lives")
        .and_then(Value::as_array)
        .and_then(|lives| lives.first())
        .ok_or_else(|| AdvisorError::Payload("weather response has no live conditions".into()))?;

    let temperature = live
        .get("temperature")
        .and_then(number_like)
        .unwrap_or(DEFAULT_TEMPERATURE);
    let description = live
        .get("weather")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_DESCRIPTION)
        .to_string();
    let city = live
        .get("city")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_CITY);

    Ok(WeatherSnapshot {
        display_text: format!("Today {city} {description} {temperature}°C"),
        temperature,
        description,
    })
}

#[derive(Debug, Deserialize)]
struct FoodSearchResponse {
    #[serde(default)]
    foods: Vec<SearchFood>,
}

#[derive(Debug, Deserialize)]
struct SearchFood {
    #[serde(default)]
    description: Option<String>,
    #[serde(default, rename = "foodNutrients")]
    food_nutrients: Vec<SearchNutrient>,
}

#[derive(Debug, Deserialize)]
struct SearchNutrient {
    #[serde(default, rename = "nutrientId")]
    nutrient_id: Option<i64>,
    #[serde(default)]
    value: Option<f64>,
}

/// Items without positive energy are unusable and dropped.
fn food_item(food: SearchFood) -> Option<FoodItem> {
    let nutrient = |id: i64| {
        food.food_nutrients
            .iter()
            .filter(|n| n.nutrient_id == Some(id))
            .filter_map(|n| n.value)
            .last()
            .unwrap_or(0.0)
    };
    let calories = nutrient(NUTRIENT_ENERGY_KCAL);
    if calories <= 0.0 {
        return None;
    }
    let protein = nutrient(NUTRIENT_PROTEIN);
    let sodium = nutrient(NUTRIENT_SODIUM);
    Some(FoodItem {
        name: food.description.unwrap_or_else(|| "Unknown".into()),
        calories_per_100g: calories,
        protein_per_100g: protein,
        sodium_mg_per_100g: sodium,
    })
}
