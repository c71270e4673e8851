//! Combines weather, blood pressure and the food catalog into one suggestion.
//!
//! Every step degrades instead of failing: missing readings default to a
//! normal blood pressure, unavailable services fall back to local data, and an
//! empty low-sodium selection widens to the whole catalog.

use std::sync::Arc;

use serde::Serialize;

use crate::config::AdvisorConfig;
use crate::food::{FoodCatalogProvider, fallback_catalog};
use crate::http_client::ReqwestAdvisorClient;
use crate::observability::record_recommendation;
use crate::random::{RandomSource, ThreadRandom, pick};
use crate::weather::{WeatherProvider, WeatherRules};
use crate::{
    AdvisorClient, AdvisorError, ExerciseOption, FoodItem, HealthRecord, WeatherSnapshot,
};

pub const DEFAULT_SYSTOLIC: f64 = 120.0;
pub const DEFAULT_DIASTOLIC: f64 = 80.0;
pub const HIGH_SYSTOLIC: f64 = 140.0;
pub const HIGH_DIASTOLIC: f64 = 90.0;
/// mg per 100 g; foods at or above this are filtered out for high blood pressure.
pub const LOW_SODIUM_LIMIT_MG: f64 = 500.0;
pub const PORTION_GRAMS: u32 = 200;
pub const EXERCISE_MINUTES: u32 = 30;

const INDOOR_EXERCISES: [(&str, u32); 4] = [
    ("indoor swimming", 300),
    ("yoga", 150),
    ("gym strength training", 250),
    ("spin class", 400),
];

const OUTDOOR_EXERCISES: [(&str, u32); 4] = [
    ("outdoor running", 350),
    ("morning jog", 300),
    ("brisk walk in the park", 180),
    ("outdoor cycling", 280),
];

fn exercise_options(indoor: bool) -> Vec<ExerciseOption> {
    let set = if indoor {
        &INDOOR_EXERCISES
    } else {
        &OUTDOOR_EXERCISES
    };
    set.iter()
        .map(|&(name, calories_burned)| ExerciseOption {
            name: name.to_string(),
            calories_burned,
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BloodPressure {
    pub systolic: f64,
    pub diastolic: f64,
}

impl Default for BloodPressure {
    fn default() -> Self {
        Self {
            systolic: DEFAULT_SYSTOLIC,
            diastolic: DEFAULT_DIASTOLIC,
        }
    }
}

impl BloodPressure {
    /// Reading from the last record; records are expected in chronological
    /// order. Each value defaults independently when absent or non-positive.
    pub fn from_records(records: &[HealthRecord]) -> Self {
        let Some(last) = records.last() else {
            return Self::default();
        };
        let valid = |v: Option<f64>| v.filter(|v| *v > 0.0);
        Self {
            systolic: valid(last.systolic_bp).unwrap_or(DEFAULT_SYSTOLIC),
            diastolic: valid(last.diastolic_bp).unwrap_or(DEFAULT_DIASTOLIC),
        }
    }

    pub fn is_high(&self) -> bool {
        self.systolic > HIGH_SYSTOLIC || self.diastolic > HIGH_DIASTOLIC
    }

    pub fn status_label(&self) -> String {
        if self.is_high() {
            format!(
                "BP elevated ({}/{})",
                self.systolic as i64, self.diastolic as i64
            )
        } else {
            "BP normal".to_string()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DietTip {
    LowSodiumFiltered,
    Balanced,
    NoLowSodiumOption,
}

impl DietTip {
    pub fn as_str(self) -> &'static str {
        match self {
            DietTip::LowSodiumFiltered => "low-sodium foods filtered for you",
            DietTip::Balanced => "balanced diet",
            DietTip::NoLowSodiumOption => "no low-sodium option available, please watch your intake",
        }
    }
}

/// Choose a food for the given blood-pressure state. High blood pressure
/// restricts the pick to low-sodium items, widening to the whole catalog when
/// none qualify. `None` only for an empty catalog.
pub fn select_food(
    catalog: &[FoodItem],
    bp_high: bool,
    random: &dyn RandomSource,
) -> Option<(FoodItem, DietTip)> {
    if !bp_high {
        return pick(random, catalog).map(|f| (f.clone(), DietTip::Balanced));
    }
    let low_sodium: Vec<&FoodItem> = catalog
        .iter()
        .filter(|f| f.sodium_mg_per_100g < LOW_SODIUM_LIMIT_MG)
        .collect();
    match pick(random, &low_sodium) {
        Some(food) => Some(((*food).clone(), DietTip::LowSodiumFiltered)),
        None => pick(random, catalog).map(|f| (f.clone(), DietTip::NoLowSodiumOption)),
    }
}

/// Whole kcal and protein grams (one decimal) for `grams` of `food`.
pub fn portion_nutrition(food: &FoodItem, grams: u32) -> (i64, f64) {
    let factor = f64::from(grams) / 100.0;
    let calories = (food.calories_per_100g * factor).round() as i64;
    let protein = (food.protein_per_100g * factor * 10.0).round() / 10.0;
    (calories, protein)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Recommendation {
    pub text: String,
    pub weather: WeatherSnapshot,
    pub exercise: ExerciseOption,
    pub food: FoodItem,
    pub food_portion_g: u32,
    pub food_calories: i64,
    pub food_protein_g: f64,
    pub diet_tip: DietTip,
    pub blood_pressure: BloodPressure,
    pub indoor: bool,
    pub bp_high: bool,
}

impl Recommendation {
    /// Shape returned to RPC callers: the message plus its raw inputs.
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "text": self.text,
            "raw": {
                "weather": self.weather,
                "exercise": self.exercise,
                "food": self.food,
                "food_portion_g": self.food_portion_g,
                "food_calories": self.food_calories,
                "food_protein_g": self.food_protein_g,
                "diet_tip": self.diet_tip,
                "indoor": self.indoor,
                "bp_high": self.bp_high,
            }
        })
    }
}

pub struct RecommendationEngine {
    weather: WeatherProvider,
    foods: FoodCatalogProvider,
    rules: WeatherRules,
    random: Arc<dyn RandomSource>,
}

impl RecommendationEngine {
    pub fn new(
        client: Arc<dyn AdvisorClient>,
        random: Arc<dyn RandomSource>,
        rules: WeatherRules,
    ) -> Self {
        Self {
            weather: WeatherProvider::new(client.clone(), random.clone()),
            foods: FoodCatalogProvider::new(client),
            rules,
            random,
        }
    }

    /// Engine backed by the live services described by `config`.
    pub fn from_config(config: &AdvisorConfig) -> Result<Self, AdvisorError> {
        let client = ReqwestAdvisorClient::new(config)?;
        Ok(Self::new(
            Arc::new(client),
            Arc::new(ThreadRandom),
            WeatherRules::new(config.bad_weather_keywords.iter().cloned()),
        ))
    }

    pub fn food_catalog(&self) -> &FoodCatalogProvider {
        &self.foods
    }

    pub async fn generate(&self, records: &[HealthRecord]) -> Recommendation {
        let blood_pressure = BloodPressure::from_records(records);
        let bp_high = blood_pressure.is_high();

        let weather = self.weather.get_weather().await;
        let indoor = self.rules.is_bad(&weather);
        let advisory = if indoor {
            format!("{}, indoor exercise recommended", weather.display_text)
        } else {
            format!("{}, weather suitable", weather.display_text)
        };
        let options = exercise_options(indoor);
        let exercise = pick(self.random.as_ref(), &options)
            .cloned()
            .unwrap_or_else(|| options[0].clone());

        let catalog = self.foods.get_food_catalog().await;
        let (food, diet_tip) = select_food(&catalog, bp_high, self.random.as_ref())
            .or_else(|| select_food(&fallback_catalog(), bp_high, self.random.as_ref()))
            .unwrap_or_else(|| (fallback_catalog().swap_remove(0), DietTip::Balanced));

        let (food_calories, food_protein_g) = portion_nutrition(&food, PORTION_GRAMS);

        let text = format!(
            "Today's suggestion: {advisory} + {bp}. \
             Try {exercise} for {minutes} minutes (burns {burn} kcal), \
             paired with a {portion}g serving of {food} for dinner \
             ({tip}, {calories} kcal, {protein:.1}g protein). \
             Together they should open a calorie deficit toward today's health goal.",
            bp = blood_pressure.status_label(),
            exercise = exercise.name,
            minutes = EXERCISE_MINUTES,
            burn = exercise.calories_burned,
            portion = PORTION_GRAMS,
            food = food.name,
            tip = diet_tip.as_str(),
            calories = food_calories,
            protein = food_protein_g,
        );

        record_recommendation(bp_high, indoor);
        tracing::debug!(bp_high, indoor, food = %food.name, exercise = %exercise.name, "recommendation generated");

        Recommendation {
            text,
            weather,
            exercise,
            food,
            food_portion_g: PORTION_GRAMS,
            food_calories,
            food_protein_g,
            diet_tip,
            blood_pressure,
            indoor,
            bp_high,
        }
    }
}
