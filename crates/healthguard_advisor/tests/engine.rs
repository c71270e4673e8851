use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use healthguard_advisor::{
    AdvisorClient, AdvisorError, DietTip, FoodItem, HealthRecord, RecommendationEngine,
    ScriptedRandom, ThreadRandom, WeatherRules, WeatherSnapshot,
};

/// Serves fixed data, or fails when the corresponding field is `None`.
struct StubClient {
    weather: Option<WeatherSnapshot>,
    foods: Option<Vec<FoodItem>>,
    food_calls: AtomicU32,
}

impl StubClient {
    fn new(weather: Option<WeatherSnapshot>, foods: Option<Vec<FoodItem>>) -> Self {
        Self {
            weather,
            foods,
            food_calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl AdvisorClient for StubClient {
    async fn fetch_weather(&self) -> Result<WeatherSnapshot, AdvisorError> {
        self.weather
            .clone()
            .ok_or_else(|| AdvisorError::Payload("no weather".into()))
    }

    async fn fetch_foods(&self) -> Result<Vec<FoodItem>, AdvisorError> {
        self.food_calls.fetch_add(1, Ordering::SeqCst);
        self.foods
            .clone()
            .ok_or_else(|| AdvisorError::Payload("no foods".into()))
    }
}

fn weather(temperature: f64, description: &str) -> WeatherSnapshot {
    WeatherSnapshot {
        temperature,
        description: description.into(),
        display_text: format!("Today 北京市 {description} {temperature}°C"),
    }
}

fn food(name: &str, calories: f64, protein: f64, sodium: f64) -> FoodItem {
    FoodItem {
        name: name.into(),
        calories_per_100g: calories,
        protein_per_100g: protein,
        sodium_mg_per_100g: sodium,
    }
}

fn engine(client: Arc<StubClient>, pick: usize) -> RecommendationEngine {
    RecommendationEngine::new(
        client,
        Arc::new(ScriptedRandom::always(pick)),
        WeatherRules::default(),
    )
}

const INDOOR: [&str; 4] = ["indoor swimming", "yoga", "gym strength training", "spin class"];
const OUTDOOR: [&str; 4] = [
    "outdoor running",
    "morning jog",
    "brisk walk in the park",
    "outdoor cycling",
];

#[tokio::test]
async fn everything_offline_still_produces_a_recommendation() {
    let client = Arc::new(StubClient::new(None, None));
    let engine = RecommendationEngine::new(client, Arc::new(ThreadRandom), WeatherRules::default());
    for _ in 0..20 {
        let rec = engine.generate(&[]).await;
        assert!(!rec.text.is_empty());
        assert!(!rec.bp_high);
        assert_eq!(rec.food_portion_g, 200);
        assert!(rec.text.contains(&rec.food.name));
        assert!(rec.text.contains(&rec.exercise.name));
    }
}

#[tokio::test]
async fn light_rain_selects_indoor_exercise() {
    let client = Arc::new(StubClient::new(Some(weather(20.0, "小雨")), None));
    for pick in 0..4 {
        let rec = engine(client.clone(), pick).generate(&[]).await;
        assert!(rec.indoor);
        assert_eq!(rec.exercise.name, INDOOR[pick]);
        assert!(rec.text.contains("indoor exercise recommended"));
    }
}

#[tokio::test]
async fn heat_selects_indoor_exercise() {
    let client = Arc::new(StubClient::new(Some(weather(35.0, "晴")), None));
    let rec = engine(client, 3).generate(&[]).await;
    assert!(rec.indoor);
    assert_eq!(rec.exercise.name, "spin class");
    assert_eq!(rec.exercise.calories_burned, 400);
}

#[tokio::test]
async fn clear_mild_day_selects_outdoor_exercise() {
    let client = Arc::new(StubClient::new(Some(weather(22.0, "晴")), None));
    let rec = engine(client, 2).generate(&[]).await;
    assert!(!rec.indoor);
    assert!(OUTDOOR.contains(&rec.exercise.name.as_str()));
    assert_eq!(rec.exercise.calories_burned, 180);
    assert!(rec.text.contains("weather suitable"));
}

#[tokio::test]
async fn high_systolic_filters_to_low_sodium() {
    let catalog = vec![
        food("Ham, cooked", 145.0, 20.0, 1200.0),
        food("Cod, baked", 105.0, 23.0, 78.0),
        food("Bacon, cooked", 540.0, 37.0, 1700.0),
    ];
    let client = Arc::new(StubClient::new(Some(weather(22.0, "晴")), Some(catalog)));
    let records = [
        HealthRecord::new(Some(120.0), Some(80.0)),
        serde_json::from_value(serde_json::json!({"sys_bp": 150, "dia_bp": 70})).unwrap(),
    ];
    for pick in 0..3 {
        let rec = engine(client.clone(), pick).generate(&records).await;
        assert!(rec.bp_high);
        assert_eq!(rec.food.name, "Cod, baked");
        assert_eq!(rec.diet_tip, DietTip::LowSodiumFiltered);
        assert!(rec.text.contains("BP elevated (150/70)"));
    }
}

#[tokio::test]
async fn high_bp_without_low_sodium_foods_still_picks_one() {
    let catalog = vec![
        food("Ham, cooked", 145.0, 20.0, 1200.0),
        food("Bacon, cooked", 540.0, 37.0, 500.0),
    ];
    let client = Arc::new(StubClient::new(Some(weather(22.0, "晴")), Some(catalog)));
    let records = [HealthRecord::new(Some(130.0), Some(95.0))];
    let rec = engine(client, 1).generate(&records).await;
    assert!(rec.bp_high);
    assert_eq!(rec.food.name, "Bacon, cooked");
    assert_eq!(rec.diet_tip, DietTip::NoLowSodiumOption);
    assert!(rec.text.contains("no low-sodium option"));
}

#[tokio::test]
async fn boundary_reading_is_normal() {
    let client = Arc::new(StubClient::new(None, None));
    let records = [HealthRecord::new(Some(140.0), Some(90.0))];
    let rec = engine(client, 0).generate(&records).await;
    assert!(!rec.bp_high);
    assert_eq!(rec.diet_tip, DietTip::Balanced);
    assert!(rec.text.contains("BP normal"));
}

#[tokio::test]
async fn portion_figures_appear_in_text_and_payload() {
    let catalog = vec![food("Steamed shrimp", 85.0, 18.0, 120.0)];
    let client = Arc::new(StubClient::new(Some(weather(22.0, "晴")), Some(catalog)));
    let rec = engine(client, 0).generate(&[]).await;
    assert_eq!(rec.food_calories, 170);
    assert_eq!(rec.food_protein_g, 36.0);
    assert!(rec.text.contains("200g serving of Steamed shrimp"));
    assert!(rec.text.contains("170 kcal"));
    assert!(rec.text.contains("36.0g protein"));

    let payload = rec.to_payload();
    assert_eq!(payload["text"], serde_json::json!(rec.text));
    assert_eq!(payload["raw"]["bp_high"], serde_json::json!(false));
    assert_eq!(payload["raw"]["food"]["calories_per_100g"], serde_json::json!(85.0));
    assert_eq!(payload["raw"]["exercise"]["name"], serde_json::json!(rec.exercise.name));
    assert_eq!(payload["raw"]["food_portion_g"], serde_json::json!(200));
}

#[tokio::test]
async fn live_catalog_is_fetched_once_across_recommendations() {
    let catalog = vec![food("Cod, baked", 105.0, 23.0, 78.0)];
    let client = Arc::new(StubClient::new(None, Some(catalog)));
    let engine = engine(client.clone(), 0);
    for _ in 0..5 {
        assert_eq!(engine.generate(&[]).await.food.name, "Cod, baked");
    }
    assert_eq!(client.food_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_generation_is_safe() {
    let catalog = vec![food("Cod, baked", 105.0, 23.0, 78.0)];
    let client = Arc::new(StubClient::new(Some(weather(18.0, "多云")), Some(catalog)));
    let engine = Arc::new(RecommendationEngine::new(
        client.clone(),
        Arc::new(ThreadRandom),
        WeatherRules::default(),
    ));
    let handles: Vec<_> = (0..16)
        .map(|i| {
            let engine = engine.clone();
            tokio::spawn(async move {
                let records = [HealthRecord::new(Some(100.0 + i as f64 * 5.0), None)];
                engine.generate(&records).await
            })
        })
        .collect();
    for handle in handles {
        let rec = handle.await.expect("task");
        assert_eq!(rec.food.name, "Cod, baked");
        assert!(!rec.text.is_empty());
    }
    assert!(engine.food_catalog().cache().is_populated().await);
    assert!(client.food_calls.load(Ordering::SeqCst) >= 1);
}
