use std::sync::Arc;

use tokio::sync::RwLock;

use crate::observability::{DataSource, FOOD_CATALOG_REQUESTS, record_source};
use crate::{AdvisorClient, FoodItem};

/// Local dishes (per 100 g) served when the nutrition service is unavailable.
pub fn fallback_catalog() -> Vec<FoodItem> {
    const DISHES: [(&str, f64, f64, f64); 8] = [
        ("Steamed shrimp", 85.0, 18.0, 120.0),
        ("Braised pork belly", 470.0, 10.0, 900.0),
        ("Poached chicken breast", 133.0, 31.0, 60.0),
        ("Salted fish and eggplant pot", 180.0, 4.0, 650.0),
        ("Quinoa salad", 120.0, 4.4, 30.0),
        ("Spicy hot pot", 800.0, 15.0, 2500.0),
        ("Pan-fried salmon", 208.0, 20.0, 50.0),
        ("Century egg and pork congee", 150.0, 8.0, 400.0),
    ];
    DISHES
        .iter()
        .map(|&(name, calories, protein, sodium)| FoodItem {
            name: name.to_string(),
            calories_per_100g: calories,
            protein_per_100g: protein,
            sodium_mg_per_100g: sodium,
        })
        .collect()
}

/// Process-lifetime holder for the first successfully fetched catalog.
///
/// Once populated it is never replaced or invalidated.
#[derive(Debug, Default)]
pub struct FoodCache {
    items: RwLock<Option<Arc<Vec<FoodItem>>>>,
}

impl FoodCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_populated(&self) -> bool {
        self.items.read().await.is_some()
    }

    pub async fn get(&self) -> Option<Arc<Vec<FoodItem>>> {
        self.items.read().await.clone()
    }

    /// Store `items` unless another caller got there first; returns whatever
    /// the cache holds afterwards.
    pub async fn populate(&self, items: Vec<FoodItem>) -> Arc<Vec<FoodItem>> {
        let mut guard = self.items.write().await;
        guard.get_or_insert_with(|| Arc::new(items)).clone()
    }
}

/// Food catalog with at most one successful live fetch per provider.
///
/// Failed fetches are not cached: the next call tries the service again and
/// gets the local fallback catalog meanwhile.
pub struct FoodCatalogProvider {
    client: Arc<dyn AdvisorClient>,
    cache: FoodCache,
}

impl FoodCatalogProvider {
    pub fn new(client: Arc<dyn AdvisorClient>) -> Self {
        Self {
            client,
            cache: FoodCache::new(),
        }
    }

    pub fn cache(&self) -> &FoodCache {
        &self.cache
    }

    pub async fn get_food_catalog(&self) -> Vec<FoodItem> {
        if let Some(items) = self.cache.get().await {
            record_source(FOOD_CATALOG_REQUESTS, DataSource::Cache);
            return items.as_ref().clone();
        }

        match self.client.fetch_foods().await {
            Ok(items) if !items.is_empty() => {
                record_source(FOOD_CATALOG_REQUESTS, DataSource::Live);
                tracing::debug!(count = items.len(), "food catalog fetched and cached");
                self.cache.populate(items).await.as_ref().clone()
            }
            Ok(_) => {
                record_source(FOOD_CATALOG_REQUESTS, DataSource::Fallback);
                tracing::warn!("food search returned nothing usable, using local catalog");
                fallback_catalog()
            }
            Err(e) => {
                record_source(FOOD_CATALOG_REQUESTS, DataSource::Fallback);
                tracing::warn!(error = %e, "food search failed, using local catalog");
                fallback_catalog()
            }
        }
    }
}
