//! Shared test utilities: an advisor client that never reaches the network and
//! a dispatcher wired to a fresh in-memory store.
#![cfg(test)]

use async_trait::async_trait;
use std::sync::Arc;

use healthguard_advisor::{
    AdvisorClient, AdvisorError, FoodItem, RecommendationEngine, ScriptedRandom, WeatherRules,
    WeatherSnapshot,
};

use crate::dispatch::Dispatcher;
use crate::store::MemoryStore;

/// Fails every live call so the engine runs on fallback data.
pub struct OfflineClient;

#[async_trait]
impl AdvisorClient for OfflineClient {
    async fn fetch_weather(&self) -> Result<WeatherSnapshot, AdvisorError> {
        Err(AdvisorError::Payload("offline".into()))
    }

    async fn fetch_foods(&self) -> Result<Vec<FoodItem>, AdvisorError> {
        Err(AdvisorError::Payload("offline".into()))
    }
}

/// Engine on fallback data with every random pick fixed to the first option.
pub fn offline_engine() -> Arc<RecommendationEngine> {
    Arc::new(RecommendationEngine::new(
        Arc::new(OfflineClient),
        Arc::new(ScriptedRandom::always(0)),
        WeatherRules::default(),
    ))
}

pub fn offline_dispatcher() -> Arc<Dispatcher> {
    Arc::new(Dispatcher::new(Arc::new(MemoryStore::new()), offline_engine()))
}
