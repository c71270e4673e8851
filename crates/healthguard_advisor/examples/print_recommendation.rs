use healthguard_advisor::config::AdvisorConfig;
use healthguard_advisor::{HealthRecord, RecommendationEngine};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Reads HEALTHGUARD_* variables; without API keys the fallback data is used.
    let cfg = match AdvisorConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(());
        }
    };
    let engine = RecommendationEngine::from_config(&cfg)?;
    let records = vec![HealthRecord::new(Some(146.0), Some(88.0))];
    let rec = engine.generate(&records).await;
    println!("{}", rec.text);
    println!("{}", serde_json::to_string_pretty(&rec.to_payload())?);
    Ok(())
}
