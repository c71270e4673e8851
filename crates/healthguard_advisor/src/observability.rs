//! Counters describing where recommendation inputs came from.
//!
//! Without an installed `metrics` recorder these are no-ops.

pub const WEATHER_REQUESTS: &str = "advisor_weather_requests_total";
pub const FOOD_CATALOG_REQUESTS: &str = "advisor_food_catalog_requests_total";
pub const RECOMMENDATIONS: &str = "advisor_recommendations_total";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataSource {
    Live,
    Cache,
    Fallback,
}

impl DataSource {
    pub fn as_str(self) -> &'static str {
        match self {
            DataSource::Live => "live",
            DataSource::Cache => "cache",
            DataSource::Fallback => "fallback",
        }
    }
}

pub(crate) fn record_source(metric: &'static str, source: DataSource) {
    metrics::counter!(metric, "source" => source.as_str()).increment(1);
}

pub(crate) fn record_recommendation(bp_high: bool, indoor: bool) {
    metrics::counter!(
        RECOMMENDATIONS,
        "bp" => if bp_high { "high" } else { "normal" },
        "exercise" => if indoor { "indoor" } else { "outdoor" }
    )
    .increment(1);
}
