use serde::Deserialize;

use super::require_date;
use crate::error::{ServerError, ServerResult};
use crate::types::StoredRecord;

/// One day's measurements as sent by the client forms. The blood-pressure
/// fields also accept the column names used by stored records.
#[derive(Clone, Debug, Deserialize)]
pub struct NewRecord {
    pub user_id: i64,
    #[serde(alias = "record_date")]
    pub date: String,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default, alias = "systolic_bp")]
    pub sys_bp: Option<i64>,
    #[serde(default, alias = "diastolic_bp")]
    pub dia_bp: Option<i64>,
    #[serde(default)]
    pub steps: Option<i64>,
    #[serde(default)]
    pub heart_rate: Option<i64>,
    #[serde(default)]
    pub blood_sugar: Option<f64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub sleep_hours: Option<f64>,
    #[serde(default)]
    pub water_intake: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewRecord {
    pub fn validated(mut self) -> ServerResult<Self> {
        self.date = require_date("date", &self.date)?;
        for (name, value) in [
            ("sys_bp", self.sys_bp),
            ("dia_bp", self.dia_bp),
            ("heart_rate", self.heart_rate),
        ] {
            if value.is_some_and(|v| v <= 0) {
                return Err(ServerError::Validation(format!("{name} must be positive")));
            }
        }
        if self.weight.is_some_and(|w| w <= 0.0) {
            return Err(ServerError::Validation("weight must be positive".into()));
        }
        if self.steps.is_some_and(|s| s < 0) {
            return Err(ServerError::Validation("steps must not be negative".into()));
        }
        self.notes = self.notes.filter(|n| !n.trim().is_empty());
        Ok(self)
    }

    pub fn into_stored(self, id: i64) -> StoredRecord {
        StoredRecord {
            id,
            user_id: self.user_id,
            record_date: self.date,
            weight: self.weight,
            systolic_bp: self.sys_bp,
            diastolic_bp: self.dia_bp,
            steps: self.steps,
            heart_rate: self.heart_rate,
            blood_sugar: self.blood_sugar,
            temperature: self.temperature,
            sleep_hours: self.sleep_hours,
            water_intake: self.water_intake,
            notes: self.notes,
        }
    }
}
