use serde::Deserialize;

use super::{require_date, require_text};
use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, Deserialize)]
pub struct NewMedication {
    pub user_id: i64,
    pub medicine_name: String,
    pub dosage: String,
    pub frequency: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewMedication {
    pub fn validated(mut self) -> ServerResult<Self> {
        self.medicine_name = require_text("medicine_name", &self.medicine_name)?;
        self.start_date = require_date("start_date", &self.start_date)?;
        self.end_date = match self.end_date.take().as_deref().map(str::trim) {
            None | Some("") => None,
            Some(end) => {
                let end = require_date("end_date", end)?;
                if end < self.start_date {
                    return Err(ServerError::Validation(
                        "end_date must not precede start_date".into(),
                    ));
                }
                Some(end)
            }
        };
        Ok(self)
    }
}

#[derive(Debug, Deserialize)]
pub struct MedicationIdPayload {
    pub med_id: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewGoal {
    pub user_id: i64,
    pub goal_type: String,
    pub target_value: f64,
    pub current_value: f64,
    pub start_date: String,
    pub end_date: String,
}

impl NewGoal {
    pub fn validated(mut self) -> ServerResult<Self> {
        self.goal_type = require_text("goal_type", &self.goal_type)?;
        self.start_date = require_date("start_date", &self.start_date)?;
        self.end_date = require_date("end_date", &self.end_date)?;
        if self.end_date < self.start_date {
            return Err(ServerError::Validation(
                "end_date must not precede start_date".into(),
            ));
        }
        Ok(self)
    }
}

#[derive(Debug, Deserialize)]
pub struct GoalProgressPayload {
    pub goal_id: i64,
    pub current_value: f64,
}

fn default_repeat() -> String {
    "once".to_string()
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewReminder {
    pub user_id: i64,
    pub reminder_type: String,
    pub title: String,
    pub reminder_time: String,
    #[serde(default = "default_repeat")]
    pub repeat_type: String,
}

impl NewReminder {
    pub fn validated(mut self) -> ServerResult<Self> {
        self.title = require_text("title", &self.title)?;
        self.reminder_time = require_text("reminder_time", &self.reminder_time)?;
        if self.repeat_type.trim().is_empty() {
            self.repeat_type = default_repeat();
        }
        Ok(self)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewDietRecord {
    pub user_id: i64,
    pub record_date: String,
    pub meal_type: String,
    pub food_description: String,
    #[serde(default)]
    pub calories: i64,
}

impl NewDietRecord {
    pub fn validated(mut self) -> ServerResult<Self> {
        self.record_date = require_date("record_date", &self.record_date)?;
        self.food_description = require_text("food_description", &self.food_description)?;
        if self.calories < 0 {
            return Err(ServerError::Validation("calories must not be negative".into()));
        }
        Ok(self)
    }
}

#[derive(Debug, Deserialize)]
pub struct DietQuery {
    pub user_id: i64,
    #[serde(default)]
    pub date: Option<String>,
}

impl DietQuery {
    /// The date filter, normalized; blank means no filter.
    pub fn date_filter(&self) -> ServerResult<Option<String>> {
        match self.date.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(d) => require_date("date", d).map(Some),
        }
    }
}
