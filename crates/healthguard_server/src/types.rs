//! Rows held by the store and returned to clients as JSON objects.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub blood_type: Option<String>,
    pub emergency_contact: Option<String>,
    pub allergies: Option<String>,
    pub chronic_diseases: Option<String>,
    pub created_at: String,
}

/// What a successful login hands back.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub created_at: String,
}

impl From<&User> for UserSummary {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            role: u.role,
            age: u.age,
            gender: u.gender.clone(),
            created_at: u.created_at.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StoredRecord {
    pub id: i64,
    pub user_id: i64,
    pub record_date: String,
    pub weight: Option<f64>,
    pub systolic_bp: Option<i64>,
    pub diastolic_bp: Option<i64>,
    pub steps: Option<i64>,
    pub heart_rate: Option<i64>,
    pub blood_sugar: Option<f64>,
    pub temperature: Option<f64>,
    pub sleep_hours: Option<f64>,
    pub water_intake: Option<i64>,
    pub notes: Option<String>,
}

impl From<&StoredRecord> for healthguard_advisor::HealthRecord {
    fn from(r: &StoredRecord) -> Self {
        healthguard_advisor::HealthRecord::new(
            r.systolic_bp.map(|v| v as f64),
            r.diastolic_bp.map(|v| v as f64),
        )
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Medication {
    pub id: i64,
    pub user_id: i64,
    pub medicine_name: String,
    pub dosage: String,
    pub frequency: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Active,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Goal {
    pub id: i64,
    pub user_id: i64,
    pub goal_type: String,
    pub target_value: f64,
    pub current_value: f64,
    pub start_date: String,
    pub end_date: String,
    pub status: GoalStatus,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Reminder {
    pub id: i64,
    pub user_id: i64,
    pub reminder_type: String,
    pub title: String,
    pub reminder_time: String,
    pub repeat_type: String,
    pub is_active: bool,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DietRecord {
    pub id: i64,
    pub user_id: i64,
    pub record_date: String,
    pub meal_type: String,
    pub food_description: String,
    pub calories: i64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub message: String,
    pub is_read: bool,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SystemStats {
    /// Accounts with the `user` role.
    pub user_count: usize,
    /// Mean over records with a weight, two decimals; 0 when there are none.
    pub avg_weight: f64,
    pub total_records: usize,
}
