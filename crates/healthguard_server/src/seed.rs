//! Demo data: one ordinary account with two weeks of plausible measurements.

use chrono::{Days, Local, NaiveDate};
use rand::{RngExt, rng};

use crate::domains::records::NewRecord;
use crate::domains::users::NewUser;
use crate::error::{ServerError, ServerResult};
use crate::store::HealthStore;
use crate::types::Role;

pub const DEMO_USERNAME: &str = "testuser";
pub const DEMO_PASSWORD: &str = "123456";
pub const DEMO_AGE: u32 = 25;
pub const DEMO_DAYS: u64 = 14;
const DEMO_NOTES: &str = "Auto-generated data";

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Build the daily rows ending on `today`, oldest first.
///
/// Kept synchronous: the thread-local RNG must not live across an await.
pub fn demo_records(user_id: i64, today: NaiveDate) -> Vec<NewRecord> {
    let mut rng = rng();
    (0..DEMO_DAYS)
        .filter_map(|i| {
            let date = today.checked_sub_days(Days::new(DEMO_DAYS - 1 - i))?;
            let weight = 70.0 + rng.random_range(-0.5..=0.5) + 0.05 * i as f64;
            Some(NewRecord {
                user_id,
                date: date.format("%Y-%m-%d").to_string(),
                weight: Some(round1(weight)),
                sys_bp: Some(rng.random_range(110..=130)),
                dia_bp: Some(rng.random_range(70..=85)),
                steps: Some(rng.random_range(3000..=12000)),
                heart_rate: Some(rng.random_range(60..=90)),
                blood_sugar: None,
                temperature: None,
                sleep_hours: Some(round1(rng.random_range(6.0..=9.0))),
                water_intake: Some(rng.random_range(1000..=2500)),
                notes: Some(DEMO_NOTES.to_string()),
            })
        })
        .collect()
}

/// Ensure the demo account exists and replace its records with a fresh
/// fortnight ending today. Returns the account id.
pub async fn seed_demo_data(store: &dyn HealthStore) -> ServerResult<i64> {
    let user_id = match store.find_user_id(DEMO_USERNAME).await? {
        Some(id) => id,
        None => {
            let mut user = NewUser::new(DEMO_USERNAME, DEMO_PASSWORD, Role::User);
            user.age = Some(DEMO_AGE);
            store.create_user(user).await?
        }
    };

    let removed = store.clear_records(user_id).await?;
    let rows = demo_records(user_id, Local::now().date_naive());
    if rows.is_empty() {
        return Err(ServerError::Internal("could not compute demo dates".into()));
    }
    let inserted = rows.len();
    for row in rows {
        store.add_record(row.validated()?).await?;
    }
    tracing::info!(user_id, removed, inserted, "seeded demo data");
    Ok(user_id)
}
