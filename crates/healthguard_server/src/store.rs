//! Persistence behind the protocol actions.
//!
//! [`HealthStore`] is the data-access seam; [`MemoryStore`] keeps every table
//! in memory behind one lock so each operation is atomic on its own.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domains::care::{NewDietRecord, NewGoal, NewMedication, NewReminder};
use crate::domains::records::NewRecord;
use crate::domains::timestamp_now;
use crate::domains::users::{NewUser, ProfileUpdate};
use crate::error::{ServerError, ServerResult};
use crate::types::{
    DietRecord, Goal, GoalStatus, Medication, Notification, Reminder, Role, StoredRecord,
    SystemStats, User, UserSummary,
};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "123456";
/// Undated diet queries return at most this many rows.
pub const DIET_HISTORY_LIMIT: usize = 50;

#[async_trait]
pub trait HealthStore: Send + Sync + 'static {
    // === Users ===

    /// Fails with `Conflict` when the username is taken.
    async fn create_user(&self, user: NewUser) -> ServerResult<i64>;
    async fn find_user_by_credentials(
        &self,
        username: &str,
        password_hash: &str,
    ) -> ServerResult<Option<User>>;
    async fn find_user_id(&self, username: &str) -> ServerResult<Option<i64>>;
    async fn get_user(&self, user_id: i64) -> ServerResult<Option<User>>;
    async fn update_profile(&self, user_id: i64, update: &ProfileUpdate) -> ServerResult<()>;
    /// Non-admin accounts, newest first, optionally filtered by a username substring.
    async fn list_users(&self, query: Option<&str>) -> ServerResult<Vec<UserSummary>>;
    /// Removes the account and every row that belongs to it.
    async fn delete_user(&self, user_id: i64) -> ServerResult<()>;

    // === Health records ===

    async fn add_record(&self, record: NewRecord) -> ServerResult<i64>;
    /// Chronological by record date; insertion order breaks ties.
    async fn records_for(&self, user_id: i64) -> ServerResult<Vec<StoredRecord>>;
    async fn clear_records(&self, user_id: i64) -> ServerResult<usize>;
    async fn stats(&self) -> ServerResult<SystemStats>;

    // === Medications, goals, reminders, diet ===

    async fn add_medication(&self, medication: NewMedication) -> ServerResult<i64>;
    /// Newest start date first.
    async fn medications_for(&self, user_id: i64) -> ServerResult<Vec<Medication>>;
    async fn delete_medication(&self, med_id: i64) -> ServerResult<()>;
    async fn add_goal(&self, goal: NewGoal) -> ServerResult<i64>;
    /// Active goals, newest start date first.
    async fn goals_for(&self, user_id: i64) -> ServerResult<Vec<Goal>>;
    async fn update_goal_progress(&self, goal_id: i64, current_value: f64) -> ServerResult<()>;
    async fn add_reminder(&self, reminder: NewReminder) -> ServerResult<i64>;
    /// Active reminders ordered by time.
    async fn reminders_for(&self, user_id: i64) -> ServerResult<Vec<Reminder>>;
    async fn add_diet_record(&self, record: NewDietRecord) -> ServerResult<i64>;
    /// With a date: that day's rows, newest first. Without: the most recent
    /// [`DIET_HISTORY_LIMIT`] rows by date.
    async fn diet_records_for(
        &self,
        user_id: i64,
        date: Option<&str>,
    ) -> ServerResult<Vec<DietRecord>>;

    // === Notifications ===

    async fn add_notification(&self, user_id: i64, message: &str) -> ServerResult<i64>;
    /// Newest first.
    async fn notifications_for(
        &self,
        user_id: i64,
        only_unread: bool,
    ) -> ServerResult<Vec<Notification>>;
    async fn mark_notification_read(&self, notif_id: i64) -> ServerResult<()>;
}

#[derive(Debug, Default)]
struct Sequences {
    users: i64,
    records: i64,
    medications: i64,
    goals: i64,
    reminders: i64,
    diet: i64,
    notifications: i64,
}

fn next_id(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

#[derive(Debug, Default)]
struct Tables {
    seq: Sequences,
    users: Vec<User>,
    records: Vec<StoredRecord>,
    medications: Vec<Medication>,
    goals: Vec<Goal>,
    reminders: Vec<Reminder>,
    diet: Vec<DietRecord>,
    notifications: Vec<Notification>,
}

impl Tables {
    fn require_user(&self, user_id: i64) -> ServerResult<()> {
        if self.users.iter().any(|u| u.id == user_id) {
            Ok(())
        } else {
            Err(ServerError::NotFound(format!("user {user_id}")))
        }
    }
}

#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// A fresh store holding only the default administrator account.
    pub fn new() -> Self {
        let mut tables = Tables::default();
        let admin = NewUser::new(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD, Role::Admin);
        insert_user(&mut tables, admin);
        Self {
            tables: RwLock::new(tables),
        }
    }
}

fn insert_user(tables: &mut Tables, user: NewUser) -> i64 {
    let id = next_id(&mut tables.seq.users);
    tables.users.push(User {
        id,
        username: user.username,
        password_hash: user.password_hash,
        role: user.role,
        age: user.age,
        gender: user.gender,
        height: None,
        blood_type: None,
        emergency_contact: None,
        allergies: None,
        chronic_diseases: None,
        created_at: timestamp_now(),
    });
    id
}

#[async_trait]
impl HealthStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> ServerResult<i64> {
        let mut t = self.tables.write().await;
        if t.users.iter().any(|u| u.username == user.username) {
            return Err(ServerError::Conflict(format!(
                "username {} already exists",
                user.username
            )));
        }
        Ok(insert_user(&mut t, user))
    }

    async fn find_user_by_credentials(
        &self,
        username: &str,
        password_hash: &str,
    ) -> ServerResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users
            .iter()
            .find(|u| u.username == username && u.password_hash == password_hash)
            .cloned())
    }

    async fn find_user_id(&self, username: &str) -> ServerResult<Option<i64>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.username == username).map(|u| u.id))
    }

    async fn get_user(&self, user_id: i64) -> ServerResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn update_profile(&self, user_id: i64, update: &ProfileUpdate) -> ServerResult<()> {
        let mut t = self.tables.write().await;
        let user = t
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| ServerError::NotFound(format!("user {user_id}")))?;
        update.apply(user);
        Ok(())
    }

    async fn list_users(&self, query: Option<&str>) -> ServerResult<Vec<UserSummary>> {
        let t = self.tables.read().await;
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        let mut users: Vec<UserSummary> = t
            .users
            .iter()
            .filter(|u| u.role != Role::Admin)
            .filter(|u| query.is_none_or(|q| u.username.contains(q)))
            .map(UserSummary::from)
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(users)
    }

    async fn delete_user(&self, user_id: i64) -> ServerResult<()> {
        let mut t = self.tables.write().await;
        t.require_user(user_id)?;
        t.records.retain(|r| r.user_id != user_id);
        t.medications.retain(|m| m.user_id != user_id);
        t.goals.retain(|g| g.user_id != user_id);
        t.reminders.retain(|r| r.user_id != user_id);
        t.diet.retain(|d| d.user_id != user_id);
        t.notifications.retain(|n| n.user_id != user_id);
        t.users.retain(|u| u.id != user_id);
        Ok(())
    }

    async fn add_record(&self, record: NewRecord) -> ServerResult<i64> {
        let mut t = self.tables.write().await;
        t.require_user(record.user_id)?;
        let id = next_id(&mut t.seq.records);
        t.records.push(record.into_stored(id));
        Ok(id)
    }

    async fn records_for(&self, user_id: i64) -> ServerResult<Vec<StoredRecord>> {
        let t = self.tables.read().await;
        let mut records: Vec<StoredRecord> = t
            .records
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        // stable sort keeps insertion order for equal dates
        records.sort_by(|a, b| a.record_date.cmp(&b.record_date));
        Ok(records)
    }

    async fn clear_records(&self, user_id: i64) -> ServerResult<usize> {
        let mut t = self.tables.write().await;
        let before = t.records.len();
        t.records.retain(|r| r.user_id != user_id);
        Ok(before - t.records.len())
    }

    async fn stats(&self) -> ServerResult<SystemStats> {
        let t = self.tables.read().await;
        let weights: Vec<f64> = t.records.iter().filter_map(|r| r.weight).collect();
        let avg_weight = if weights.is_empty() {
            0.0
        } else {
            let mean = weights.iter().sum::<f64>() / weights.len() as f64;
            (mean * 100.0).round() / 100.0
        };
        Ok(SystemStats {
            user_count: t.users.iter().filter(|u| u.role == Role::User).count(),
            avg_weight,
            total_records: t.records.len(),
        })
    }

    async fn add_medication(&self, m: NewMedication) -> ServerResult<i64> {
        let mut t = self.tables.write().await;
        t.require_user(m.user_id)?;
        let id = next_id(&mut t.seq.medications);
        t.medications.push(Medication {
            id,
            user_id: m.user_id,
            medicine_name: m.medicine_name,
            dosage: m.dosage,
            frequency: m.frequency,
            start_date: m.start_date,
            end_date: m.end_date,
            notes: m.notes,
        });
        Ok(id)
    }

    async fn medications_for(&self, user_id: i64) -> ServerResult<Vec<Medication>> {
        let t = self.tables.read().await;
        let mut meds: Vec<Medication> = t
            .medications
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        meds.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(meds)
    }

    async fn delete_medication(&self, med_id: i64) -> ServerResult<()> {
        let mut t = self.tables.write().await;
        let before = t.medications.len();
        t.medications.retain(|m| m.id != med_id);
        if t.medications.len() == before {
            return Err(ServerError::NotFound(format!("medication {med_id}")));
        }
        Ok(())
    }

    async fn add_goal(&self, g: NewGoal) -> ServerResult<i64> {
        let mut t = self.tables.write().await;
        t.require_user(g.user_id)?;
        let id = next_id(&mut t.seq.goals);
        t.goals.push(Goal {
            id,
            user_id: g.user_id,
            goal_type: g.goal_type,
            target_value: g.target_value,
            current_value: g.current_value,
            start_date: g.start_date,
            end_date: g.end_date,
            status: GoalStatus::Active,
        });
        Ok(id)
    }

    async fn goals_for(&self, user_id: i64) -> ServerResult<Vec<Goal>> {
        let t = self.tables.read().await;
        let mut goals: Vec<Goal> = t
            .goals
            .iter()
            .filter(|g| g.user_id == user_id && g.status == GoalStatus::Active)
            .cloned()
            .collect();
        goals.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(goals)
    }

    async fn update_goal_progress(&self, goal_id: i64, current_value: f64) -> ServerResult<()> {
        let mut t = self.tables.write().await;
        let goal = t
            .goals
            .iter_mut()
            .find(|g| g.id == goal_id)
            .ok_or_else(|| ServerError::NotFound(format!("goal {goal_id}")))?;
        goal.current_value = current_value;
        Ok(())
    }

    async fn add_reminder(&self, r: NewReminder) -> ServerResult<i64> {
        let mut t = self.tables.write().await;
        t.require_user(r.user_id)?;
        let id = next_id(&mut t.seq.reminders);
        t.reminders.push(Reminder {
            id,
            user_id: r.user_id,
            reminder_type: r.reminder_type,
            title: r.title,
            reminder_time: r.reminder_time,
            repeat_type: r.repeat_type,
            is_active: true,
        });
        Ok(id)
    }

    async fn reminders_for(&self, user_id: i64) -> ServerResult<Vec<Reminder>> {
        let t = self.tables.read().await;
        let mut reminders: Vec<Reminder> = t
            .reminders
            .iter()
            .filter(|r| r.user_id == user_id && r.is_active)
            .cloned()
            .collect();
        reminders.sort_by(|a, b| a.reminder_time.cmp(&b.reminder_time));
        Ok(reminders)
    }

    async fn add_diet_record(&self, d: NewDietRecord) -> ServerResult<i64> {
        let mut t = self.tables.write().await;
        t.require_user(d.user_id)?;
        let id = next_id(&mut t.seq.diet);
        t.diet.push(DietRecord {
            id,
            user_id: d.user_id,
            record_date: d.record_date,
            meal_type: d.meal_type,
            food_description: d.food_description,
            calories: d.calories,
        });
        Ok(id)
    }

    async fn diet_records_for(
        &self,
        user_id: i64,
        date: Option<&str>,
    ) -> ServerResult<Vec<DietRecord>> {
        let t = self.tables.read().await;
        let mine = t.diet.iter().filter(|d| d.user_id == user_id);
        let rows = match date {
            Some(date) => {
                let mut rows: Vec<DietRecord> =
                    mine.filter(|d| d.record_date == date).cloned().collect();
                rows.sort_by(|a, b| b.id.cmp(&a.id));
                rows
            }
            None => {
                let mut rows: Vec<DietRecord> = mine.cloned().collect();
                rows.sort_by(|a, b| b.record_date.cmp(&a.record_date).then(b.id.cmp(&a.id)));
                rows.truncate(DIET_HISTORY_LIMIT);
                rows
            }
        };
        Ok(rows)
    }

    async fn add_notification(&self, user_id: i64, message: &str) -> ServerResult<i64> {
        let mut t = self.tables.write().await;
        t.require_user(user_id)?;
        let id = next_id(&mut t.seq.notifications);
        t.notifications.push(Notification {
            id,
            user_id,
            message: message.to_string(),
            is_read: false,
            created_at: timestamp_now(),
        });
        Ok(id)
    }

    async fn notifications_for(
        &self,
        user_id: i64,
        only_unread: bool,
    ) -> ServerResult<Vec<Notification>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Notification> = t
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !(only_unread && n.is_read))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows)
    }

    async fn mark_notification_read(&self, notif_id: i64) -> ServerResult<()> {
        let mut t = self.tables.write().await;
        let n = t
            .notifications
            .iter_mut()
            .find(|n| n.id == notif_id)
            .ok_or_else(|| ServerError::NotFound(format!("notification {notif_id}")))?;
        n.is_read = true;
        Ok(())
    }
}
