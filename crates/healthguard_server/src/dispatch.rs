//! Routes protocol requests to the store and the recommendation engine.

use std::sync::Arc;

use healthguard_advisor::{HealthRecord, RecommendationEngine};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use serde_json::{Value, json};

use crate::domains::care::{
    DietQuery, GoalProgressPayload, MedicationIdPayload, NewDietRecord, NewGoal, NewMedication,
    NewReminder,
};
use crate::domains::notifications::{
    NotificationIdPayload, NotificationQuery, SendNotificationPayload,
};
use crate::domains::parse_payload;
use crate::domains::records::NewRecord;
use crate::domains::users::{
    ListUsersPayload, LoginPayload, RegisterPayload, UpdateProfilePayload, UserIdPayload,
    hash_password,
};
use crate::error::{ServerError, ServerResult};
use crate::protocol::{Request, Response};
use crate::store::HealthStore;
use crate::types::Session;

pub const REQUESTS_METRIC: &str = "server_requests_total";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Register,
    Login,
    AddRecord,
    GetRecords,
    GetSysStats,
    UpdateProfile,
    GetProfile,
    AddMedication,
    GetMedications,
    DeleteMedication,
    AddGoal,
    GetGoals,
    UpdateGoalProgress,
    AddReminder,
    GetReminders,
    AddDiet,
    GetDietRecords,
    ListUsers,
    DeleteUser,
    SendNotification,
    GetNotifications,
    MarkNotificationRead,
    GetRecommendation,
    Metrics,
}

impl Action {
    pub const ALL: [Action; 24] = [
        Action::Register,
        Action::Login,
        Action::AddRecord,
        Action::GetRecords,
        Action::GetSysStats,
        Action::UpdateProfile,
        Action::GetProfile,
        Action::AddMedication,
        Action::GetMedications,
        Action::DeleteMedication,
        Action::AddGoal,
        Action::GetGoals,
        Action::UpdateGoalProgress,
        Action::AddReminder,
        Action::GetReminders,
        Action::AddDiet,
        Action::GetDietRecords,
        Action::ListUsers,
        Action::DeleteUser,
        Action::SendNotification,
        Action::GetNotifications,
        Action::MarkNotificationRead,
        Action::GetRecommendation,
        Action::Metrics,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Register => "register",
            Action::Login => "login",
            Action::AddRecord => "add_record",
            Action::GetRecords => "get_records",
            Action::GetSysStats => "get_sys_stats",
            Action::UpdateProfile => "update_profile",
            Action::GetProfile => "get_profile",
            Action::AddMedication => "add_medication",
            Action::GetMedications => "get_medications",
            Action::DeleteMedication => "delete_medication",
            Action::AddGoal => "add_goal",
            Action::GetGoals => "get_goals",
            Action::UpdateGoalProgress => "update_goal_progress",
            Action::AddReminder => "add_reminder",
            Action::GetReminders => "get_reminders",
            Action::AddDiet => "add_diet",
            Action::GetDietRecords => "get_diet_records",
            Action::ListUsers => "list_users",
            Action::DeleteUser => "delete_user",
            Action::SendNotification => "send_notification",
            Action::GetNotifications => "get_notifications",
            Action::MarkNotificationRead => "mark_notification_read",
            Action::GetRecommendation => "get_recommendation",
            Action::Metrics => "metrics",
        }
    }
}

/// What a handler hands back before it is wrapped in a [`Response`].
enum Reply {
    Data(Value),
    Message(&'static str),
}

fn data<T: Serialize>(value: &T) -> ServerResult<Reply> {
    Ok(Reply::Data(serde_json::to_value(value)?))
}

pub struct Dispatcher {
    store: Arc<dyn HealthStore>,
    engine: Arc<RecommendationEngine>,
    metrics: Option<PrometheusHandle>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn HealthStore>, engine: Arc<RecommendationEngine>) -> Self {
        Self {
            store,
            engine,
            metrics: None,
        }
    }

    /// Serve the exposition text of this recorder from the `metrics` action.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn store(&self) -> &Arc<dyn HealthStore> {
        &self.store
    }

    pub async fn handle(&self, request: Request) -> Response {
        let Some(action) = Action::parse(&request.action) else {
            metrics::counter!(REQUESTS_METRIC, "action" => "unknown").increment(1);
            tracing::debug!(action = %request.action, "unknown action");
            return Response::error("Unknown action");
        };
        metrics::counter!(REQUESTS_METRIC, "action" => action.as_str()).increment(1);

        match self.route(action, request.payload).await {
            Ok(Reply::Data(value)) => Response::ok(value),
            Ok(Reply::Message(text)) => Response::ok_message(text),
            Err(e) => {
                tracing::warn!(action = action.as_str(), error = %e, "request failed");
                Response::error(e.to_string())
            }
        }
    }

    async fn route(&self, action: Action, payload: Value) -> ServerResult<Reply> {
        let store = self.store.as_ref();
        match action {
            Action::Register => {
                let user = parse_payload::<RegisterPayload>(payload)?.validated()?;
                let id = store.create_user(user).await?;
                tracing::info!(user_id = id, "registered user");
                Ok(Reply::Message("Registration successful"))
            }
            Action::Login => {
                let p: LoginPayload = parse_payload(payload)?;
                let user = store
                    .find_user_by_credentials(p.username.trim(), &hash_password(&p.password))
                    .await?
                    .ok_or_else(|| ServerError::Unauthorized("wrong username or password".into()))?;
                data(&Session {
                    id: user.id,
                    username: user.username,
                    role: user.role,
                })
            }
            Action::AddRecord => {
                let record = parse_payload::<NewRecord>(payload)?.validated()?;
                store.add_record(record).await?;
                Ok(Reply::Message("Record saved"))
            }
            Action::GetRecords => {
                let p: UserIdPayload = parse_payload(payload)?;
                data(&store.records_for(p.user_id).await?)
            }
            Action::GetSysStats => data(&store.stats().await?),
            Action::UpdateProfile => {
                let p: UpdateProfilePayload = parse_payload(payload)?;
                if p.profile_data.is_empty() {
                    return Err(ServerError::Validation("no profile fields to update".into()));
                }
                store.update_profile(p.user_id, &p.profile_data).await?;
                Ok(Reply::Message("Profile updated"))
            }
            Action::GetProfile => {
                let p: UserIdPayload = parse_payload(payload)?;
                data(&store.get_user(p.user_id).await?)
            }
            Action::AddMedication => {
                let m = parse_payload::<NewMedication>(payload)?.validated()?;
                store.add_medication(m).await?;
                Ok(Reply::Message("Medication added"))
            }
            Action::GetMedications => {
                let p: UserIdPayload = parse_payload(payload)?;
                data(&store.medications_for(p.user_id).await?)
            }
            Action::DeleteMedication => {
                let p: MedicationIdPayload = parse_payload(payload)?;
                store.delete_medication(p.med_id).await?;
                Ok(Reply::Message("Medication deleted"))
            }
            Action::AddGoal => {
                let g = parse_payload::<NewGoal>(payload)?.validated()?;
                store.add_goal(g).await?;
                Ok(Reply::Message("Goal added"))
            }
            Action::GetGoals => {
                let p: UserIdPayload = parse_payload(payload)?;
                data(&store.goals_for(p.user_id).await?)
            }
            Action::UpdateGoalProgress => {
                let p: GoalProgressPayload = parse_payload(payload)?;
                store.update_goal_progress(p.goal_id, p.current_value).await?;
                Ok(Reply::Message("Goal progress updated"))
            }
            Action::AddReminder => {
                let r = parse_payload::<NewReminder>(payload)?.validated()?;
                store.add_reminder(r).await?;
                Ok(Reply::Message("Reminder added"))
            }
            Action::GetReminders => {
                let p: UserIdPayload = parse_payload(payload)?;
                data(&store.reminders_for(p.user_id).await?)
            }
            Action::AddDiet => {
                let d = parse_payload::<NewDietRecord>(payload)?.validated()?;
                store.add_diet_record(d).await?;
                Ok(Reply::Message("Diet record added"))
            }
            Action::GetDietRecords => {
                let q: DietQuery = parse_payload(payload)?;
                let date = q.date_filter()?;
                data(&store.diet_records_for(q.user_id, date.as_deref()).await?)
            }
            Action::ListUsers => {
                let p: ListUsersPayload = parse_payload(payload)?;
                data(&store.list_users(p.query.as_deref()).await?)
            }
            Action::DeleteUser => {
                let p: UserIdPayload = parse_payload(payload)?;
                store.delete_user(p.user_id).await?;
                tracing::info!(user_id = p.user_id, "deleted user");
                Ok(Reply::Message("User deleted"))
            }
            Action::SendNotification => {
                let p = parse_payload::<SendNotificationPayload>(payload)?.validated()?;
                store.add_notification(p.user_id, &p.message).await?;
                Ok(Reply::Message("Notification sent"))
            }
            Action::GetNotifications => {
                let q: NotificationQuery = parse_payload(payload)?;
                data(&store.notifications_for(q.user_id, q.only_unread).await?)
            }
            Action::MarkNotificationRead => {
                let p: NotificationIdPayload = parse_payload(payload)?;
                store.mark_notification_read(p.notif_id).await?;
                Ok(Reply::Message("Notification marked as read"))
            }
            Action::GetRecommendation => {
                let p: UserIdPayload = parse_payload(payload)?;
                let records: Vec<HealthRecord> = store
                    .records_for(p.user_id)
                    .await?
                    .iter()
                    .map(HealthRecord::from)
                    .collect();
                let recommendation = self.engine.generate(&records).await;
                Ok(Reply::Data(recommendation.to_payload()))
            }
            Action::Metrics => {
                let handle = self
                    .metrics
                    .as_ref()
                    .ok_or_else(|| ServerError::Internal("metrics recorder not installed".into()))?;
                Ok(Reply::Data(json!(handle.render())))
            }
        }
    }
}
