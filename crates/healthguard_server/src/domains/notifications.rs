use serde::Deserialize;

use super::require_text;
use crate::error::ServerResult;

#[derive(Debug, Deserialize)]
pub struct SendNotificationPayload {
    pub user_id: i64,
    pub message: String,
}

impl SendNotificationPayload {
    pub fn validated(mut self) -> ServerResult<Self> {
        self.message = require_text("message", &self.message)?;
        Ok(self)
    }
}

fn default_only_unread() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    pub user_id: i64,
    #[serde(default = "default_only_unread")]
    pub only_unread: bool,
}

#[derive(Debug, Deserialize)]
pub struct NotificationIdPayload {
    pub notif_id: i64,
}
