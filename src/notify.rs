//! Push notifications for task reminders and approaching deadlines.

use crate::error::Error;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PushNotification {
    pub external_user_ids: Vec<String>,
    pub heading: String,
    pub contents: String,
}

impl PushNotification {
    pub fn task_reminder(user_id: &str, task_title: &str, project_name: &str) -> Self {
        PushNotification {
            external_user_ids: vec![user_id.to_string()],
            heading: "Rappel de tâche".to_string(),
            contents: format!("Tâche à faire : {} ({})", task_title, project_name),
        }
    }

    pub fn deadline_approaching(user_id: &str, task_title: &str, days_left: i64) -> Self {
        let plural = if days_left > 1 { "s" } else { "" };
        PushNotification {
            external_user_ids: vec![user_id.to_string()],
            heading: "Deadline proche".to_string(),
            contents: format!(
                "La tâche \"{}\" arrive à échéance dans {} jour{}.",
                task_title, days_left, plural
            ),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushService: Send + Sync {
    async fn dispatch(&self, notification: &PushNotification) -> Result<(), Error>;
}

/// Whole calendar days from `today` to the deadline's day in `tz`.
pub fn days_left<Tz: TimeZone>(deadline: &DateTime<Utc>, today: NaiveDate, tz: &Tz) -> i64 {
    (deadline.with_timezone(tz).date_naive() - today).num_days()
}

/// Fire-and-forget: a failed dispatch is logged and dropped.
pub async fn notify(push: &dyn PushService, notification: PushNotification) {
    match push.dispatch(&notification).await {
        Ok(()) => debug!(heading = %notification.heading, "notification dispatched"),
        Err(err) => warn!(
            heading = %notification.heading,
            error = %err,
            "Erreur lors de l'envoi de la notification"
        ),
    }
}
