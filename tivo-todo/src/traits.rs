use crate::types::{Result, RunDates, ScheduleEndpoint, ShowSubscription};
use async_trait::async_trait;
use chrono::NaiveDate;
use lettre::Message;
use serde_json::Value;

/// The home recorder's scheduled-recordings list.
#[async_trait]
pub trait RecordingSource: Send + Sync {
    /// Human-readable name for this source
    fn source_name(&self) -> String;

    /// Raw recording records scheduled to start within the two run days.
    async fn scheduled_recordings(&self, dates: &RunDates) -> Result<Vec<Value>>;
}

/// The internet TV-schedule service.
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    fn source_name(&self) -> String;

    /// Raw broadcast records airing on `date`, as one endpoint shape returns them.
    async fn schedule(&self, endpoint: ScheduleEndpoint, date: NaiveDate) -> Result<Vec<Value>>;
}

/// Supplies the set of subscribed schedule-service shows.
#[async_trait]
pub trait SubscriptionSource: Send + Sync {
    async fn subscription(&self) -> Result<ShowSubscription>;
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: Message) -> Result<()>;
}
