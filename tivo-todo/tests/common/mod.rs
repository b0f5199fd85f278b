#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, Once};
use tivo_todo::{
    CanonicalEpisode, DigestError, RecordingSource, Result, RunDates, ScheduleEndpoint, ScheduleSource,
    ShowId, ShowSubscription, SubscriptionSource,
};

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// UTC-4, the zone the end-to-end scenarios are written against.
pub fn zone() -> FixedOffset {
    FixedOffset::west_opt(4 * 3600).unwrap()
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn run_dates(today: &str) -> RunDates {
    RunDates::new(date(today)).unwrap()
}

/// Local time in `zone()`, written `YYYY-MM-DD HH:MM`.
pub fn at(s: &str) -> DateTime<FixedOffset> {
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
    zone().from_local_datetime(&naive).unwrap()
}

pub fn episode(title: &str, subtitle: Option<&str>, start: &str, end: &str) -> CanonicalEpisode {
    CanonicalEpisode {
        title: title.to_string(),
        subtitle: subtitle.map(str::to_string),
        description: None,
        start_time: at(start),
        end_time: at(end),
    }
}

pub fn device_record(title: &str, subtitle: &str, start: &str, end: &str, is_new: bool) -> Value {
    json!({
        "type": "recording",
        "title": title,
        "subtitle": subtitle,
        "requestedStartTime": start,
        "requestedEndTime": end,
        "isNew": is_new,
    })
}

pub fn broadcast_record(show_id: u32, show_name: &str, name: &str, airstamp: &str, runtime: i64) -> Value {
    json!({
        "id": 1574790,
        "name": name,
        "airstamp": airstamp,
        "runtime": runtime,
        "summary": null,
        "show": { "id": show_id, "name": show_name, "summary": null },
    })
}

pub fn web_broadcast_record(show_id: u32, show_name: &str, name: &str, airstamp: &str, runtime: i64) -> Value {
    json!({
        "id": 1574790,
        "name": name,
        "airstamp": airstamp,
        "runtime": runtime,
        "_embedded": {
            "show": { "id": show_id, "name": show_name, "summary": null },
        },
    })
}

/// Shared log of collaborator calls, in the order they happened.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub struct MockRecordings {
    pub records: Vec<Value>,
    pub fail: bool,
    pub calls: CallLog,
}

#[async_trait]
impl RecordingSource for MockRecordings {
    fn source_name(&self) -> String {
        "mock device".to_string()
    }

    async fn scheduled_recordings(&self, _dates: &RunDates) -> Result<Vec<Value>> {
        self.calls.lock().unwrap().push("device".to_string());
        if self.fail {
            return Err(DigestError::collaborator("device", "authentication failed"));
        }
        Ok(self.records.clone())
    }
}

pub struct MockSchedule {
    pub guides: Vec<(ScheduleEndpoint, NaiveDate, Vec<Value>)>,
    pub fail_on: Option<(ScheduleEndpoint, NaiveDate)>,
    pub calls: CallLog,
}

#[async_trait]
impl ScheduleSource for MockSchedule {
    fn source_name(&self) -> String {
        "mock schedule".to_string()
    }

    async fn schedule(&self, endpoint: ScheduleEndpoint, date: NaiveDate) -> Result<Vec<Value>> {
        self.calls.lock().unwrap().push(format!("{} {}", endpoint, date));
        if self.fail_on == Some((endpoint, date)) {
            return Err(DigestError::collaborator("schedule service", "HTTP 503"));
        }
        Ok(self
            .guides
            .iter()
            .filter(|(e, d, _)| *e == endpoint && *d == date)
            .flat_map(|(_, _, records)| records.clone())
            .collect())
    }
}

pub struct MockSubscription {
    pub shows: Vec<u32>,
    pub calls: CallLog,
}

#[async_trait]
impl SubscriptionSource for MockSubscription {
    async fn subscription(&self) -> Result<ShowSubscription> {
        self.calls.lock().unwrap().push("subscription".to_string());
        Ok(self.shows.iter().copied().map(ShowId).collect())
    }
}

pub const CONFIG_JSON: &str = r#"{
    "tivo_ip": "192.168.1.50",
    "tivo_port": 1413,
    "tivo_mak": "1234567890",
    "google_api_key": "api-key",
    "google_tvmaze_sheet_id": "sheet123",
    "smtp_name": "Digest Bot",
    "smtp_user": "bot@example.com",
    "smtp_password": "hunter2",
    "smtp_host": "smtp.example.com",
    "smtp_server": "smtp.example.com:587",
    "to_emails": ["me@example.com", "partner@example.com"]
}"#;
