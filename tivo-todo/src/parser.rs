use crate::types::{CanonicalEpisode, DeviceClock, DigestError, RecordKind, Result, ShowId, SourcedEpisode};
use crate::utils::text;
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

const DEVICE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const EMBEDDED_KEY: &str = "_embedded";

/// A scheduled recording as the device reports it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub requested_start_time: Option<String>,
    pub requested_end_time: Option<String>,
    #[serde(default)]
    pub is_new: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShowRecord {
    pub id: Option<u32>,
    pub name: Option<String>,
    pub summary: Option<String>,
}

/// Primary schedule endpoint: the show is nested directly on the episode.
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastRecord {
    pub name: Option<String>,
    pub airstamp: Option<String>,
    pub runtime: Option<i64>,
    pub show: Option<ShowRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddedResources {
    pub show: Option<ShowRecord>,
}

/// Web schedule endpoint: the show sits inside the embedded-resource wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct WebBroadcastRecord {
    pub name: Option<String>,
    pub airstamp: Option<String>,
    pub runtime: Option<i64>,
    #[serde(rename = "_embedded")]
    pub embedded: Option<EmbeddedResources>,
}

/// The three raw shapes an episode can arrive in.
#[derive(Debug, Clone)]
pub enum RawRecord {
    Device(DeviceRecord),
    Broadcast(BroadcastRecord),
    WebBroadcast(WebBroadcastRecord),
}

impl RawRecord {
    pub fn device(value: Value) -> Result<Self> {
        Ok(RawRecord::Device(decode(RecordKind::Device, value)?))
    }

    /// Schedule records are told apart by the embedded-resource wrapper,
    /// whichever endpoint they came from.
    pub fn schedule(value: Value) -> Result<Self> {
        let Some(object) = value.as_object() else {
            return Err(DigestError::malformed(
                RecordKind::Broadcast,
                "record",
                "expected a JSON object",
            ));
        };

        if object.contains_key(EMBEDDED_KEY) {
            Ok(RawRecord::WebBroadcast(decode(RecordKind::WebBroadcast, value)?))
        } else {
            Ok(RawRecord::Broadcast(decode(RecordKind::Broadcast, value)?))
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            RawRecord::Device(_) => RecordKind::Device,
            RawRecord::Broadcast(_) => RecordKind::Broadcast,
            RawRecord::WebBroadcast(_) => RecordKind::WebBroadcast,
        }
    }
}

fn decode<T: DeserializeOwned>(kind: RecordKind, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| DigestError::malformed(kind, "record", e.to_string()))
}

/// Converts raw records into canonical episodes in the zone `Tz`.
#[derive(Debug, Clone)]
pub struct EpisodeAdapter<Tz: TimeZone> {
    zone: Tz,
    device_clock: DeviceClock,
}

impl<Tz: TimeZone> EpisodeAdapter<Tz> {
    pub fn new(zone: Tz, device_clock: DeviceClock) -> Self {
        Self { zone, device_clock }
    }

    pub fn convert(&self, record: &RawRecord) -> Result<SourcedEpisode> {
        match record {
            RawRecord::Device(record) => self.convert_device(record).map(SourcedEpisode::device),
            RawRecord::Broadcast(record) => {
                let show = record
                    .show
                    .as_ref()
                    .ok_or_else(|| DigestError::missing(RecordKind::Broadcast, "show"))?;
                self.convert_schedule(
                    RecordKind::Broadcast,
                    ScheduleFields {
                        name: record.name.as_deref(),
                        airstamp: record.airstamp.as_deref(),
                        runtime: record.runtime,
                    },
                    show,
                )
            }
            RawRecord::WebBroadcast(record) => {
                let show = record
                    .embedded
                    .as_ref()
                    .and_then(|embedded| embedded.show.as_ref())
                    .ok_or_else(|| DigestError::missing(RecordKind::WebBroadcast, "_embedded.show"))?;
                self.convert_schedule(
                    RecordKind::WebBroadcast,
                    ScheduleFields {
                        name: record.name.as_deref(),
                        airstamp: record.airstamp.as_deref(),
                        runtime: record.runtime,
                    },
                    show,
                )
            }
        }
    }

    fn convert_device(&self, record: &DeviceRecord) -> Result<CanonicalEpisode> {
        let kind = RecordKind::Device;
        let title = required(kind, "title", record.title.as_deref())?;
        let start_time = self.device_time("requestedStartTime", record.requested_start_time.as_deref())?;
        let end_time = self.device_time("requestedEndTime", record.requested_end_time.as_deref())?;

        debug!("Converted device record '{}' starting {}", title, start_time);
        Ok(CanonicalEpisode {
            title,
            subtitle: non_empty(record.subtitle.as_deref()),
            description: non_empty(record.description.as_deref()),
            start_time,
            end_time,
        })
    }

    fn device_time(&self, field: &'static str, raw: Option<&str>) -> Result<DateTime<FixedOffset>> {
        let raw = required(RecordKind::Device, field, raw)?;
        let naive = NaiveDateTime::parse_from_str(&raw, DEVICE_TIME_FORMAT)
            .map_err(|e| DigestError::malformed(RecordKind::Device, field, format!("'{}': {}", raw, e)))?;

        let local = match self.device_clock {
            DeviceClock::Local => self.zone.from_local_datetime(&naive).earliest().ok_or_else(|| {
                DigestError::malformed(
                    RecordKind::Device,
                    field,
                    format!("'{}' does not exist in the local zone", raw),
                )
            })?,
            DeviceClock::Utc => Utc.from_utc_datetime(&naive).with_timezone(&self.zone),
        };
        Ok(local.fixed_offset())
    }

    fn convert_schedule(&self, kind: RecordKind, fields: ScheduleFields<'_>, show: &ShowRecord) -> Result<SourcedEpisode> {
        let (id_field, name_field) = match kind {
            RecordKind::WebBroadcast => ("_embedded.show.id", "_embedded.show.name"),
            _ => ("show.id", "show.name"),
        };
        let show_id = show.id.map(ShowId).ok_or_else(|| DigestError::missing(kind, id_field))?;
        let title = required(kind, name_field, show.name.as_deref())?;

        let airstamp = required(kind, "airstamp", fields.airstamp)?;
        let start_time = DateTime::parse_from_rfc3339(&airstamp)
            .map_err(|e| DigestError::malformed(kind, "airstamp", format!("'{}': {}", airstamp, e)))?
            .with_timezone(&Utc)
            .with_timezone(&self.zone)
            .fixed_offset();

        let runtime = fields.runtime.unwrap_or(0);
        if runtime < 0 {
            return Err(DigestError::malformed(kind, "runtime", format!("negative runtime {}", runtime)));
        }
        let end_time = Duration::try_minutes(runtime)
            .and_then(|length| start_time.checked_add_signed(length))
            .ok_or_else(|| DigestError::malformed(kind, "runtime", format!("runtime {} out of range", runtime)))?;

        debug!("Converted {} record '{}' (show {}) starting {}", kind, title, show_id, start_time);
        Ok(SourcedEpisode::scheduled(
            CanonicalEpisode {
                title,
                subtitle: non_empty(fields.name),
                description: text::plain_text(show.summary.as_deref()),
                start_time,
                end_time,
            },
            show_id,
        ))
    }
}

struct ScheduleFields<'a> {
    name: Option<&'a str>,
    airstamp: Option<&'a str>,
    runtime: Option<i64>,
}

fn required(kind: RecordKind, field: &'static str, value: Option<&str>) -> Result<String> {
    non_empty(value).ok_or_else(|| DigestError::missing(kind, field))
}

/// Blank means absent; anything else is kept verbatim.
fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
}
