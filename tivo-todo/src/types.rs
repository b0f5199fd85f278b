use serde::{Deserialize, Serialize};
use std::fmt;

pub use interfaces::defs::{CanonicalEpisode, DayBuckets, RunDates, ShowId, ShowSubscription, SourcedEpisode};

/// Which raw record shape an adapter was working on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Device,
    Broadcast,
    WebBroadcast,
    Subscription,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Device => "device",
            RecordKind::Broadcast => "broadcast",
            RecordKind::WebBroadcast => "web broadcast",
            RecordKind::Subscription => "subscription",
        };
        f.write_str(name)
    }
}

/// How the device's zone-less timestamps are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClock {
    /// Wall-clock numbers are kept as-is and the local zone is attached.
    #[default]
    Local,
    /// Numbers are UTC and get converted to the local zone.
    Utc,
}

/// The schedule service exposes the same data through two endpoint shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleEndpoint {
    Primary,
    Web,
}

impl ScheduleEndpoint {
    /// Query order for a single day.
    pub const ALL: [ScheduleEndpoint; 2] = [ScheduleEndpoint::Primary, ScheduleEndpoint::Web];

    pub fn path(&self) -> &'static str {
        match self {
            ScheduleEndpoint::Primary => "schedule",
            ScheduleEndpoint::Web => "schedule/web",
        }
    }
}

impl fmt::Display for ScheduleEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleEndpoint::Primary => f.write_str("primary"),
            ScheduleEndpoint::Web => f.write_str("web"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub schedule_base_url: String,
    pub sheets_base_url: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "TivoToDoList/1.0".to_string(),
            timeout_seconds: 30,
            schedule_base_url: "https://api.tvmaze.com".to_string(),
            sheets_base_url: "https://sheets.googleapis.com".to_string(),
        }
    }
}

/// Coarse error classes reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Collaborator,
    MalformedRecord,
    Mail,
}

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("{collaborator} request failed: {reason}")]
    Collaborator {
        collaborator: &'static str,
        reason: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Malformed {kind} record, field `{field}`: {reason}")]
    MalformedRecord {
        kind: RecordKind,
        field: &'static str,
        reason: String,
    },

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DigestError {
    pub fn collaborator(collaborator: &'static str, reason: impl Into<String>) -> Self {
        DigestError::Collaborator {
            collaborator,
            reason: reason.into(),
        }
    }

    pub fn malformed(kind: RecordKind, field: &'static str, reason: impl Into<String>) -> Self {
        DigestError::MalformedRecord {
            kind,
            field,
            reason: reason.into(),
        }
    }

    pub fn missing(kind: RecordKind, field: &'static str) -> Self {
        Self::malformed(kind, field, "missing or empty")
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DigestError::Config(_) => ErrorCategory::Config,
            DigestError::MalformedRecord { .. } => ErrorCategory::MalformedRecord,
            DigestError::Mail(_) => ErrorCategory::Mail,
            DigestError::Collaborator { .. }
            | DigestError::Http(_)
            | DigestError::InvalidUrl(_)
            | DigestError::Io(_)
            | DigestError::Serialization(_) => ErrorCategory::Collaborator,
        }
    }
}

impl From<native_tls::Error> for DigestError {
    fn from(e: native_tls::Error) -> Self {
        DigestError::collaborator("device", e.to_string())
    }
}

impl From<lettre::error::Error> for DigestError {
    fn from(e: lettre::error::Error) -> Self {
        DigestError::Mail(e.to_string())
    }
}

impl From<lettre::address::AddressError> for DigestError {
    fn from(e: lettre::address::AddressError) -> Self {
        DigestError::Mail(format!("invalid address: {}", e))
    }
}

impl From<lettre::transport::smtp::Error> for DigestError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        DigestError::Mail(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DigestError>;
