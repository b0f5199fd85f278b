use chrono::{DateTime, Days, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Schedule-service identifier of a show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShowId(pub u32);

impl fmt::Display for ShowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Provider-independent episode. Once built it carries no trace of the
/// source it came from.
///
/// Start and end times hold the local zone's offset at that instant, so
/// `start_time.date_naive()` is the local calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalEpisode {
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
}

impl CanonicalEpisode {
    pub fn duration(&self) -> chrono::Duration {
        self.end_time.signed_duration_since(self.start_time)
    }
}

/// An episode fresh out of an adapter, still paired with the show identity
/// used for filtering. Device episodes have no show id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcedEpisode {
    pub episode: CanonicalEpisode,
    pub show_id: Option<ShowId>,
}

impl SourcedEpisode {
    pub fn device(episode: CanonicalEpisode) -> Self {
        Self { episode, show_id: None }
    }

    pub fn scheduled(episode: CanonicalEpisode, show_id: ShowId) -> Self {
        Self { episode, show_id: Some(show_id) }
    }
}

/// Set of subscribed schedule-service shows. Membership test only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowSubscription {
    shows: HashSet<ShowId>,
}

impl ShowSubscription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, show_id: ShowId) -> bool {
        self.shows.contains(&show_id)
    }

    pub fn insert(&mut self, show_id: ShowId) -> bool {
        self.shows.insert(show_id)
    }

    pub fn len(&self) -> usize {
        self.shows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shows.is_empty()
    }
}

impl FromIterator<ShowId> for ShowSubscription {
    fn from_iter<I: IntoIterator<Item = ShowId>>(iter: I) -> Self {
        Self {
            shows: iter.into_iter().collect(),
        }
    }
}

/// The two calendar days a digest covers, both derived from one run date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunDates {
    pub today: NaiveDate,
    pub tomorrow: NaiveDate,
}

impl RunDates {
    /// Returns `None` when the run date is the last representable day.
    pub fn new(today: NaiveDate) -> Option<Self> {
        let tomorrow = today.checked_add_days(Days::new(1))?;
        Some(Self { today, tomorrow })
    }

    /// Dates in chronological order.
    pub fn days(&self) -> [NaiveDate; 2] {
        [self.today, self.tomorrow]
    }
}

/// Episodes partitioned by local calendar day of their start time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayBuckets {
    pub today: Vec<CanonicalEpisode>,
    pub tomorrow: Vec<CanonicalEpisode>,
}

impl DayBuckets {
    pub fn len(&self) -> usize {
        self.today.len() + self.tomorrow.len()
    }

    pub fn is_empty(&self) -> bool {
        self.today.is_empty() && self.tomorrow.is_empty()
    }
}

// Object style note:
// Everything in this crate is plain data. Types here are built once per run,
// never mutated after construction, and dropped at process exit. Anything
// that talks to the network lives in the tivo-todo crate behind a trait.
