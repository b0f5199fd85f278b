use crate::types::{CanonicalEpisode, DayBuckets, RunDates};
use tracing::{debug, info};

/// Partitions episodes by the local calendar date of their start time.
///
/// Only the date matters: an episode starting 23:59 belongs to that day and
/// one starting 00:00 to the next, however long they run.
pub struct DayBucketer {
    dates: RunDates,
}

impl DayBucketer {
    pub fn new(dates: RunDates) -> Self {
        Self { dates }
    }

    pub fn dates(&self) -> RunDates {
        self.dates
    }

    /// Episodes outside both days are dropped silently.
    pub fn partition<I>(&self, episodes: I) -> DayBuckets
    where
        I: IntoIterator<Item = CanonicalEpisode>,
    {
        let mut buckets = DayBuckets::default();
        let mut outside = 0;

        for episode in episodes {
            let start_date = episode.start_time.date_naive();
            if start_date == self.dates.today {
                buckets.today.push(episode);
            } else if start_date == self.dates.tomorrow {
                buckets.tomorrow.push(episode);
            } else {
                debug!("'{}' starts {} outside the digest window", episode.title, start_date);
                outside += 1;
            }
        }

        info!(
            "Bucketed {} episodes for {} and {} for {} ({} outside window)",
            buckets.today.len(),
            self.dates.today,
            buckets.tomorrow.len(),
            self.dates.tomorrow,
            outside
        );
        buckets
    }
}
