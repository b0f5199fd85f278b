use crate::filter::ShowFilter;
use crate::types::{CanonicalEpisode, SourcedEpisode};
use tracing::info;

/// Concatenates device and schedule-service episodes in arrival order.
///
/// No deduplication: an episode returned by both schedule endpoints is kept
/// twice.
pub struct EpisodeAggregator<'a> {
    filter: ShowFilter<'a>,
    device: Vec<CanonicalEpisode>,
    schedule: Vec<CanonicalEpisode>,
    dropped: usize,
}

impl<'a> EpisodeAggregator<'a> {
    pub fn new(filter: ShowFilter<'a>) -> Self {
        Self {
            filter,
            device: Vec::new(),
            schedule: Vec::new(),
            dropped: 0,
        }
    }

    /// Device episodes bypass the show filter.
    pub fn add_device<I>(&mut self, episodes: I)
    where
        I: IntoIterator<Item = CanonicalEpisode>,
    {
        self.device.extend(episodes);
    }

    pub fn add_schedule<I>(&mut self, episodes: I)
    where
        I: IntoIterator<Item = SourcedEpisode>,
    {
        for sourced in episodes {
            if self.filter.keep(&sourced) {
                self.schedule.push(sourced.episode);
            } else {
                self.dropped += 1;
            }
        }
    }

    /// Device episodes first, then schedule episodes.
    pub fn finish(self) -> Vec<CanonicalEpisode> {
        info!(
            "Aggregated {} device and {} schedule episodes ({} unsubscribed dropped)",
            self.device.len(),
            self.schedule.len(),
            self.dropped
        );
        let mut combined = self.device;
        combined.extend(self.schedule);
        combined
    }
}
