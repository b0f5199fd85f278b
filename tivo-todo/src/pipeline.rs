use crate::aggregator::EpisodeAggregator;
use crate::aggregators::DayBucketer;
use crate::config::Config;
use crate::digest::DigestRenderer;
use crate::filter::ShowFilter;
use crate::parser::{EpisodeAdapter, RawRecord};
use crate::sources::{sheets, DeviceSettings, TivoSource, TvMazeSchedule};
use crate::traits::{RecordingSource, ScheduleSource, SubscriptionSource};
use crate::types::{CanonicalEpisode, DayBuckets, Result, RunDates, ScheduleEndpoint, SourcedEpisode};
use chrono::{Local, TimeZone};
use std::sync::Arc;
use tracing::{debug, info};

/// Drives one run: query every collaborator in a fixed order, convert,
/// filter, merge, bucket and render. The first error aborts the run.
pub struct DigestPipeline<Tz: TimeZone> {
    recordings: Box<dyn RecordingSource>,
    schedule: Box<dyn ScheduleSource>,
    subscriptions: Arc<dyn SubscriptionSource>,
    adapter: EpisodeAdapter<Tz>,
}

impl DigestPipeline<Local> {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            Box::new(TivoSource::new(DeviceSettings::from(config))),
            Box::new(TvMazeSchedule::new(config.fetch.clone())?),
            sheets::from_config(config)?,
            EpisodeAdapter::new(Local, config.device_clock),
        ))
    }
}

impl<Tz: TimeZone> DigestPipeline<Tz> {
    pub fn new(
        recordings: Box<dyn RecordingSource>,
        schedule: Box<dyn ScheduleSource>,
        subscriptions: Arc<dyn SubscriptionSource>,
        adapter: EpisodeAdapter<Tz>,
    ) -> Self {
        Self {
            recordings,
            schedule,
            subscriptions,
            adapter,
        }
    }

    /// Device episodes followed by subscribed schedule episodes.
    pub async fn collect(&self, dates: &RunDates) -> Result<Vec<CanonicalEpisode>> {
        info!("Querying {} for to do list", self.recordings.source_name());
        let device = self.device_episodes(dates).await?;

        let subscription = self.subscriptions.subscription().await?;
        let mut aggregator = EpisodeAggregator::new(ShowFilter::new(&subscription));
        aggregator.add_device(device);

        for date in dates.days() {
            for endpoint in ScheduleEndpoint::ALL {
                info!("Querying {} {} schedule for {}", self.schedule.source_name(), endpoint, date);
                let guide = self.schedule.schedule(endpoint, date).await?;
                let episodes = guide
                    .into_iter()
                    .map(|value| self.adapter.convert(&RawRecord::schedule(value)?))
                    .collect::<Result<Vec<SourcedEpisode>>>()?;
                aggregator.add_schedule(episodes);
            }
        }

        Ok(aggregator.finish())
    }

    pub async fn bucket(&self, dates: &RunDates) -> Result<DayBuckets> {
        let episodes = self.collect(dates).await?;
        Ok(DayBucketer::new(*dates).partition(episodes))
    }

    pub async fn run(&self, dates: &RunDates) -> Result<String> {
        let buckets = self.bucket(dates).await?;
        Ok(DigestRenderer::render(&buckets))
    }

    /// Only records flagged new reach the adapter.
    async fn device_episodes(&self, dates: &RunDates) -> Result<Vec<CanonicalEpisode>> {
        let records = self.recordings.scheduled_recordings(dates).await?;
        let total = records.len();

        let mut episodes = Vec::new();
        for value in records {
            let record = RawRecord::device(value)?;
            if let RawRecord::Device(device) = &record {
                if !device.is_new {
                    debug!("Skipping repeat {:?}", device.title);
                    continue;
                }
            }
            episodes.push(self.adapter.convert(&record)?.episode);
        }

        info!("Found {} new episodes among {} scheduled recordings", episodes.len(), total);
        Ok(episodes)
    }
}
