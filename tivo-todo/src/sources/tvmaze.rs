use crate::fetcher::Fetcher;
use crate::traits::ScheduleSource;
use crate::types::{FetchConfig, Result, ScheduleEndpoint};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::info;

const COLLABORATOR: &str = "schedule service";

/// TVmaze schedule lookups for the primary and web endpoints.
pub struct TvMazeSchedule {
    fetcher: Fetcher,
}

impl TvMazeSchedule {
    pub fn new(fetch_config: FetchConfig) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(fetch_config)?,
        })
    }
}

#[async_trait]
impl ScheduleSource for TvMazeSchedule {
    fn source_name(&self) -> String {
        format!("TVmaze ({})", self.fetcher.config().schedule_base_url)
    }

    async fn schedule(&self, endpoint: ScheduleEndpoint, date: NaiveDate) -> Result<Vec<Value>> {
        let date = date.format("%Y-%m-%d").to_string();
        let url = Fetcher::endpoint(
            &self.fetcher.config().schedule_base_url,
            endpoint.path(),
            &[("date", date.as_str())],
        )?;

        let guide: Vec<Value> = self.fetcher.get_json(COLLABORATOR, url).await?;
        info!("Schedule service returned {} {} records for {}", guide.len(), endpoint, date);
        Ok(guide)
    }
}
