use crate::config::{Config, SubscriptionConfig};
use crate::fetcher::Fetcher;
use crate::traits::SubscriptionSource;
use crate::types::{DigestError, FetchConfig, RecordKind, Result, ShowId, ShowSubscription};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

const COLLABORATOR: &str = "spreadsheet service";
const READ_RANGE: &str = "A:A";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Show ids listed in the first column of a Google Sheet.
pub struct SheetSubscription {
    fetcher: Fetcher,
    api_key: String,
    sheet_id: String,
}

impl SheetSubscription {
    pub fn new(fetch_config: FetchConfig, api_key: String, sheet_id: String) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(fetch_config)?,
            api_key,
            sheet_id,
        })
    }
}

#[async_trait]
impl SubscriptionSource for SheetSubscription {
    async fn subscription(&self) -> Result<ShowSubscription> {
        let path = format!("v4/spreadsheets/{}/values/{}", self.sheet_id, READ_RANGE);
        let url = Fetcher::endpoint(
            &self.fetcher.config().sheets_base_url,
            &path,
            &[("key", self.api_key.as_str())],
        )?;

        let range: ValueRange = self.fetcher.get_json(COLLABORATOR, url).await?;
        let subscription = parse_rows(&range.values)?;
        info!("Loaded {} subscribed shows from sheet", subscription.len());
        Ok(subscription)
    }
}

/// Each non-empty row's first cell must hold an integer show id.
pub fn parse_rows(rows: &[Vec<Value>]) -> Result<ShowSubscription> {
    let mut subscription = ShowSubscription::new();
    for (index, row) in rows.iter().enumerate() {
        let cell = match row.first() {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                warn!("Skipping empty subscription row {}", index + 1);
                continue;
            }
        };
        let show_id = cell.parse::<u32>().map_err(|e| {
            DigestError::malformed(
                RecordKind::Subscription,
                "show id",
                format!("row {}: '{}': {}", index + 1, cell, e),
            )
        })?;
        subscription.insert(ShowId(show_id));
    }
    Ok(subscription)
}

/// Show ids listed directly in the config file.
pub struct StaticSubscription {
    shows: ShowSubscription,
}

impl StaticSubscription {
    pub fn new<I: IntoIterator<Item = ShowId>>(shows: I) -> Self {
        Self {
            shows: shows.into_iter().collect(),
        }
    }
}

#[async_trait]
impl SubscriptionSource for StaticSubscription {
    async fn subscription(&self) -> Result<ShowSubscription> {
        Ok(self.shows.clone())
    }
}

/// Picks the subscription source the config describes.
pub fn from_config(config: &Config) -> Result<Arc<dyn SubscriptionSource>> {
    match config.subscription()? {
        SubscriptionConfig::Sheet { api_key, sheet_id } => Ok(Arc::new(SheetSubscription::new(
            config.fetch.clone(),
            api_key.to_string(),
            sheet_id.to_string(),
        )?)),
        SubscriptionConfig::Inline(ids) => Ok(Arc::new(StaticSubscription::new(ids.iter().copied()))),
    }
}
