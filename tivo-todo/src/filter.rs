use crate::types::{ShowSubscription, SourcedEpisode};
use tracing::debug;

/// Keeps schedule-service episodes of subscribed shows. Device episodes
/// carry no show id and always pass.
pub struct ShowFilter<'a> {
    subscription: &'a ShowSubscription,
}

impl<'a> ShowFilter<'a> {
    pub fn new(subscription: &'a ShowSubscription) -> Self {
        Self { subscription }
    }

    pub fn keep(&self, episode: &SourcedEpisode) -> bool {
        match episode.show_id {
            None => true,
            Some(show_id) => {
                let subscribed = self.subscription.contains(show_id);
                if !subscribed {
                    debug!("Dropping '{}': show {} not subscribed", episode.episode.title, show_id);
                }
                subscribed
            }
        }
    }
}
