use crate::types::{CanonicalEpisode, DayBuckets};
use crate::utils::{first_non_empty, time};
use tracing::{debug, info};

pub const TODAY_HEADER: &str = "Today's new episodes:";
pub const TOMORROW_HEADER: &str = "Tomorrow's new episodes";
pub const LINE_BREAK: &str = "<br/>";
pub const UNKNOWN_ANNOTATION: &str = "Unknown";

const START_TIME_FORMAT: &str = "%I:%M %p";

/// Sorts each day's episodes and renders the HTML digest body.
pub struct DigestRenderer;

impl DigestRenderer {
    pub fn render(buckets: &DayBuckets) -> String {
        let today = Self::sorted(&buckets.today);
        let tomorrow = Self::sorted(&buckets.tomorrow);

        let mut lines = Vec::with_capacity(today.len() + tomorrow.len() + 3);
        lines.push(TODAY_HEADER.to_string());
        lines.extend(today.iter().map(|episode| Self::render_line(episode)));
        lines.push(String::new());
        lines.push(TOMORROW_HEADER.to_string());
        lines.extend(tomorrow.iter().map(|episode| Self::render_line(episode)));

        info!("Rendered digest with {} today and {} tomorrow", today.len(), tomorrow.len());
        lines.join(LINE_BREAK)
    }

    /// Ascending by start time. Stable, so equal starts keep source order.
    pub fn sorted(episodes: &[CanonicalEpisode]) -> Vec<&CanonicalEpisode> {
        let mut sorted: Vec<&CanonicalEpisode> = episodes.iter().collect();
        sorted.sort_by_key(|episode| episode.start_time);
        sorted
    }

    pub fn render_line(episode: &CanonicalEpisode) -> String {
        let line = format!(
            "{}: <b>{}</b> (<i>{}</i>) [{}]",
            episode.start_time.format(START_TIME_FORMAT),
            episode.title,
            Self::annotation(episode),
            time::trimmed_duration(episode.duration()),
        );
        debug!("{}", line);
        line
    }

    /// Subtitle, else description, else "Unknown".
    pub fn annotation(episode: &CanonicalEpisode) -> &str {
        first_non_empty([episode.subtitle.as_deref(), episode.description.as_deref()])
            .unwrap_or(UNKNOWN_ANNOTATION)
    }
}
