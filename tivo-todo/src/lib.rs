pub mod types;
pub mod config;
pub mod utils;
pub mod traits;
pub mod parser;
pub mod filter;
pub mod aggregator;
pub mod aggregators;
pub mod digest;
pub mod fetcher;
pub mod sources;
pub mod mailer;
pub mod pipeline;

pub use types::*;
pub use config::Config;
pub use parser::{EpisodeAdapter, RawRecord};
pub use filter::ShowFilter;
pub use aggregator::EpisodeAggregator;
pub use aggregators::DayBucketer;
pub use digest::DigestRenderer;
pub use fetcher::Fetcher;
pub use mailer::{DigestMail, SmtpMailer};
pub use pipeline::DigestPipeline;
pub use traits::{Mailer, RecordingSource, ScheduleSource, SubscriptionSource};
