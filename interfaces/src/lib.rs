pub mod defs;

pub use defs::{CanonicalEpisode, DayBuckets, RunDates, ShowId, ShowSubscription, SourcedEpisode};
