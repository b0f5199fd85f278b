pub mod day_bucket;

pub use day_bucket::DayBucketer;
