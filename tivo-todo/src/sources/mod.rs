pub mod sheets;
pub mod tivo;
pub mod tvmaze;

pub use sheets::{SheetSubscription, StaticSubscription};
pub use tivo::{DeviceSettings, MindSession, MrpcConnection, TivoSource};
pub use tvmaze::TvMazeSchedule;
