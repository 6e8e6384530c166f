pub mod aggregate;
pub mod census;
pub mod config;
pub mod history;
pub mod inactivity;
pub mod map;
pub mod report;
pub mod snapshot;
pub mod stamp;
pub mod village;

pub use census::{Census, CensusBuilder, CensusError, CensusSettings, RunSummary};
pub use config::CensusConfig;
pub use snapshot::{History, PlayerSnapshot};
pub use stamp::RunStamp;
