pub mod types;
pub mod config;
pub mod error;
pub mod removal;
pub mod roster;

pub use types::*;
pub use config::Config;
pub use error::ScanError;
pub use removal::{removal_candidates, RemovalRequest, RemovalStatus};
pub use roster::default_roster;
