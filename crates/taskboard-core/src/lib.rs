pub mod config;
pub mod error;
pub mod logging;
pub mod result;

pub use config::AppConfig;
pub use error::TaskboardError;
pub use logging::{LogEntry, LogLevel, SyncLog};
pub use result::TaskboardResult;
