pub mod batch;
pub mod config;
pub mod error;
pub mod report;
pub mod resolver;
pub mod source;

// Exporting types for convenience
pub use batch::{summarize, BatchDriver, BatchSummary};
pub use config::LookupConfig;
pub use error::{EnrichError, Result};
pub use resolver::{HttpResolver, Resolution, ResolutionStatus, Resolve, NOT_FOUND_NAME};
