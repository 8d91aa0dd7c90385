pub mod config;
pub mod error;
pub mod facility;
pub mod metrics;
pub mod reconciliation;
pub mod report;
pub mod submission;
pub mod types;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::PortfolioConfig;
pub use error::LoanBookError;
pub use types::*;

/// Standard result type for all loan book operations
pub type LoanBookResult<T> = Result<T, LoanBookError>;
