use thiserror::Error;
use ticker_ports::StoreError;

/// Hard failures that abort a whole tick
///
/// Per-token problems never surface here; they are reported in the
/// summary's failure list instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TickError {
    #[error("A tick is already in progress")]
    TickInProgress,

    #[error("Failed to load active tokens: {0}")]
    LoadTokens(#[source] StoreError),

    #[error("Failed to load trades: {0}")]
    LoadTrades(#[source] StoreError),
}

/// Configuration loading and validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
