use gavel_buyer::BuyerError;
use gavel_gateway::TransportError;
use gavel_seller::SellerError;
use thiserror::Error;

/// Errors loading or validating a scenario
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Seller error: {0}")]
    Seller(#[from] SellerError),

    #[error("Buyer error: {0}")]
    Buyer(#[from] BuyerError),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
