//! Crate-level error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::provider::MissingProviderError;
use crate::remote::RemoteError;

/// Result type for operations that can fail for more than one reason.
pub type Result<T> = std::result::Result<T, Error>;

/// Any error this crate produces.
#[derive(Debug, Error)]
pub enum Error {
    /// A remote create or fetch failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The store was looked up before it was installed.
    #[error(transparent)]
    MissingProvider(#[from] MissingProviderError),

    /// Configuration is invalid or missing.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
