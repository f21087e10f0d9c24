//! Error types for the Galaxy3D instancing engine
//!
//! Errors are only produced by explicit API calls (collection creation,
//! subscription, range changes). The per-frame paths (synchronization and
//! raycasting) never fail: they skip the operation and keep rendering.

use std::fmt;

/// Result type for Galaxy3D instancing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D instancing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid resource (geometry, material, descriptor contents)
    InvalidResource(String),

    /// Invalid capacity configuration (limit, range)
    InvalidConfiguration(String),

    /// A key does not refer to a live proxy or collection
    InvalidKey(String),

    /// The collection was destroyed and no longer accepts proxies
    CollectionDestroyed,

    /// The proxy is already registered with a collection
    AlreadySubscribed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::InvalidKey(msg) => write!(f, "Invalid key: {}", msg),
            Error::CollectionDestroyed => write!(f, "Collection destroyed"),
            Error::AlreadySubscribed => write!(f, "Proxy already subscribed"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
