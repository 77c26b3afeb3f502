//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Absence of a key on a plain lookup is not an error: `get` returns
/// `Option`. The `KeyDoesNotExist` variant is reserved for operations
/// like `ttl` where the caller asked a question about a specific key.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The key is not present in the cache (or has already expired)
    #[error("key does not exist")]
    KeyDoesNotExist,

    /// The key exists but has no expiration set
    #[error("key has no expiration")]
    KeyHasNoExpiration,

    /// A janitor is already sweeping this cache
    #[error("janitor is already running")]
    JanitorAlreadyRunning,

    /// Snapshot file could not be read or written
    #[error("snapshot i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot stream could not be encoded or decoded
    #[error("snapshot encoding failed: {0}")]
    Serialization(#[from] bincode::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
