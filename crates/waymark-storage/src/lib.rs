//! Persistent key-value storage for the Waymark session layer.
//!
//! This crate provides:
//! - The `KeyValueStore` trait mirroring the host platform's synchronous
//!   key-value store
//! - In-memory and file-backed implementations
//! - The `SessionStore` facade over the three session slots (access token,
//!   refresh token, serialized user profile)

mod file;
mod keys;
mod memory;
mod session;
mod traits;

pub use file::FileStore;
pub use keys::StorageKeys;
pub use memory::MemoryStore;
pub use session::SessionStore;
pub use traits::KeyValueStore;

use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend-specific storage error
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
