//! Persistent key-value surface.
//!
//! The store persists the basket (and a few preferences) as JSON text under
//! fixed keys. Writes are synchronous and last-writer-wins; nothing
//! coordinates two stores that share one surface.
//!
//! # Implementations
//!
//! - [`MemoryStore`]: process-local map, used by tests
//! - [`FileStore`]: one `{key}.json` file per key under a directory, one
//!   directory per visitor

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::fmt::Debug;

use thiserror::Error;

/// Well-known keys.
pub mod keys {
    /// Serialized basket: `[{id, quantity, product}]`.
    pub const BASKET: &str = "basket";

    /// Serialized boolean theme preference.
    pub const DARK_MODE: &str = "isDarkMode";

    /// Last submitted call-back request.
    pub const USER_DATA: &str = "userData";
}

/// Errors from a key-value surface.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Key contains characters the backend cannot represent.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// A value could not be encoded as JSON.
    #[error("failed to encode stored value: {0}")]
    Encode(#[from] serde_json::Error),

    /// A stored value is not the JSON its key should hold.
    #[error("stored value is malformed: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Internal lock was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Synchronous string key-value storage.
///
/// All methods take `&self`; implementations use interior mutability.
pub trait KeyValueStore: Send + Sync + Debug {
    /// Read a value. Returns `Ok(None)` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or replace a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
