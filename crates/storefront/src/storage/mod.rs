//! Local key-value storage and cart persistence.
//!
//! # Architecture
//!
//! - [`KeyValueStore`] is the seam: string keys to string values, the shape of
//!   browser local storage.
//! - [`FileStore`] keeps one JSON file per key under a data directory.
//! - [`MemoryStore`] keeps everything in memory, for tests and throwaway sessions.
//! - [`CartPersistence`] serializes the cart's item list under one key.
//!
//! Persistence is best-effort. Read failures and corrupt data load as an empty
//! cart; write failures are logged. The in-memory cart stays authoritative for
//! the session either way.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::collections::HashSet;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cart::{LineItem, compute_totals};

/// Errors that can occur when reading or writing local storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The key cannot be used as a storage name.
    #[error("Invalid storage key: '{0}'")]
    InvalidKey(String),

    /// Value could not be serialized.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Stored value could not be understood.
    #[error("Corrupt value under key '{key}': {reason}")]
    Corrupt { key: String, reason: String },
}

/// String key-value storage, loaded and written synchronously.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value under `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Read and deserialize a JSON value.
///
/// # Errors
///
/// Returns [`StorageError::Corrupt`] if the stored text is not valid JSON for
/// `T`, or the store's own error if it cannot be read.
pub fn read_json<S, T>(store: &S, key: &str) -> Result<Option<T>, StorageError>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    store
        .get(key)?
        .map(|raw| {
            serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

/// Serialize and write a JSON value.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_json<S, T>(store: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(StorageError::Serialize)?;
    store.set(key, &raw)
}

// =============================================================================
// CartPersistence
// =============================================================================

/// Durable round-trip of the cart's item list.
#[derive(Debug, Clone)]
pub struct CartPersistence<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> CartPersistence<S> {
    /// Persist carts under `key` in `store`.
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Key the cart is stored under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Load the stored item list.
    ///
    /// Missing, unreadable, or corrupt data yields an empty list.
    #[must_use]
    pub fn load(&self) -> Vec<LineItem> {
        match self.try_load() {
            Ok(items) => {
                debug!(key = %self.key, items = items.len(), "Loaded cart from storage");
                items
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Discarding stored cart");
                Vec::new()
            }
        }
    }

    /// Load the stored item list, reporting why it could not be used.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Corrupt`] if the stored value is not a valid
    /// item list (bad JSON, a zero quantity, a repeated product, or totals
    /// too large to compute), or the store's error if it cannot be read.
    pub fn try_load(&self) -> Result<Vec<LineItem>, StorageError> {
        let Some(items) = read_json::<S, Vec<LineItem>>(&self.store, &self.key)? else {
            return Ok(Vec::new());
        };

        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.quantity == 0 {
                return Err(self.corrupt(format!("product {} has quantity 0", item.product_id)));
            }
            if !seen.insert(item.product_id) {
                return Err(self.corrupt(format!("product {} appears twice", item.product_id)));
            }
        }

        if compute_totals(&items).is_none() {
            return Err(self.corrupt("cart totals overflow".to_string()));
        }

        Ok(items)
    }

    /// Write the full item list, logging failures.
    pub fn save(&self, items: &[LineItem]) {
        if let Err(e) = self.try_save(items) {
            warn!(key = %self.key, error = %e, "Failed to persist cart");
        }
    }

    /// Write the full item list.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn try_save(&self, items: &[LineItem]) -> Result<(), StorageError> {
        write_json(&self.store, &self.key, items)
    }

    fn corrupt(&self, reason: String) -> StorageError {
        StorageError::Corrupt {
            key: self.key.clone(),
            reason,
        }
    }
}
