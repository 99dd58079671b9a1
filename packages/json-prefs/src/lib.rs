//! Preference store implementations.
//!
//! - `InMemoryPrefStore`: snapshot held only in memory (tests, ephemeral state)
//! - `JsonFilePrefStore`: one JSON document per store file, replaced atomically
//!   on every committed edit

pub mod config;
pub mod format;
pub mod in_memory;
pub mod local_disk;

pub use config::{CorruptionPolicy, StoreConfig};
pub use in_memory::InMemoryPrefStore;
pub use local_disk::JsonFilePrefStore;

pub use prefstore_core::{Error, PrefStore, PrefStoreExt, Preferences, Result};
