//! prefstore: typed application preferences that can be read synchronously
//! and observed as they change.
//!
//! Preferences live in a [`PrefStore`], a snapshot of typed entries with a
//! change stream and serialized edits. [`JsonFilePrefStore`] keeps one in a
//! JSON file; [`InMemoryPrefStore`] keeps one in memory. A
//! [`PreferencesStore`] hands out cells over a store: each cell caches the
//! latest committed value of one preference, writes in the background, and
//! can be subscribed to.
//!
//! ```rust,ignore
//! use prefstore::{PreferencesStore, JsonFilePrefStore, StoreConfig};
//!
//! let store = JsonFilePrefStore::open(&StoreConfig::for_app("my-app")?)?;
//! let prefs = PreferencesStore::with_current_runtime(store)?;
//!
//! let volume = prefs.observable_cell("volume", 5)?;
//! volume.set(7);
//! ```

pub use prefstore_core::{
    bool_key, bytes_key, double_key, float_key, int_key, long_key, string_key, string_set_key,
    Error, MutablePreferences, PrefKey, PrefPrimitive, PrefStore, PrefStoreExt, PrefType,
    PrefValue, Preferences, PreferencesChannel, Result, Transform,
};
pub use prefstore_json::{
    format, CorruptionPolicy, InMemoryPrefStore, JsonFilePrefStore, StoreConfig,
};
pub use prefstore_state::{
    pref_enum, EnumCell, EnumStream, MutableState, PrefCell, PrefEnum, PrefScope,
    PreferencesStore, StateStream,
};
