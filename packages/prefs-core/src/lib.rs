//! Core prefstore: typed preference values and the store contract
//!
//! This layer defines what a preference store looks like to its consumers:
//! - `PrefValue`: Closed set of primitive kinds a preference can hold
//! - `PrefKey`: Name plus the primitive type stored under it
//! - `Preferences`: Immutable snapshot of the whole key-space
//! - `PrefStore`: Change stream plus atomic read-modify-write edits
//!
//! Store implementations live in `prefstore-json`; reactive cells built on
//! top of a store live in `prefstore-state`.
//!
//! # Example
//!
//! ```rust,ignore
//! use prefstore_core::{int_key, PrefStore, PrefStoreExt};
//!
//! async fn bump(store: &dyn PrefStore) -> Result<(), prefstore_core::Error> {
//!     let launches = int_key("launches")?;
//!     let current = store.get(&launches).unwrap_or(0);
//!     store.set(&launches, current + 1).await?;
//!     Ok(())
//! }
//! ```

mod channel;
mod error;
mod key;
mod preferences;
mod traits;
mod value;

pub use channel::PreferencesChannel;
pub use error::{Error, Result};
pub use key::{
    bool_key, bytes_key, double_key, float_key, int_key, long_key, string_key, string_set_key,
    PrefKey,
};
pub use preferences::{MutablePreferences, Preferences};
pub use traits::{PrefStore, PrefStoreExt, Transform};
pub use value::{PrefPrimitive, PrefType, PrefValue};
