//! Observable preference cells.
//!
//! This layer turns a [`PrefStore`](prefstore_core::PrefStore) into
//! per-preference cells that can be read synchronously and written in the
//! background:
//! - `PreferencesStore`: Factory binding a store to an execution scope
//! - `PrefCell`: Cell for one primitive preference
//! - `EnumCell`: Cell for an enum persisted by constant name
//! - `PrefScope`: Owner of the cells' background tasks
//! - `MutableState`: The get/set/subscribe contract cells implement
//!
//! # Example
//!
//! ```rust,ignore
//! use prefstore_json::{JsonFilePrefStore, StoreConfig};
//! use prefstore_state::{pref_enum, PreferencesStore};
//!
//! #[derive(Clone, Copy, Debug, PartialEq)]
//! enum Theme { Light, Dark }
//! pref_enum!(Theme { Light, Dark });
//!
//! let store = JsonFilePrefStore::open(&StoreConfig::for_app("my-app")?)?;
//! let prefs = PreferencesStore::with_current_runtime(store)?;
//!
//! let theme = prefs.enum_cell("theme", Theme::Light)?;
//! theme.set(Theme::Dark);
//!
//! let mut updates = theme.subscribe();
//! assert_eq!(updates.changed().await??, Theme::Dark);
//! ```

mod adapter;
mod cell;
mod enum_cell;
mod scope;
mod state;

pub use adapter::PreferencesStore;
pub use cell::PrefCell;
pub use enum_cell::{EnumCell, EnumStream, PrefEnum};
pub use scope::PrefScope;
pub use state::{MutableState, StateStream};

pub use prefstore_core::{Error, Result};
