//! Factory for preference cells over a store.

use std::sync::Arc;

use prefstore_core::{PrefKey, PrefPrimitive, PrefStore, Result};

use crate::cell::PrefCell;
use crate::enum_cell::{EnumCell, PrefEnum};
use crate::scope::PrefScope;

/// Hands out observable cells for named preferences of one store.
///
/// The store is injected rather than looked up: whoever opens it owns it,
/// and every cell created here shares it along with the scope their
/// background tasks run on.
///
/// # Example
///
/// ```rust,ignore
/// use prefstore_json::InMemoryPrefStore;
/// use prefstore_state::PreferencesStore;
///
/// let prefs = PreferencesStore::with_current_runtime(InMemoryPrefStore::new())?;
/// let volume = prefs.observable_cell("volume", 5)?;
/// assert_eq!(volume.get(), 5);
/// volume.set(7);
/// ```
#[derive(Clone)]
pub struct PreferencesStore {
    store: Arc<dyn PrefStore>,
    scope: PrefScope,
}

impl PreferencesStore {
    pub fn new<S: PrefStore + 'static>(store: S, scope: PrefScope) -> Self {
        Self::from_arc(Arc::new(store), scope)
    }

    pub fn from_arc(store: Arc<dyn PrefStore>, scope: PrefScope) -> Self {
        Self { store, scope }
    }

    /// Use the tokio runtime the caller is running in as the scope.
    pub fn with_current_runtime<S: PrefStore + 'static>(store: S) -> Result<Self> {
        Ok(Self::new(store, PrefScope::current()?))
    }

    /// A cell for the preference `name` of type `T`.
    ///
    /// The cell holds `initial_value` until the store's first delivery, and
    /// falls back to it whenever the entry is missing. Fails only if `name`
    /// is empty.
    pub fn observable_cell<T: PrefPrimitive>(
        &self,
        name: impl Into<String>,
        initial_value: T,
    ) -> Result<PrefCell<T>> {
        let key = PrefKey::new(name)?;
        Ok(PrefCell::observe(
            self.store.clone(),
            self.scope.clone(),
            key,
            initial_value,
        ))
    }

    /// A cell for an enum preference stored by constant name.
    pub fn enum_cell<E: PrefEnum>(
        &self,
        name: impl Into<String>,
        initial_value: E,
    ) -> Result<EnumCell<E>> {
        let raw = self.observable_cell(name, initial_value.name().to_string())?;
        Ok(EnumCell::new(raw))
    }

    pub fn store(&self) -> &Arc<dyn PrefStore> {
        &self.store
    }

    pub fn scope(&self) -> &PrefScope {
        &self.scope
    }
}
