//! Store traits: PrefStore and its typed extension.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::key::PrefKey;
use crate::preferences::{MutablePreferences, Preferences};
use crate::value::PrefPrimitive;
use crate::Result;

/// An edit applied to a scratch copy of the current snapshot.
///
/// Returning an error aborts the edit; nothing is persisted or published.
pub type Transform = Box<dyn FnOnce(&mut MutablePreferences) -> Result<()> + Send>;

/// A persistent, observable preference store.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Arc<dyn PrefStore>`.
#[async_trait]
pub trait PrefStore: Send + Sync {
    /// Subscribe to the change stream.
    ///
    /// The receiver starts out holding the current snapshot and is notified
    /// after every edit that committed a different snapshot.
    fn data(&self) -> watch::Receiver<Arc<Preferences>>;

    /// The most recently committed snapshot.
    fn snapshot(&self) -> Arc<Preferences> {
        self.data().borrow().clone()
    }

    /// Atomically read, modify and persist the store.
    ///
    /// Edits are serialized. The transform runs against the latest
    /// committed snapshot; the result is persisted and only then published.
    ///
    /// # Returns
    ///
    /// The snapshot after the edit.
    async fn update_data(&self, transform: Transform) -> Result<Arc<Preferences>>;
}

#[async_trait]
impl<T: PrefStore + ?Sized> PrefStore for Arc<T> {
    fn data(&self) -> watch::Receiver<Arc<Preferences>> {
        self.as_ref().data()
    }

    fn snapshot(&self) -> Arc<Preferences> {
        self.as_ref().snapshot()
    }

    async fn update_data(&self, transform: Transform) -> Result<Arc<Preferences>> {
        self.as_ref().update_data(transform).await
    }
}

#[async_trait]
impl<T: PrefStore + ?Sized> PrefStore for Box<T> {
    fn data(&self) -> watch::Receiver<Arc<Preferences>> {
        self.as_ref().data()
    }

    fn snapshot(&self) -> Arc<Preferences> {
        self.as_ref().snapshot()
    }

    async fn update_data(&self, transform: Transform) -> Result<Arc<Preferences>> {
        self.as_ref().update_data(transform).await
    }
}

/// Extension trait for typed single-key access.
///
/// Automatically implemented for every `PrefStore`.
///
/// # Example
///
/// ```rust,ignore
/// use prefstore_core::{bool_key, PrefStoreExt};
///
/// async fn enable_sync(store: &dyn PrefStore) -> Result<(), Error> {
///     store.set(&bool_key("sync_enabled")?, true).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait PrefStoreExt: PrefStore {
    /// Run an infallible edit.
    async fn edit<F>(&self, edit: F) -> Result<Arc<Preferences>>
    where
        F: FnOnce(&mut MutablePreferences) + Send + 'static,
    {
        self.update_data(Box::new(move |prefs| {
            edit(prefs);
            Ok(())
        }))
        .await
    }

    /// Persist a single value.
    async fn set<T: PrefPrimitive>(&self, key: &PrefKey<T>, value: T) -> Result<Arc<Preferences>> {
        let key = key.clone();
        self.edit(move |prefs| prefs.set(&key, value)).await
    }

    /// Remove a single entry.
    async fn remove<T: PrefPrimitive>(&self, key: &PrefKey<T>) -> Result<Arc<Preferences>> {
        let key = key.clone();
        self.edit(move |prefs| {
            prefs.remove(&key);
        })
        .await
    }

    /// Read a single value from the latest snapshot.
    fn get<T: PrefPrimitive>(&self, key: &PrefKey<T>) -> Option<T> {
        self.snapshot().get(key)
    }
}

// Blanket implementation for all PrefStores
#[async_trait]
impl<S: PrefStore + ?Sized> PrefStoreExt for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{int_key, string_key};
    use crate::PreferencesChannel;

    /// Minimal store that never persists.
    struct TestStore {
        channel: PreferencesChannel,
    }

    impl TestStore {
        fn new() -> Self {
            Self {
                channel: PreferencesChannel::new(Preferences::new()),
            }
        }
    }

    #[async_trait]
    impl PrefStore for TestStore {
        fn data(&self) -> watch::Receiver<Arc<Preferences>> {
            self.channel.subscribe()
        }

        async fn update_data(&self, transform: Transform) -> Result<Arc<Preferences>> {
            self.channel.apply(transform, |_| async { Ok(()) }).await
        }
    }

    #[tokio::test]
    async fn typed_set_get_remove() {
        let store = TestStore::new();
        let key = int_key("launches").unwrap();

        store.set(&key, 3).await.unwrap();
        assert_eq!(store.get(&key), Some(3));

        store.remove(&key).await.unwrap();
        assert_eq!(store.get(&key), None);
    }

    #[tokio::test]
    async fn object_safety_works() {
        let store: Arc<dyn PrefStore> = Arc::new(TestStore::new());
        let key = string_key("theme").unwrap();

        store.set(&key, "dark".to_string()).await.unwrap();
        assert_eq!(store.get(&key), Some("dark".to_string()));
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn data_notifies_after_edit() {
        let store = TestStore::new();
        let mut data = store.data();
        let key = int_key("n").unwrap();

        store.set(&key, 1).await.unwrap();
        data.changed().await.unwrap();
        assert_eq!(data.borrow_and_update().get(&key), Some(1));
    }
}
