//! In-memory preference store.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use prefstore_core::{PrefStore, Preferences, PreferencesChannel, Result, Transform};

/// A preference store that keeps its snapshot in memory only.
///
/// Edits are serialized and published exactly like the file-backed store,
/// which makes this the store of choice for tests.
///
/// # Example
///
/// ```rust,ignore
/// use prefstore_json::InMemoryPrefStore;
/// use prefstore_core::{string_key, PrefStoreExt};
///
/// let store = InMemoryPrefStore::new();
/// store.set(&string_key("theme")?, "dark".to_string()).await?;
/// assert_eq!(store.get(&string_key("theme")?), Some("dark".to_string()));
/// ```
pub struct InMemoryPrefStore {
    channel: PreferencesChannel,
}

impl InMemoryPrefStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::with_data(Preferences::new())
    }

    /// Create a store with initial data.
    pub fn with_data(initial: Preferences) -> Self {
        Self {
            channel: PreferencesChannel::new(initial),
        }
    }
}

impl Default for InMemoryPrefStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PrefStore for InMemoryPrefStore {
    fn data(&self) -> watch::Receiver<Arc<Preferences>> {
        self.channel.subscribe()
    }

    fn snapshot(&self) -> Arc<Preferences> {
        self.channel.current()
    }

    async fn update_data(&self, transform: Transform) -> Result<Arc<Preferences>> {
        self.channel.apply(transform, |_| async { Ok(()) }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collection_literals::btree;
    use prefstore_core::{bool_key, int_key, PrefStoreExt, PrefValue};

    #[tokio::test]
    async fn basic_set_get() {
        let store = InMemoryPrefStore::new();
        let key = bool_key("notifications").unwrap();

        store.set(&key, true).await.unwrap();
        assert_eq!(store.get(&key), Some(true));
    }

    #[tokio::test]
    async fn with_data_constructor() {
        let store = InMemoryPrefStore::with_data(Preferences::from_entries(btree! {
            "volume".to_string() => PrefValue::Int(11),
        }));

        assert_eq!(store.get(&int_key("volume").unwrap()), Some(11));
    }

    #[tokio::test]
    async fn overwrite_works() {
        let store = InMemoryPrefStore::new();
        let key = int_key("volume").unwrap();

        store.set(&key, 1).await.unwrap();
        store.set(&key, 2).await.unwrap();

        assert_eq!(store.get(&key), Some(2));
    }

    #[tokio::test]
    async fn concurrent_edits_are_serialized() {
        let store = Arc::new(InMemoryPrefStore::new());
        let key = int_key("counter").unwrap();

        let mut tasks = Vec::new();
        for _ in 0..20 {
            let store = store.clone();
            let key = key.clone();
            tasks.push(tokio::spawn(async move {
                store
                    .edit(move |prefs| {
                        let next = prefs.get(&key).unwrap_or(0) + 1;
                        prefs.set(&key, next);
                    })
                    .await
                    .unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.get(&key), Some(20));
    }
}
