//! Observable cell bound to one typed preference.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use prefstore_core::{PrefKey, PrefPrimitive, PrefStore, PrefStoreExt, Result};

use crate::scope::PrefScope;
use crate::state::{MutableState, StateStream};

/// A mutable, observable view of one preference.
///
/// The cell caches the last value delivered by the store's change stream
/// (or its default, before the first delivery and whenever the entry is
/// missing). [`get`](Self::get) reads that cache; [`set`](Self::set) hands
/// the value to the store in the background and does not touch the cache.
/// The written value shows up in the cache once the store commits it and
/// the change stream delivers it.
///
/// Clones share the same cache.
pub struct PrefCell<T: PrefPrimitive> {
    key: PrefKey<T>,
    default: T,
    cache: Arc<watch::Sender<T>>,
    store: Arc<dyn PrefStore>,
    scope: PrefScope,
}

impl<T: PrefPrimitive> PrefCell<T> {
    /// Create the cell and start its subscription on `scope`.
    pub(crate) fn observe(
        store: Arc<dyn PrefStore>,
        scope: PrefScope,
        key: PrefKey<T>,
        default: T,
    ) -> Self {
        let (cache, _receiver) = watch::channel(default.clone());
        let cache = Arc::new(cache);

        let mut data = store.data();
        let sink = cache.clone();
        let task_key = key.clone();
        let fallback = default.clone();
        scope.spawn(async move {
            loop {
                let value = {
                    let snapshot = data.borrow_and_update();
                    snapshot.get(&task_key).unwrap_or_else(|| fallback.clone())
                };
                publish(&sink, value);

                if data.changed().await.is_err() {
                    tracing::debug!(key = %task_key, "preference store closed, ending subscription");
                    break;
                }
            }
        });

        Self {
            key,
            default,
            cache,
            store,
            scope,
        }
    }

    pub fn key(&self) -> &PrefKey<T> {
        &self.key
    }

    pub fn name(&self) -> &str {
        self.key.name()
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// The last value delivered by the store, or the default.
    pub fn get(&self) -> T {
        self.cache.borrow().clone()
    }

    /// Schedule a write of `value`.
    ///
    /// Failures are logged and otherwise discarded. Use
    /// [`write`](Self::write) to observe them.
    pub fn set(&self, value: T) {
        let store = self.store.clone();
        let key = self.key.clone();
        self.scope.spawn(async move {
            if let Err(err) = store.set(&key, value).await {
                tracing::error!(key = %key, error = %err, "failed to persist preference");
            }
        });
    }

    /// Write `value` and wait for the store to commit it.
    ///
    /// The cache is still only updated through the change stream, which
    /// may deliver shortly after this returns.
    pub async fn write(&self, value: T) -> Result<()> {
        self.store.set(&self.key, value).await?;
        Ok(())
    }

    /// Schedule removal of the entry, returning the cell to its default.
    pub fn reset(&self) {
        let store = self.store.clone();
        let key = self.key.clone();
        self.scope.spawn(async move {
            if let Err(err) = store.remove(&key).await {
                tracing::error!(key = %key, error = %err, "failed to remove preference");
            }
        });
    }

    pub fn subscribe(&self) -> StateStream<T> {
        StateStream::new(self.watch())
    }

    pub(crate) fn watch(&self) -> watch::Receiver<T> {
        self.cache.subscribe()
    }

    /// Run `callback` with every value delivered after this call.
    ///
    /// The callback runs on the cell's scope and stops with it.
    pub fn on_change<F>(&self, mut callback: F)
    where
        F: FnMut(T) + Send + 'static,
    {
        let mut stream = self.subscribe();
        stream.current();
        self.scope.spawn(async move {
            while let Ok(value) = stream.changed().await {
                callback(value);
            }
        });
    }
}

// Consecutive equal deliveries are collapsed so subscribers only wake on
// real changes. Floats compare by bit pattern so a cached NaN stays quiet.
fn publish<T: PrefPrimitive>(sink: &watch::Sender<T>, value: T) {
    sink.send_if_modified(|current| {
        if current.same_value(&value) {
            false
        } else {
            *current = value;
            true
        }
    });
}

impl<T: PrefPrimitive> MutableState<T> for PrefCell<T> {
    fn get(&self) -> T {
        PrefCell::get(self)
    }

    fn set(&self, value: T) {
        PrefCell::set(self, value)
    }

    fn subscribe(&self) -> StateStream<T> {
        PrefCell::subscribe(self)
    }
}

impl<T: PrefPrimitive> Clone for PrefCell<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            default: self.default.clone(),
            cache: self.cache.clone(),
            store: self.store.clone(),
            scope: self.scope.clone(),
        }
    }
}

impl<T: PrefPrimitive> fmt::Debug for PrefCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrefCell")
            .field("key", &self.key)
            .field("value", &*self.cache.borrow())
            .finish()
    }
}
