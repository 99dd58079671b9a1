//! Edit serialization and change publication shared by store implementations.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::preferences::Preferences;
use crate::traits::Transform;
use crate::Result;

/// The publish side of a store's change stream.
///
/// Holds the committed snapshot and serializes edits against it. A store
/// implementation only has to supply the persistence step; see
/// [`apply`](Self::apply).
pub struct PreferencesChannel {
    sender: watch::Sender<Arc<Preferences>>,
    edits: Mutex<()>,
}

impl PreferencesChannel {
    pub fn new(initial: Preferences) -> Self {
        let (sender, _receiver) = watch::channel(Arc::new(initial));
        Self {
            sender,
            edits: Mutex::new(()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Preferences>> {
        self.sender.subscribe()
    }

    pub fn current(&self) -> Arc<Preferences> {
        self.sender.borrow().clone()
    }

    /// Run one edit transaction.
    ///
    /// The transform sees the latest committed snapshot. If it yields an
    /// equal snapshot nothing is persisted or published. Otherwise `persist`
    /// is awaited and, only if it succeeds, the new snapshot is published.
    pub async fn apply<P, Fut>(&self, transform: Transform, persist: P) -> Result<Arc<Preferences>>
    where
        P: FnOnce(Arc<Preferences>) -> Fut + Send,
        Fut: Future<Output = Result<()>> + Send,
    {
        let _guard = self.edits.lock().await;

        let current = self.current();
        let mut scratch = current.to_mutable();
        transform(&mut scratch)?;
        let next = scratch.freeze();

        if next == *current {
            tracing::trace!("edit left preferences unchanged");
            return Ok(current);
        }

        let next = Arc::new(next);
        persist(next.clone()).await?;
        self.sender.send_replace(next.clone());
        Ok(next)
    }
}
