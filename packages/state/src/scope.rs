//! Execution scope owning cell subscription and write tasks.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use prefstore_core::{Error, Result};

/// The execution context cells run their background work on.
///
/// Every task spawned through a scope is cancelled when the scope shuts
/// down, either explicitly via [`shutdown`](Self::shutdown) or when the last
/// clone is dropped. There is no way to cancel a single cell's subscription.
#[derive(Clone, Debug)]
pub struct PrefScope {
    inner: Arc<ScopeInner>,
}

#[derive(Debug)]
struct ScopeInner {
    handle: Handle,
    shutdown_tx: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl PrefScope {
    /// Create a scope spawning onto the given runtime.
    pub fn new(handle: Handle) -> Self {
        let (shutdown_tx, _shutdown_rx) = watch::channel(false);
        Self {
            inner: Arc::new(ScopeInner {
                handle,
                shutdown_tx,
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Create a scope on the runtime the caller is running in.
    pub fn current() -> Result<Self> {
        let handle = Handle::try_current()
            .map_err(|e| Error::other(format!("no tokio runtime for preference scope: {}", e)))?;
        Ok(Self::new(handle))
    }

    pub fn handle(&self) -> &Handle {
        &self.inner.handle
    }

    /// Spawn a task that is cancelled when the scope shuts down.
    ///
    /// After shutdown the future is dropped without running.
    pub fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.is_shut_down() {
            tracing::debug!("preference scope is shut down, dropping task");
            return;
        }

        let shutdown_rx = self.inner.shutdown_tx.subscribe();
        let handle = self.inner.handle.spawn(async move {
            tokio::select! {
                _ = stopped(shutdown_rx) => {}
                _ = fut => {}
            }
        });

        let mut tasks = self.inner.tasks();
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }

    /// Cancel every task spawned through this scope.
    pub fn shutdown(&self) {
        self.inner.shutdown();
    }

    pub fn is_shut_down(&self) -> bool {
        *self.inner.shutdown_tx.borrow()
    }

    /// Number of tasks still running.
    pub fn active_tasks(&self) -> usize {
        self.inner
            .tasks()
            .iter()
            .filter(|task| !task.is_finished())
            .count()
    }
}

async fn stopped(mut shutdown_rx: watch::Receiver<bool>) {
    loop {
        if *shutdown_rx.borrow() {
            return;
        }
        if shutdown_rx.changed().await.is_err() {
            return;
        }
    }
}

impl ScopeInner {
    // A panic while the registry is locked leaves the list itself intact.
    fn tasks(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
        for task in self.tasks().drain(..) {
            task.abort();
        }
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        self.shutdown();
    }
}
