//! The read/write/subscribe contract shared by preference cells.

use std::fmt;

use async_trait::async_trait;
use tokio::sync::watch;

use prefstore_core::{Error, Result};

/// A value that can be read synchronously, written asynchronously, and
/// observed.
///
/// Reads never touch storage: they return whatever the implementation last
/// cached. Writes are accepted immediately and applied in the background, so
/// a read right after `set` may still return the previous value.
///
/// `W` is what writes accept and `R` what reads yield. Primitive cells use
/// one type for both; enum cells write `E` and read `Result<E>`, because a
/// stored name may match no constant.
pub trait MutableState<W, R = W>: Send + Sync {
    /// The current cached value.
    fn get(&self) -> R;

    /// Schedule a write. Never blocks and never reports failure.
    fn set(&self, value: W);

    /// Observe future changes to the cached value.
    fn subscribe(&self) -> StateStream<R>;
}

#[async_trait]
trait Source<T>: Send + Sync {
    fn read(&mut self) -> T;

    async fn changed(&mut self) -> Result<()>;
}

/// A watch receiver whose values are converted on every read.
struct Mapped<S, T> {
    receiver: watch::Receiver<S>,
    convert: fn(&S) -> T,
}

#[async_trait]
impl<S, T> Source<T> for Mapped<S, T>
where
    S: Send + Sync + 'static,
    T: 'static,
{
    fn read(&mut self) -> T {
        let convert = self.convert;
        let current = self.receiver.borrow_and_update();
        convert(&*current)
    }

    async fn changed(&mut self) -> Result<()> {
        self.receiver.changed().await.map_err(|_| Error::Closed)
    }
}

/// Observer of a cell's cached value.
pub struct StateStream<T> {
    source: Box<dyn Source<T>>,
}

impl<T: Clone + Send + Sync + 'static> StateStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<T>) -> Self {
        Self::mapped(receiver, T::clone)
    }
}

impl<T: 'static> StateStream<T> {
    /// Observe `receiver`, converting each value with `convert`.
    pub(crate) fn mapped<S>(receiver: watch::Receiver<S>, convert: fn(&S) -> T) -> Self
    where
        S: Send + Sync + 'static,
    {
        Self {
            source: Box::new(Mapped { receiver, convert }),
        }
    }

    /// The latest value, marking it as seen.
    pub fn current(&mut self) -> T {
        self.source.read()
    }

    /// Wait for the next value that has not been seen yet.
    ///
    /// Fails with [`Error::Closed`] once the cell and its subscription are
    /// both gone.
    pub async fn changed(&mut self) -> Result<T> {
        self.source.changed().await?;
        Ok(self.current())
    }

    /// Wait until the value satisfies `predicate`, checking the current
    /// value first.
    pub async fn wait_for<F>(&mut self, mut predicate: F) -> Result<T>
    where
        F: FnMut(&T) -> bool,
    {
        loop {
            let value = self.current();
            if predicate(&value) {
                return Ok(value);
            }
            self.changed().await?;
        }
    }
}

impl<T> fmt::Debug for StateStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStream").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn changed_yields_new_values() {
        let (tx, rx) = watch::channel(1);
        let mut stream = StateStream::new(rx);
        assert_eq!(stream.current(), 1);

        tx.send_replace(2);
        assert_eq!(stream.changed().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn wait_for_checks_current_value_first() {
        let (_tx, rx) = watch::channel(5);
        let mut stream = StateStream::new(rx);
        assert_eq!(stream.wait_for(|v| *v == 5).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn mapped_stream_converts_each_value() {
        let (tx, rx) = watch::channel("one".to_string());
        let mut stream = StateStream::mapped(rx, |s: &String| s.len());
        assert_eq!(stream.current(), 3);

        tx.send_replace("three".to_string());
        assert_eq!(stream.changed().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn closed_sender_reports_closed() {
        let (tx, rx) = watch::channel(0);
        let mut stream = StateStream::new(rx);
        drop(tx);
        assert!(matches!(stream.changed().await, Err(Error::Closed)));
        assert!(matches!(stream.wait_for(|v| *v == 1).await, Err(Error::Closed)));
    }
}
