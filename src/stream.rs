//! Push-style traversal: a producer thread feeding a bounded channel.
//!
//! The producer walks a snapshot of the trie (a cloned root handle), so
//! the map it came from may keep changing while the stream is consumed.

use std::iter::FusedIterator;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use std::{fmt, panic};

use tracing::debug;

use crate::hash::Width;
use crate::iter::Iter;
use crate::table::Table;

/// How long a producer facing a full buffer sleeps before re-checking for
/// cancellation. Consumers wake it earlier after every receive.
const FULL_BUFFER_PARK: Duration = Duration::from_millis(1);

/// Shared cancellation flag for [`Stream`]s.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag. Every stream watching this token stops before its
    /// next send.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CancelToken")
            .field(&self.is_cancelled())
            .finish()
    }
}

/// Cancellable stream of `(K, V)` pairs produced on a background thread.
///
/// Ends when the trie is exhausted or the token is cancelled. Dropping
/// the stream disconnects and joins the producer.
pub struct Stream<K, V> {
    rx: Option<Receiver<(K, V)>>,
    token: CancelToken,
    producer: Option<JoinHandle<()>>,
}

impl<K, V> Stream<K, V>
where
    K: Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Starts a producer over `root`. A `buffer` of zero is treated as one.
    pub(crate) fn spawn<W: Width>(
        root: Option<Arc<Table<K, V, W>>>,
        buffer: usize,
        token: CancelToken,
    ) -> Self {
        let (tx, rx) = mpsc::sync_channel(buffer.max(1));
        let producer_token = token.clone();
        let producer = thread::spawn(move || produce(root.as_deref(), &tx, &producer_token));
        Self {
            rx: Some(rx),
            token,
            producer: Some(producer),
        }
    }
}

impl<K, V> Stream<K, V> {
    /// Cancels this stream's token.
    pub fn cancel(&self) {
        self.token.cancel();
        self.wake();
    }

    fn wake(&self) {
        if let Some(producer) = &self.producer {
            producer.thread().unpark();
        }
    }

    /// Disconnects and joins the producer, returning its panic if any.
    fn shutdown(&mut self) -> thread::Result<()> {
        self.rx = None;
        let Some(producer) = self.producer.take() else {
            return Ok(());
        };
        producer.thread().unpark();
        producer.join()
    }
}

impl<K, V> Iterator for Stream<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.token.is_cancelled() {
            if let Err(payload) = self.shutdown() {
                panic::resume_unwind(payload);
            }
            return None;
        }
        self.wake();
        let Ok(item) = self.rx.as_ref()?.recv() else {
            if let Err(payload) = self.shutdown() {
                panic::resume_unwind(payload);
            }
            return None;
        };
        self.wake();
        Some(item)
    }
}

impl<K, V> FusedIterator for Stream<K, V> {}

impl<K, V> Drop for Stream<K, V> {
    fn drop(&mut self) {
        // A producer panic has already been reported on its thread.
        let _ = self.shutdown();
    }
}

impl<K, V> fmt::Debug for Stream<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("token", &self.token)
            .field("running", &self.producer.is_some())
            .finish()
    }
}

fn produce<K: Clone, V: Clone, W: Width>(
    root: Option<&Table<K, V, W>>,
    tx: &SyncSender<(K, V)>,
    token: &CancelToken,
) {
    let mut sent = 0_usize;
    for (key, value) in Iter::new(root) {
        let mut item = (key.clone(), value.clone());
        loop {
            if token.is_cancelled() {
                debug!(target: "hamt::stream", sent, "producer cancelled");
                return;
            }
            match tx.try_send(item) {
                Ok(()) => break,
                Err(TrySendError::Full(back)) => {
                    item = back;
                    thread::park_timeout(FULL_BUFFER_PARK);
                }
                Err(TrySendError::Disconnected(_)) => {
                    debug!(target: "hamt::stream", sent, "consumer hung up");
                    return;
                }
            }
        }
        sent += 1;
    }
    debug!(target: "hamt::stream", sent, "producer finished");
}
