//! Subscription seam between record backends and the live dashboard.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{Collection, FeedUpdate};

/// A backend that can stream snapshots of a collection.
///
/// Implementations spawn a task on the current tokio runtime that pushes
/// [`FeedUpdate`]s into `sink` for as long as the returned [`Subscription`]
/// is alive.
pub trait RecordSource: Send + Sync {
    fn subscribe(
        &self,
        collection: Collection,
        owner_id: &str,
        sink: mpsc::Sender<FeedUpdate>,
    ) -> Subscription;
}

/// Handle to a running subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    collection: Collection,
    handle: JoinHandle<()>,
}

impl Subscription {
    pub fn new(collection: Collection, handle: JoinHandle<()>) -> Self {
        Self { collection, handle }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// Whether the feed task has stopped on its own.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        tracing::debug!(collection = %self.collection, "Unsubscribing");
        self.handle.abort();
    }
}

/// Subscribe to all four collections for `owner_id`.
pub fn subscribe_all(
    source: &dyn RecordSource,
    owner_id: &str,
    sink: &mpsc::Sender<FeedUpdate>,
) -> Vec<Subscription> {
    Collection::ALL
        .iter()
        .map(|&collection| source.subscribe(collection, owner_id, sink.clone()))
        .collect()
}
