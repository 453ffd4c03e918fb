// Snapshot store: single writer, many readers, whole-record replacement.
// Backed by a watch channel, so a read always sees one complete publish.

use crate::models::AggregateSnapshot;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// Creates an empty store. Reads return `AggregateSnapshot::default()` until
/// the first publish.
pub fn snapshot_store() -> (SnapshotWriter, SnapshotReader) {
    let (tx, rx) = watch::channel(AggregateSnapshot::default());
    let generation = Arc::new(AtomicU64::new(0));
    (
        SnapshotWriter {
            tx,
            generation: generation.clone(),
        },
        SnapshotReader { rx, generation },
    )
}

/// The only handle that can publish. Not `Clone`.
#[derive(Debug)]
pub struct SnapshotWriter {
    tx: watch::Sender<AggregateSnapshot>,
    generation: Arc<AtomicU64>,
}

impl SnapshotWriter {
    /// Replaces the stored snapshot wholesale. Works with or without readers.
    pub fn publish(&self, snapshot: AggregateSnapshot) {
        self.tx.send_replace(snapshot);
        self.generation.fetch_add(1, Ordering::Release);
    }

    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader {
            rx: self.tx.subscribe(),
            generation: self.generation.clone(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

/// Read-only handle. Cheap to clone, one per presenter.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    rx: watch::Receiver<AggregateSnapshot>,
    generation: Arc<AtomicU64>,
}

impl SnapshotReader {
    /// Latest published snapshot (copied out; the borrow is never held).
    pub fn read(&self) -> AggregateSnapshot {
        *self.rx.borrow()
    }

    /// Number of publishes so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}
