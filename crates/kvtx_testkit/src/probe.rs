//! Concurrency probes.
//!
//! Each probe drives a store from several threads and reports what it
//! observed about lock ordering. Hand-offs between threads use channels and
//! barriers. Sleeps only give a misbehaving thread time to misbehave; no
//! result depends on one finishing first.

use kvtx_core::Store;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

/// How long a probe lets a blocked thread sit before checking on it.
pub const SETTLE_TIME: Duration = Duration::from_millis(50);

/// Runs `readers` view transactions at once and returns the largest number
/// that were inside their callbacks at the same moment.
///
/// Each reader waits inside its callback until all readers have arrived or
/// `timeout` expires, so a store that serializes readers yields 1.
pub fn max_concurrent_readers(store: &Arc<Store>, readers: usize, timeout: Duration) -> usize {
    let inside = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let start = Arc::new(Barrier::new(readers));

    let handles: Vec<_> = (0..readers)
        .map(|_| {
            let store = Arc::clone(store);
            let inside = Arc::clone(&inside);
            let peak = Arc::clone(&peak);
            let start = Arc::clone(&start);

            thread::spawn(move || {
                start.wait();
                store
                    .view(|_| {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);

                        let deadline = Instant::now() + timeout;
                        while inside.load(Ordering::SeqCst) < readers
                            && Instant::now() < deadline
                        {
                            thread::yield_now();
                        }
                        peak.fetch_max(inside.load(Ordering::SeqCst), Ordering::SeqCst);

                        inside.fetch_sub(1, Ordering::SeqCst);
                        Ok(())
                    })
                    .expect("view failed");
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Reader thread panicked");
    }

    peak.load(Ordering::SeqCst)
}

/// What a writer observed while a reader held the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterOrdering {
    /// The writer's callback ran while the reader was still inside its view.
    pub started_while_reader_held: bool,
    /// The writer's callback ran once the reader had released.
    pub started_after_release: bool,
}

/// Holds a view open, requests an update from another thread, and records
/// whether the update's callback started before the view was released.
pub fn writer_during_reader(store: &Arc<Store>) -> WriterOrdering {
    let (holding_tx, holding_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let writer_started = Arc::new(AtomicBool::new(false));

    let reader = {
        let store = Arc::clone(store);
        thread::spawn(move || {
            store
                .view(|_| {
                    holding_tx.send(()).expect("probe hung up");
                    release_rx.recv().expect("probe hung up");
                    Ok(())
                })
                .expect("view failed");
        })
    };
    holding_rx.recv().expect("reader never acquired the lock");

    let writer = {
        let store = Arc::clone(store);
        let writer_started = Arc::clone(&writer_started);
        thread::spawn(move || {
            store
                .update(|tx| {
                    writer_started.store(true, Ordering::SeqCst);
                    tx.set("probe", "writer")
                })
                .expect("update failed");
        })
    };

    thread::sleep(SETTLE_TIME);
    let started_while_reader_held = writer_started.load(Ordering::SeqCst);

    release_tx.send(()).expect("reader hung up");
    reader.join().expect("Reader thread panicked");
    writer.join().expect("Writer thread panicked");

    WriterOrdering {
        started_while_reader_held,
        started_after_release: writer_started.load(Ordering::SeqCst),
    }
}

/// Order in which two blocked transactions were admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The pending writer ran before the late reader.
    WriterFirst,
    /// The late reader overtook the pending writer.
    ReaderFirst,
}

/// Checks that a pending writer is not overtaken by readers arriving after it.
///
/// A first reader holds the lock, a writer queues behind it, then a second
/// reader arrives. Once the first reader releases, the probe reports which
/// of the two waiting transactions ran first.
pub fn late_reader_vs_pending_writer(store: &Arc<Store>) -> Admission {
    let (holding_tx, holding_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let order = Arc::new(AtomicUsize::new(0));
    let writer_slot = Arc::new(AtomicUsize::new(0));
    let reader_slot = Arc::new(AtomicUsize::new(0));

    let first_reader = {
        let store = Arc::clone(store);
        thread::spawn(move || {
            store
                .view(|_| {
                    holding_tx.send(()).expect("probe hung up");
                    release_rx.recv().expect("probe hung up");
                    Ok(())
                })
                .expect("view failed");
        })
    };
    holding_rx.recv().expect("reader never acquired the lock");

    let writer = {
        let store = Arc::clone(store);
        let order = Arc::clone(&order);
        let slot = Arc::clone(&writer_slot);
        thread::spawn(move || {
            store
                .update(|_| {
                    slot.store(order.fetch_add(1, Ordering::SeqCst) + 1, Ordering::SeqCst);
                    Ok(())
                })
                .expect("update failed");
        })
    };
    thread::sleep(SETTLE_TIME);

    let late_reader = {
        let store = Arc::clone(store);
        let order = Arc::clone(&order);
        let slot = Arc::clone(&reader_slot);
        thread::spawn(move || {
            store
                .view(|_| {
                    slot.store(order.fetch_add(1, Ordering::SeqCst) + 1, Ordering::SeqCst);
                    Ok(())
                })
                .expect("view failed");
        })
    };
    thread::sleep(SETTLE_TIME);

    release_tx.send(()).expect("reader hung up");
    first_reader.join().expect("Reader thread panicked");
    writer.join().expect("Writer thread panicked");
    late_reader.join().expect("Reader thread panicked");

    if writer_slot.load(Ordering::SeqCst) < reader_slot.load(Ordering::SeqCst) {
        Admission::WriterFirst
    } else {
        Admission::ReaderFirst
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::shared_store;

    #[test]
    fn readers_overlap() {
        let store = shared_store();
        assert_eq!(max_concurrent_readers(&store, 4, Duration::from_secs(5)), 4);
    }

    #[test]
    fn writer_waits_for_reader() {
        let store = shared_store();
        let ordering = writer_during_reader(&store);

        assert!(!ordering.started_while_reader_held);
        assert!(ordering.started_after_release);
    }
}
