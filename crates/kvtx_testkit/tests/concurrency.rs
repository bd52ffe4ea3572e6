//! Cross-thread behaviour of managed transactions.

use kvtx_core::{CoreError, CoreResult};
use kvtx_testkit::prelude::*;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

#[test]
fn concurrent_views_do_not_block_each_other() {
    let store = scenarios::populated_store(8);
    let peak = max_concurrent_readers(&store, 8, Duration::from_secs(5));
    assert_eq!(peak, 8);
}

#[test]
fn writer_callback_waits_for_reader_release() {
    let store = shared_store();
    let ordering = writer_during_reader(&store);

    assert_eq!(
        ordering,
        WriterOrdering {
            started_while_reader_held: false,
            started_after_release: true,
        }
    );
    let value = store.view(|tx| Ok(tx.get("probe"))).unwrap();
    assert_eq!(value, "writer");
}

#[test]
fn pending_writer_is_not_overtaken_by_late_reader() {
    let store = shared_store();
    assert_eq!(late_reader_vs_pending_writer(&store), Admission::WriterFirst);
}

#[test]
fn update_then_view_across_threads_round_trips() {
    let store = shared_store();
    let (done_tx, done_rx) = mpsc::channel();

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            store.update(|tx| tx.set("k", "v")).unwrap();
            done_tx.send(()).unwrap();
        })
    };

    let reader = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            done_rx.recv().unwrap();
            store.view(|tx| Ok(tx.get("k"))).unwrap()
        })
    };

    writer.join().unwrap();
    assert_eq!(reader.join().unwrap(), "v");
}

#[test]
fn failed_callbacks_leave_lock_free_for_other_threads() {
    let store = shared_store();

    let failing = {
        let store = Arc::clone(&store);
        thread::spawn(move || -> CoreResult<()> {
            store.update(|tx| {
                tx.set("half", "done")?;
                Err(CoreError::aborted("stop"))
            })
        })
    };
    assert!(failing.join().unwrap().is_err());

    let follow_up = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            store.update(|tx| tx.set("after", "ok")).unwrap();
            store.view(|tx| Ok((tx.get("half"), tx.get("after")))).unwrap()
        })
    };

    let (half, after) = follow_up.join().unwrap();
    assert_eq!(half, "done");
    assert_eq!(after, "ok");
}

#[test]
fn last_write_wins_across_sequenced_writers() {
    let store = shared_store();

    for round in 0..10 {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            store
                .update(|tx| tx.set("shared", format!("round-{round}")))
                .unwrap();
        })
        .join()
        .unwrap();
    }

    let value = store.view(|tx| Ok(tx.get("shared"))).unwrap();
    assert_eq!(value, "round-9");
}

#[test]
fn closing_rejects_new_transactions_from_all_threads() {
    let store = shared_store();
    store.close();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.view(|tx| Ok(tx.len())))
        })
        .collect();

    for handle in handles {
        assert!(matches!(handle.join().unwrap(), Err(CoreError::StoreClosed)));
    }
}

#[test]
fn counter_increments_are_not_lost() {
    let config = StressConfig {
        operations: 2_000,
        threads: 8,
        ..Default::default()
    };

    let (result, count) = stress_counter_increments(shared_store(), &config);

    assert_eq!(result.failed_ops, 0);
    assert_eq!(count, 2_000);
}
