//! Demo command implementation.
//!
//! One thread writes `mykey`, `mykey2` and `mykey3` in a single update while
//! another reads `mykey3` in a view. By default the reader waits for the
//! writer's signal, so it always sees `awesome`. With `--race` both start at
//! once and the reader may run first and see an empty value.

use kvtx_core::{Config, CoreResult, Store};
use std::sync::{mpsc, Arc};
use std::thread;
use tracing::info;

/// Entries written by the demo writer.
pub const DEMO_ENTRIES: [(&str, &str); 3] =
    [("mykey", "go"), ("mykey2", "is"), ("mykey3", "awesome")];

/// Key the demo reader looks up.
pub const DEMO_READ_KEY: &str = "mykey3";

/// Runs the demo command.
pub fn run(race: bool) -> Result<(), Box<dyn std::error::Error>> {
    let value = execute(race)?;
    println!("value is");
    println!("{value}");
    Ok(())
}

/// Runs the writer and reader threads and returns what the reader saw.
pub fn execute(race: bool) -> Result<String, Box<dyn std::error::Error>> {
    let store = Arc::new(Store::with_config(Config::new().log_values(true)));
    let (written_tx, written_rx) = mpsc::channel();

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || -> CoreResult<()> {
            store.update(|tx| {
                for (key, value) in DEMO_ENTRIES {
                    tx.set(key, value)?;
                }
                Ok(())
            })?;
            // The reader may have stopped listening in race mode.
            let _ = written_tx.send(());
            Ok(())
        })
    };

    let reader = {
        let store = Arc::clone(&store);
        thread::spawn(move || -> CoreResult<String> {
            if !race {
                // A closed channel means the writer failed; read anyway.
                let _ = written_rx.recv();
            }
            store.view(|tx| Ok(tx.get(DEMO_READ_KEY)))
        })
    };

    writer.join().map_err(|_| "writer thread panicked")??;
    let value = reader.join().map_err(|_| "reader thread panicked")??;

    let stats = store.stats().snapshot();
    info!(
        reads = stats.read_transactions,
        writes = stats.write_transactions,
        sets = stats.sets,
        "demo finished"
    );

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written_value(key: &str) -> &'static str {
        DEMO_ENTRIES
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
            .expect("read key is not among the written entries")
    }

    #[test]
    fn read_key_is_written_by_demo() {
        assert_eq!(written_value(DEMO_READ_KEY), "awesome");
    }

    #[test]
    fn sequenced_demo_reads_written_value() {
        for _ in 0..5 {
            assert_eq!(execute(false).unwrap(), written_value(DEMO_READ_KEY));
        }
    }

    #[test]
    fn race_demo_reads_whole_update_or_nothing() {
        let value = execute(true).unwrap();
        assert!(value.is_empty() || value == written_value(DEMO_READ_KEY));
    }
}
