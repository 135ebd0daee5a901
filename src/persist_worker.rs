//! Background saver for usage statistics.
//!
//! Lookups only flag that a save is due; the actual write happens on the
//! `romaji-persist` thread so learning never waits on disk I/O.

use std::io;
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use romaji_core::usage_stats::UsageStats;
use tracing::{debug, warn};

pub(crate) struct SaveWork {
    pub requested_at: Instant,
}

pub(crate) struct PersistWorker {
    tx: Option<mpsc::Sender<SaveWork>>,
    handle: Option<JoinHandle<()>>,
}

impl PersistWorker {
    pub fn spawn(stats: Arc<UsageStats>) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel::<SaveWork>();
        let handle = thread::Builder::new()
            .name("romaji-persist".into())
            .spawn(move || persist_worker(rx, stats))?;
        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    pub fn submit(&self) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(SaveWork {
                requested_at: Instant::now(),
            });
        }
    }

    /// Stop accepting work and wait for queued saves to finish.
    pub fn shutdown(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("persistence worker panicked");
            }
        }
    }
}

impl Drop for PersistWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn persist_worker(rx: mpsc::Receiver<SaveWork>, stats: Arc<UsageStats>) {
    while let Ok(work) = rx.recv() {
        // Drain: one save covers every queued request
        let mut latest = work;
        let mut coalesced = 0usize;
        while let Ok(newer) = rx.try_recv() {
            latest = newer;
            coalesced += 1;
        }

        match stats.save() {
            Ok(()) => debug!(
                coalesced,
                waited_ms = latest.requested_at.elapsed().as_millis() as u64,
                "usage statistics persisted"
            ),
            Err(e) => warn!(error = %e, "background save of usage statistics failed"),
        }
    }
}
