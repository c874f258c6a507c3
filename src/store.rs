use crate::{
    outcome::{Outcome, ResultCollection},
    progress::ProgressSink,
    report::OutputMode,
};
use std::fmt::Display;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{trace, warn};

/// Shared sink that every worker reports its outcome into, exactly once.
///
/// Workers borrow the store for the collection phase; [`ResultStore::finish`]
/// hands the collection to the reporter once they have all been joined.
pub struct ResultStore {
    results: Mutex<ResultCollection>,
    counters: ProgressCounters,
    mode: OutputMode,
    progress: Box<dyn ProgressSink>,
}

#[derive(Debug)]
struct ProgressCounters {
    remaining_workers: AtomicUsize,
    active_workers: AtomicUsize,
}

impl ResultStore {
    pub fn new(total_workers: usize, mode: OutputMode, progress: Box<dyn ProgressSink>) -> Self {
        Self {
            results: Mutex::new(Vec::with_capacity(total_workers)),
            counters: ProgressCounters {
                remaining_workers: AtomicUsize::new(total_workers),
                active_workers: AtomicUsize::new(0),
            },
            mode,
            progress,
        }
    }

    /// Record one finished worker. A missing outcome is replaced by an empty
    /// one; a supplied error overwrites whatever error the outcome carried.
    pub fn submit<E: Display>(&self, outcome: Option<Outcome>, error: Option<E>) {
        let mut outcome = outcome.unwrap_or_default();
        if let Some(err) = error {
            outcome.error = Some(err.to_string());
        }
        trace!(target_addr = %outcome.target, status = outcome.status_code, "submit");

        self.results
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Some(outcome));

        self.counters.active_workers.fetch_add(1, Ordering::SeqCst);
        let prev = self.counters.remaining_workers.fetch_update(
            Ordering::SeqCst,
            Ordering::SeqCst,
            |n| n.checked_sub(1),
        );
        if prev.is_err() {
            warn!("submit called more times than there are workers");
        }

        if self.mode == OutputMode::Plaintext {
            self.advance_progress();
        }
    }

    fn advance_progress(&self) {
        if catch_unwind(AssertUnwindSafe(|| self.progress.advance())).is_err() {
            warn!("progress indicator panicked; ignoring");
        }
    }

    pub fn remaining_workers(&self) -> usize {
        self.counters.remaining_workers.load(Ordering::SeqCst)
    }

    pub fn active_workers(&self) -> usize {
        self.counters.active_workers.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.results
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// End the collection phase and take ownership of every submitted outcome.
    pub fn finish(self) -> ResultCollection {
        self.results
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
