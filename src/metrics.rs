use std::sync::atomic::{AtomicUsize, Ordering};

/// Outcome counters for one collector instance.
///
/// Purpose:
/// - Count per-app outcomes of a batch run
/// - Produce a single summary line at the end of `run_all`
///
/// Design:
/// - Atomics so `&self` operations can update them
/// - Owned by the collector (no process-wide registry)
#[derive(Debug, Default)]
pub struct RunMetrics {
    pub not_applicable: AtomicUsize,
    pub skipped: AtomicUsize,

    // Source
    pub fetched: AtomicUsize,
    pub fetch_errors: AtomicUsize,
    pub reviews_received: AtomicUsize,

    // Output
    pub files_written: AtomicUsize,
    pub rows_written: AtomicUsize,
    pub empty_unsaved: AtomicUsize,
    pub persist_errors: AtomicUsize,
}

impl RunMetrics {
    pub(crate) fn incr(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add(counter: &AtomicUsize, n: usize) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::Relaxed)
    }

    pub fn summary(&self) -> String {
        format!(
            "[METRICS] fetched={} skipped={} fetch_err={} reviews={} files={} rows={} empty={} persist_err={} not_applicable={}",
            Self::get(&self.fetched),
            Self::get(&self.skipped),
            Self::get(&self.fetch_errors),
            Self::get(&self.reviews_received),
            Self::get(&self.files_written),
            Self::get(&self.rows_written),
            Self::get(&self.empty_unsaved),
            Self::get(&self.persist_errors),
            Self::get(&self.not_applicable),
        )
    }
}
