use crate::{
    outcome::{Outcome, ResultCollection},
    probe::Prober,
    progress::ProgressSink,
    report::OutputMode,
    store::ResultStore,
};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Probe every target on its own thread and collect one outcome per target.
///
/// Returns only after every worker has submitted, so the collection is
/// complete.
pub fn run_probes<P: Prober>(
    targets: &[String],
    prober: &P,
    mode: OutputMode,
    progress: Box<dyn ProgressSink>,
) -> ResultCollection {
    let started = Instant::now();
    let store = ResultStore::new(targets.len(), mode, progress);
    info!("probing {} targets", targets.len());

    std::thread::scope(|s| {
        for target in targets {
            let store = &store;
            s.spawn(move || {
                // Every worker submits exactly once, even if its probe panics.
                match catch_unwind(AssertUnwindSafe(|| prober.probe(target))) {
                    Ok(Ok(outcome)) => store.submit(Some(outcome), None::<String>),
                    Ok(Err(err)) => {
                        warn!("probe {target} not attempted: {err:#}");
                        store.submit(Some(Outcome::failed(target.as_str())), Some(format!("{err:#}")));
                    }
                    Err(_) => {
                        warn!("probe {target} panicked");
                        store.submit(Some(Outcome::failed(target.as_str())), Some("probe panicked"));
                    }
                }
            });
        }
    });

    debug!(
        "workers joined remaining={} active={} elapsed={:?}",
        store.remaining_workers(),
        store.active_workers(),
        started.elapsed()
    );
    store.finish()
}
