use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::recorder::LatencyRecorder;
use crate::target::UpdateTarget;

/// Per-worker completion tally, returned through the join barrier.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerReport {
    pub completed: u64,
    pub failed: u64,
}

/// Issue `iterations` updates against the shared row, recording each
/// successful operation's wall-clock latency in microseconds.
///
/// Session setup failure propagates and is fatal. A failed individual
/// update is logged and skipped: it contributes no sample and is not
/// retried.
pub async fn run_updates(
    worker_id: u32,
    target: Arc<dyn UpdateTarget>,
    iterations: u64,
    recorder: Arc<Mutex<LatencyRecorder>>,
) -> Result<WorkerReport> {
    let mut session = target
        .start_session()
        .await
        .with_context(|| format!("worker {worker_id}: failed to start update session"))?;

    let mut report = WorkerReport::default();
    for _ in 0..iterations {
        let start = Instant::now();
        match session.execute_update().await {
            Ok(()) => {
                let micros = start.elapsed().as_micros() as u64;
                // Measurement is done; only the record itself takes the lock.
                recorder.lock().await.record(micros);
                report.completed += 1;
            }
            Err(e) => {
                warn!("worker {}: error updating row: {:#}", worker_id, e);
                report.failed += 1;
            }
        }
    }

    debug!(
        "worker {}: done ({} completed, {} failed)",
        worker_id, report.completed, report.failed
    );
    Ok(report)
}
