use std::sync::Arc;

use hmiext_core::error::CoreError;
use hmiext_core::lifecycle::Signal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::LifecycleManager;

/// Totals reported when a signal pump stops.
#[derive(Debug, Clone, Default)]
pub struct PumpSummary {
    pub accepted: usize,
    pub duplicates: usize,
    pub rejected: usize,
    pub delegate_failures: usize,
    /// First violation seen; set when the pump stopped because of it.
    pub violation: Option<CoreError>,
}

/// Drain `rx` into `manager.submit_signal`, one signal at a time.
///
/// Any number of producers may hold clones of the sender; this task is the single consumer.
/// With `stop_on_violation`, the pump returns at the first rejected signal; otherwise it keeps
/// going and only counts it. The pump ends when every sender is dropped.
pub fn spawn_signal_pump(
    manager: Arc<LifecycleManager>,
    mut rx: mpsc::Receiver<Signal>,
    stop_on_violation: bool,
) -> JoinHandle<PumpSummary> {
    tokio::spawn(async move {
        let mut summary = PumpSummary::default();

        while let Some(signal) = rx.recv().await {
            match manager.submit_signal(signal) {
                Ok(outcome) => {
                    if outcome.is_duplicate() {
                        summary.duplicates += 1;
                    } else {
                        summary.accepted += 1;
                    }
                    summary.delegate_failures += outcome.report.failures.len();
                }
                Err(err) => {
                    summary.rejected += 1;
                    if summary.violation.is_none() {
                        summary.violation = Some(err);
                    }
                    if stop_on_violation {
                        warn!(app = manager.name(), "signal pump stopped on protocol violation");
                        break;
                    }
                }
            }
        }

        debug!(app = manager.name(), ?summary, "signal pump finished");
        summary
    })
}
