use std::sync::Arc;
use std::time::Duration;

use hmiext_core::lifecycle::{ApplicationState, StateGate};

/// A lifecycle-gated periodic runner.
///
/// The interval keeps ticking in every state, but user work only runs while the
/// application is at least at `floor` (by default: `Active`, i.e. HMI FULL).
pub struct ManagedInterval {
    gate: Arc<StateGate>,
    floor: ApplicationState,
    period: Duration,
}

impl ManagedInterval {
    pub fn new(gate: Arc<StateGate>, period: Duration) -> Self {
        Self {
            gate,
            floor: ApplicationState::Active,
            period,
        }
    }

    /// Run while at least `floor` instead of only while `Active`.
    pub fn with_floor(mut self, floor: ApplicationState) -> Self {
        self.floor = floor;
        self
    }

    /// Run `tick()` forever, but only execute it when the gate allows.
    pub async fn run<F, Fut>(&self, mut tick: F) -> !
    where
        F: FnMut() -> Fut + Send,
        Fut: std::future::Future<Output = ()> + Send,
    {
        let mut interval = tokio::time::interval(self.period);

        loop {
            interval.tick().await;

            if self.gate.is_at_least(self.floor) {
                tick().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn interval_skips_below_floor_and_runs_above() {
        let gate = Arc::new(StateGate::new());
        let interval = ManagedInterval::new(gate.clone(), Duration::from_millis(10))
            .with_floor(ApplicationState::Limited);
        let hits = Arc::new(AtomicUsize::new(0));

        let hits2 = hits.clone();
        let handle = tokio::spawn(async move {
            interval
                .run(|| {
                    let hits3 = hits2.clone();
                    async move {
                        hits3.fetch_add(1, Ordering::Relaxed);
                    }
                })
                .await
        });

        gate.publish(ApplicationState::Background);
        tokio::time::sleep(Duration::from_millis(35)).await;
        assert_eq!(hits.load(Ordering::Relaxed), 0);

        gate.publish(ApplicationState::Limited);
        tokio::time::sleep(Duration::from_millis(35)).await;
        assert!(hits.load(Ordering::Relaxed) > 0);

        handle.abort();
    }
}
