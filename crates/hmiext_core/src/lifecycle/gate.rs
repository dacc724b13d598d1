use std::sync::atomic::{AtomicU8, Ordering};

use super::ApplicationState;

/// Lock-free mirror of the committed application state.
///
/// Intended use (manager layer):
/// - `publish()` after every committed transition
/// - foreground-only resources check `is_active()` / `is_at_least()` to allow or skip work
#[derive(Debug)]
pub struct StateGate {
    state: AtomicU8,
}

impl StateGate {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(ApplicationState::Disconnected.id()),
        }
    }

    pub fn publish(&self, state: ApplicationState) {
        self.state.store(state.id(), Ordering::Release);
    }

    pub fn current(&self) -> ApplicationState {
        ApplicationState::from_id(self.state.load(Ordering::Acquire)).unwrap_or_default()
    }

    pub fn is_active(&self) -> bool {
        self.current() == ApplicationState::Active
    }

    pub fn is_at_least(&self, floor: ApplicationState) -> bool {
        self.current() >= floor
    }
}

impl Default for StateGate {
    fn default() -> Self {
        Self::new()
    }
}
