use std::sync::Arc;

use hmiext_core::lifecycle::EventTag;

use super::{CallbackResult, Notification};

/// Passive, synchronous listener for lifecycle notifications.
///
/// Runs on the submitting thread with the same rules as [`LifecycleDelegate`](super::LifecycleDelegate):
/// queries are allowed, while `submit_signal`, delegate changes and observer
/// registration or removal fail with `ErrorKind::InvalidState`. An observer that wants to
/// unregister itself should hand its `ObserverId` to code that runs after dispatch.
pub trait NotificationObserver: Send + Sync {
    fn on_notification(&self, notification: &Notification) -> CallbackResult;
}

impl<F> NotificationObserver for F
where
    F: Fn(&Notification) -> CallbackResult + Send + Sync,
{
    fn on_notification(&self, notification: &Notification) -> CallbackResult {
        self(notification)
    }
}

/// Handle returned by observer registration; pass it back to remove the observer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ObserverId(u64);

struct Entry {
    id: ObserverId,
    interest: Option<EventTag>,
    observer: Arc<dyn NotificationObserver>,
}

/// Observers in registration order, each optionally filtered to one event tag.
#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_id: u64,
    entries: Vec<Entry>,
}

impl ObserverRegistry {
    pub(crate) fn insert(
        &mut self,
        interest: Option<EventTag>,
        observer: Arc<dyn NotificationObserver>,
    ) -> ObserverId {
        self.next_id += 1;
        let id = ObserverId(self.next_id);
        self.entries.push(Entry {
            id,
            interest,
            observer,
        });
        id
    }

    pub(crate) fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        before != self.entries.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Observers interested in `tag`, in registration order.
    pub(crate) fn interested(
        &self,
        tag: EventTag,
    ) -> impl Iterator<Item = &Arc<dyn NotificationObserver>> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.interest.map_or(true, |t| t == tag))
            .map(|e| &e.observer)
    }
}
