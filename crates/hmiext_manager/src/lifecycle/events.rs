//! Lifecycle notification types.
//!
//! A notification is the broadcast twin of one delegate callback: same event, same payload.
//! Observers registered on the manager and `tokio::sync::broadcast` subscribers both receive it.

use hmiext_core::lifecycle::{EventTag, LifecycleSnapshot, SessionId, TransitionEvent};

/// Emitted for every transition event, after the delegate saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Arrival sequence number of the signal that produced this event.
    pub seq: u64,
    /// Session the event belongs to. For `DidDisconnect` this is the session that just ended.
    pub session: Option<SessionId>,
    pub event: TransitionEvent,
    /// Snapshot committed by the signal.
    pub snapshot: LifecycleSnapshot,
}

impl Notification {
    pub fn tag(&self) -> EventTag {
        self.event.tag()
    }

    /// Stable notification name (matches the delegate method name).
    pub fn name(&self) -> &'static str {
        self.event.tag().label()
    }
}
