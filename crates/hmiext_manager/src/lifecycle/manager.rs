use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::thread::{self, ThreadId};

use hmiext_core::error::{CoreError, Domain, ErrorKind, Result};
use hmiext_core::lifecycle::{
    resolve_with, ApplicationState, AudioStreamingState, EventTag, HmiLevel, LifecycleSnapshot,
    ResolvePolicy, SessionId, Signal, StateGate, SystemContext, TransitionEvent,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::log_core_error;

use super::{
    DispatchContext, DispatchReport, EventDispatcher, LifecycleDelegate, Notification,
    NotificationObserver, ObserverId,
};

pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 64;

/// Result of one accepted signal.
#[derive(Debug, Clone)]
pub struct SignalOutcome {
    pub seq: u64,
    pub previous: ApplicationState,
    pub state: ApplicationState,
    /// Events fired, in order. Empty for duplicate signals.
    pub events: Vec<TransitionEvent>,
    pub report: DispatchReport,
}

impl SignalOutcome {
    pub fn is_duplicate(&self) -> bool {
        self.events.is_empty()
    }
}

/// Everything mutated under the single-writer lock.
struct Core {
    snapshot: LifecycleSnapshot,
    dispatcher: EventDispatcher,
    next_seq: u64,
}

/// Lifecycle facade: the single source of truth for application state.
///
/// Responsibilities:
/// - Hold the committed snapshot (application, audio, system context, session)
/// - Hold the delegate and observers
/// - Serialize `submit_signal` across threads: resolve + commit + dispatch complete
///   before the next signal is looked at
/// - Publish the snapshot for queries only once dispatch has finished
/// - Mirror the application state into a lock-free [`StateGate`]
///
/// Mutating calls made from inside a callback (same thread, dispatch in progress) fail with
/// `ErrorKind::InvalidState` instead of blocking on the single-writer lock. Queries and
/// `subscribe_notifications` never take that lock and are always safe.
///
/// Construct with [`LifecycleManager::builder`] and share through `Arc`.
pub struct LifecycleManager {
    name: String,
    policy: ResolvePolicy,
    core: Mutex<Core>,
    published: RwLock<LifecycleSnapshot>,
    gate: Arc<StateGate>,
    notifications: broadcast::Sender<Notification>,
    // Thread currently running callbacks, if any.
    dispatch_owner: Mutex<Option<ThreadId>>,
}

/// Public API (library user facing).
impl LifecycleManager {
    pub fn builder(name: impl Into<String>) -> LifecycleManagerBuilder {
        LifecycleManagerBuilder::new(name)
    }

    /// Application name (for logging/introspection).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> ResolvePolicy {
        self.policy
    }

    /// Snapshot after the most recent fully dispatched signal.
    pub fn snapshot(&self) -> LifecycleSnapshot {
        match self.published.read() {
            Ok(guard) => *guard,
            Err(poison) => *poison.into_inner(),
        }
    }

    pub fn app_state(&self) -> ApplicationState {
        self.snapshot().app_state()
    }

    pub fn audio_streaming_state(&self) -> AudioStreamingState {
        self.snapshot().audio_streaming_state()
    }

    pub fn system_context(&self) -> SystemContext {
        self.snapshot().system_context()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.snapshot().session_id()
    }

    /// Shared state gate for foreground-only resources.
    pub fn state_gate(&self) -> Arc<StateGate> {
        Arc::clone(&self.gate)
    }

    /// Sole mutation entry point.
    ///
    /// Returns the fired events, or the `ProtocolViolation` that rejected the signal (state
    /// unchanged). Delegate/observer failures never fail the call; see `SignalOutcome::report`.
    /// Called from inside a callback, it fails with `InvalidState` and takes no sequence number.
    pub fn submit_signal(&self, signal: Signal) -> Result<SignalOutcome> {
        let mut core = self.lock_core_for("submit_signal")?;

        let seq = core.next_seq;
        core.next_seq += 1;

        let resolution = match resolve_with(&core.snapshot, signal, self.policy) {
            Ok(resolution) => resolution,
            Err(err) => {
                warn!(app = %self.name, seq, signal = signal.label(), "signal rejected");
                log_core_error(&err);
                return Err(err);
            }
        };

        let previous = resolution.previous.app_state();
        if resolution.is_noop() {
            debug!(app = %self.name, seq, signal = ?signal, "duplicate signal ignored");
            return Ok(SignalOutcome {
                seq,
                previous,
                state: previous,
                events: Vec::new(),
                report: DispatchReport::default(),
            });
        }

        core.snapshot = resolution.next;

        let next = resolution.next;
        debug!(
            app = %self.name,
            seq,
            signal = ?signal,
            from = previous.label(),
            to = next.app_state().label(),
            events = ?resolution.events,
            "signal resolved"
        );

        let ctx = DispatchContext {
            seq,
            session: next.session_id().or(resolution.previous.session_id()),
            snapshot: next,
        };

        if let (None, Some(session)) = (resolution.previous.session_id(), next.session_id()) {
            info!(app = %self.name, %session, "session opened");
        }

        let report = {
            let _owner = DispatchOwner::claim(&self.dispatch_owner);
            core.dispatcher.dispatch(&ctx, &resolution.events)
        };

        if let (Some(session), None) = (resolution.previous.session_id(), next.session_id()) {
            info!(app = %self.name, %session, "session closed");
        }

        self.publish(next);

        Ok(SignalOutcome {
            seq,
            previous,
            state: next.app_state(),
            events: resolution.events,
            report,
        })
    }

    /// Normalize a combined head-unit status into its three signals, in arrival order
    /// (HMI level, audio, system context). Stops at the first rejected signal.
    pub fn submit_hmi_status(
        &self,
        level: HmiLevel,
        audio: AudioStreamingState,
        context: SystemContext,
    ) -> Result<Vec<SignalOutcome>> {
        [
            Signal::HmiLevelChanged(level),
            Signal::AudioStreamingChanged(audio),
            Signal::SystemContextChanged(context),
        ]
        .into_iter()
        .map(|signal| self.submit_signal(signal))
        .collect()
    }

    /// Replace the delegate, returning the previous one.
    pub fn set_delegate(
        &self,
        delegate: impl LifecycleDelegate + 'static,
    ) -> Result<Option<Box<dyn LifecycleDelegate>>> {
        let mut core = self.lock_core_for("set_delegate")?;
        Ok(core.dispatcher.set_delegate(Some(Box::new(delegate))))
    }

    pub fn clear_delegate(&self) -> Result<Option<Box<dyn LifecycleDelegate>>> {
        let mut core = self.lock_core_for("clear_delegate")?;
        Ok(core.dispatcher.set_delegate(None))
    }

    /// Register an observer for every notification.
    pub fn add_observer(&self, observer: Arc<dyn NotificationObserver>) -> Result<ObserverId> {
        let mut core = self.lock_core_for("add_observer")?;
        Ok(core.dispatcher.add_observer(None, observer))
    }

    /// Register an observer for one notification tag.
    pub fn add_observer_for(
        &self,
        tag: EventTag,
        observer: Arc<dyn NotificationObserver>,
    ) -> Result<ObserverId> {
        let mut core = self.lock_core_for("add_observer_for")?;
        Ok(core.dispatcher.add_observer(Some(tag), observer))
    }

    pub fn remove_observer(&self, id: ObserverId) -> Result<bool> {
        let mut core = self.lock_core_for("remove_observer")?;
        Ok(core.dispatcher.remove_observer(id))
    }

    /// Subscribe to the notification stream.
    pub fn subscribe_notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }
}

/// Internal plumbing.
impl LifecycleManager {
    /// Take the single-writer lock for `op`, refusing re-entry from a running callback.
    fn lock_core_for(&self, op: &'static str) -> Result<MutexGuard<'_, Core>> {
        let current = thread::current().id();
        if *lock_owner(&self.dispatch_owner) == Some(current) {
            let err = CoreError::error()
                .domain(Domain::Dispatch)
                .kind(ErrorKind::InvalidState)
                .msgf(format_args!("{op} called from a lifecycle callback"))
                .build();
            log_core_error(&err);
            return Err(err);
        }
        Ok(self.lock_core())
    }

    fn lock_core(&self) -> MutexGuard<'_, Core> {
        match self.core.lock() {
            Ok(guard) => guard,
            Err(poison) => {
                warn!(app = %self.name, "lifecycle core mutex poisoned");
                poison.into_inner()
            }
        }
    }

    fn publish(&self, snapshot: LifecycleSnapshot) {
        match self.published.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poison) => *poison.into_inner() = snapshot,
        }
        self.gate.publish(snapshot.app_state());
    }
}

fn lock_owner(owner: &Mutex<Option<ThreadId>>) -> MutexGuard<'_, Option<ThreadId>> {
    match owner.lock() {
        Ok(guard) => guard,
        Err(poison) => poison.into_inner(),
    }
}

/// Marks the current thread as the dispatching one until dropped.
struct DispatchOwner<'a> {
    owner: &'a Mutex<Option<ThreadId>>,
}

impl<'a> DispatchOwner<'a> {
    fn claim(owner: &'a Mutex<Option<ThreadId>>) -> Self {
        *lock_owner(owner) = Some(thread::current().id());
        Self { owner }
    }
}

impl Drop for DispatchOwner<'_> {
    fn drop(&mut self) {
        *lock_owner(self.owner) = None;
    }
}

/// Explicit construction for [`LifecycleManager`].
///
/// The delegate is supplied by value or by a factory closure; there is no global instance.
pub struct LifecycleManagerBuilder {
    name: String,
    policy: ResolvePolicy,
    capacity: usize,
    delegate: Option<Box<dyn LifecycleDelegate>>,
}

impl LifecycleManagerBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            policy: ResolvePolicy::default(),
            capacity: DEFAULT_NOTIFICATION_CAPACITY,
            delegate: None,
        }
    }

    pub fn policy(mut self, policy: ResolvePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Broadcast buffer size for `subscribe_notifications` receivers.
    pub fn notification_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn delegate(mut self, delegate: impl LifecycleDelegate + 'static) -> Self {
        self.delegate = Some(Box::new(delegate));
        self
    }

    /// Build the delegate from a caller-supplied factory.
    pub fn delegate_with<D, F>(self, factory: F) -> Self
    where
        D: LifecycleDelegate + 'static,
        F: FnOnce() -> D,
    {
        self.delegate(factory())
    }

    pub fn build(self) -> Result<LifecycleManager> {
        if self.name.is_empty() {
            return Err(CoreError::error()
                .domain(Domain::Lifecycle)
                .kind(ErrorKind::InvalidArgument)
                .msg("application name must not be empty")
                .build());
        }
        if self.capacity == 0 {
            return Err(CoreError::error()
                .domain(Domain::Config)
                .kind(ErrorKind::InvalidArgument)
                .msg("notification capacity must be non-zero")
                .build());
        }

        let mut dispatcher = EventDispatcher::new(self.capacity);
        dispatcher.set_delegate(self.delegate);
        let notifications = dispatcher.notification_sender();

        Ok(LifecycleManager {
            name: self.name,
            policy: self.policy,
            core: Mutex::new(Core {
                snapshot: LifecycleSnapshot::new(),
                dispatcher,
                next_seq: 1,
            }),
            published: RwLock::new(LifecycleSnapshot::new()),
            gate: Arc::new(StateGate::new()),
            notifications,
            dispatch_owner: Mutex::new(None),
        })
    }
}

/// Unit tests for LifecycleManager.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::CallbackResult;

    struct QuietDelegate;

    impl LifecycleDelegate for QuietDelegate {
        fn did_finish_launching(&mut self, _: &LifecycleSnapshot) -> CallbackResult {
            CallbackResult::Success
        }
    }

    fn manager() -> LifecycleManager {
        LifecycleManager::builder("test_app")
            .delegate(QuietDelegate)
            .build()
            .unwrap()
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = LifecycleManager::builder("").build().err().unwrap();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = LifecycleManager::builder("app")
            .notification_capacity(0)
            .build()
            .err()
            .unwrap();
        assert_eq!(err.domain, Domain::Config);
    }

    #[test]
    fn starts_disconnected_with_default_secondary_state() {
        let m = manager();
        assert_eq!(m.app_state(), ApplicationState::Disconnected);
        assert_eq!(m.audio_streaming_state(), AudioStreamingState::NotAudible);
        assert_eq!(m.system_context(), SystemContext::Main);
        assert!(m.session_id().is_none());
        assert!(!m.state_gate().is_active());
    }

    #[test]
    fn sequence_numbers_count_rejected_signals_too() {
        let m = manager();
        assert_eq!(m.submit_signal(Signal::Connect).unwrap().seq, 1);
        assert!(m.submit_signal(Signal::Register).is_err());
        assert_eq!(m.submit_signal(Signal::Disconnect).unwrap().seq, 3);
    }

    #[test]
    fn rejected_signal_leaves_state_unchanged() {
        let m = manager();
        m.submit_signal(Signal::Register).unwrap();
        let before = m.snapshot();

        let err = m.submit_signal(Signal::Register).unwrap_err();
        assert!(err.is_protocol_violation());
        assert_eq!(m.snapshot(), before);
    }

    #[test]
    fn hmi_status_is_split_in_arrival_order() {
        let m = manager();
        let outcomes = m
            .submit_hmi_status(
                HmiLevel::Full,
                AudioStreamingState::Audible,
                SystemContext::Main,
            )
            .unwrap();

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].events.len(), 3);
        assert_eq!(
            outcomes[1].events,
            vec![TransitionEvent::AudioStreamingChanged {
                old: AudioStreamingState::NotAudible,
                new: AudioStreamingState::Audible,
            }]
        );
        assert!(outcomes[2].is_duplicate());
        assert_eq!(m.app_state(), ApplicationState::Active);
        assert!(m.state_gate().is_active());
    }

    #[test]
    fn strict_policy_is_applied() {
        let m = LifecycleManager::builder("strict")
            .policy(ResolvePolicy::strict())
            .build()
            .unwrap();
        assert!(m
            .submit_signal(Signal::HmiLevelChanged(HmiLevel::Full))
            .is_err());
        assert_eq!(m.app_state(), ApplicationState::Disconnected);
    }

    #[test]
    fn delegate_can_be_replaced() {
        let m = manager();
        assert!(m.set_delegate(QuietDelegate).unwrap().is_some());
        assert!(m.clear_delegate().unwrap().is_some());
        assert!(m.clear_delegate().unwrap().is_none());
    }

    #[test]
    fn notification_carries_ended_session_on_disconnect() {
        let m = manager();
        let mut rx = m.subscribe_notifications();

        m.submit_signal(Signal::Connect).unwrap();
        let session = m.session_id().unwrap();
        m.submit_signal(Signal::Disconnect).unwrap();

        let connect = rx.try_recv().expect("expected did_connect");
        assert_eq!(connect.event, TransitionEvent::DidConnect);
        assert_eq!(connect.session, Some(session));

        let disconnect = rx.try_recv().expect("expected did_disconnect");
        assert_eq!(disconnect.event, TransitionEvent::DidDisconnect);
        assert_eq!(disconnect.session, Some(session));
        assert_eq!(disconnect.snapshot.app_state(), ApplicationState::Disconnected);
    }
}
