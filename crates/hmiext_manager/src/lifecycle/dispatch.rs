use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use hmiext_core::error::{CoreError, Severity};
use hmiext_core::lifecycle::{EventTag, LifecycleSnapshot, SessionId, TransitionEvent};
use tokio::sync::broadcast;

use crate::error::log_core_error;

use super::observer::ObserverRegistry;
use super::{CallbackResult, LifecycleDelegate, Notification, NotificationObserver, ObserverId};

/// Everything a dispatch needs to know about the signal that produced the events.
#[derive(Debug, Copy, Clone)]
pub struct DispatchContext {
    pub seq: u64,
    pub session: Option<SessionId>,
    pub snapshot: LifecycleSnapshot,
}

/// What happened while firing one ordered event list.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    /// Events fired (delegate + observers + broadcast).
    pub fired: usize,
    /// Contained delegate/observer failures, in the order they happened.
    pub failures: Vec<CoreError>,
}

impl DispatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Dual-sink dispatcher: one delegate plus any number of observers.
///
/// For each event, in list order:
/// 1. the delegate method for the event (if a delegate is set)
/// 2. every observer interested in the event tag, in registration order
/// 3. the broadcast notification stream
///
/// A failing or panicking callback is logged and recorded; dispatch continues.
pub struct EventDispatcher {
    delegate: Option<Box<dyn LifecycleDelegate>>,
    observers: ObserverRegistry,
    // Lagging receivers lose the oldest notifications; send never blocks.
    notifications: broadcast::Sender<Notification>,
}

impl EventDispatcher {
    /// `capacity` must be non-zero (broadcast channel requirement).
    pub fn new(capacity: usize) -> Self {
        let (notifications, _rx) = broadcast::channel(capacity);
        Self {
            delegate: None,
            observers: ObserverRegistry::default(),
            notifications,
        }
    }

    /// Replace the delegate, returning the previous one.
    pub fn set_delegate(
        &mut self,
        delegate: Option<Box<dyn LifecycleDelegate>>,
    ) -> Option<Box<dyn LifecycleDelegate>> {
        std::mem::replace(&mut self.delegate, delegate)
    }

    pub fn has_delegate(&self) -> bool {
        self.delegate.is_some()
    }

    pub fn add_observer(
        &mut self,
        interest: Option<EventTag>,
        observer: Arc<dyn NotificationObserver>,
    ) -> ObserverId {
        self.observers.insert(interest, observer)
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    /// Sender handle for subscribing without access to the dispatcher.
    pub fn notification_sender(&self) -> broadcast::Sender<Notification> {
        self.notifications.clone()
    }

    /// Fire `events` strictly in order. Never fails; failures land in the report.
    pub fn dispatch(&mut self, ctx: &DispatchContext, events: &[TransitionEvent]) -> DispatchReport {
        let mut report = DispatchReport::default();

        for event in events {
            let tag = event.tag();

            if let Some(delegate) = self.delegate.as_mut() {
                let outcome = catch_unwind(AssertUnwindSafe(|| {
                    invoke_delegate(delegate.as_mut(), *event, &ctx.snapshot)
                }));
                record(&mut report, tag, "delegate", outcome);
            }

            let notification = Notification {
                seq: ctx.seq,
                session: ctx.session,
                event: *event,
                snapshot: ctx.snapshot,
            };

            for observer in self.observers.interested(tag) {
                let outcome =
                    catch_unwind(AssertUnwindSafe(|| observer.on_notification(&notification)));
                record(&mut report, tag, "observer", outcome);
            }

            // Err only means no receivers.
            let _ = self.notifications.send(notification);
            report.fired += 1;
        }

        report
    }
}

fn invoke_delegate(
    delegate: &mut dyn LifecycleDelegate,
    event: TransitionEvent,
    snapshot: &LifecycleSnapshot,
) -> CallbackResult {
    match event {
        TransitionEvent::DidConnect => delegate.did_connect(snapshot),
        TransitionEvent::DidFinishLaunching => delegate.did_finish_launching(snapshot),
        TransitionEvent::DidBecomeActive => delegate.did_become_active(snapshot),
        TransitionEvent::DidBecomeLimited => delegate.did_become_limited(snapshot),
        TransitionEvent::DidEnterBackground => delegate.did_enter_background(snapshot),
        TransitionEvent::DidClose => delegate.did_close(snapshot),
        TransitionEvent::DidDisconnect => delegate.did_disconnect(snapshot),
        TransitionEvent::AudioStreamingChanged { old, new } => {
            delegate.audio_streaming_state_changed(old, new, snapshot)
        }
        TransitionEvent::SystemContextChanged { old, new } => {
            delegate.system_context_changed(old, new, snapshot)
        }
    }
}

fn record(
    report: &mut DispatchReport,
    tag: EventTag,
    sink: &'static str,
    outcome: std::thread::Result<CallbackResult>,
) {
    let err = match outcome {
        Ok(CallbackResult::Success) => return,
        Ok(CallbackResult::Failure) => {
            CoreError::delegate_failure(tag.label(), format!("{sink} reported failure"))
        }
        Ok(CallbackResult::Error) => {
            let mut e = CoreError::delegate_failure(tag.label(), format!("{sink} reported error"));
            e.severity = Severity::Error;
            e
        }
        Err(panic) => {
            let mut e = CoreError::delegate_failure(
                tag.label(),
                format!("{sink} panicked: {}", panic_message(panic.as_ref())),
            );
            e.severity = Severity::Error;
            e
        }
    };
    log_core_error(&err);
    report.failures.push(err);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use hmiext_core::error::{ErrorKind, Payload};
    use hmiext_core::lifecycle::{AudioStreamingState, LifecycleSnapshot};

    #[derive(Clone, Default)]
    struct Journal(Arc<Mutex<Vec<String>>>);

    impl Journal {
        fn push(&self, entry: impl Into<String>) {
            self.0.lock().unwrap().push(entry.into());
        }
        fn entries(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    struct RecordingDelegate {
        journal: Journal,
        panic_on_active: bool,
    }

    impl LifecycleDelegate for RecordingDelegate {
        fn did_finish_launching(&mut self, _: &LifecycleSnapshot) -> CallbackResult {
            self.journal.push("delegate:did_finish_launching");
            CallbackResult::Success
        }
        fn did_connect(&mut self, _: &LifecycleSnapshot) -> CallbackResult {
            self.journal.push("delegate:did_connect");
            CallbackResult::Failure
        }
        fn did_become_active(&mut self, _: &LifecycleSnapshot) -> CallbackResult {
            if self.panic_on_active {
                panic!("delegate exploded");
            }
            self.journal.push("delegate:did_become_active");
            CallbackResult::Success
        }
    }

    fn ctx() -> DispatchContext {
        DispatchContext {
            seq: 7,
            session: None,
            snapshot: LifecycleSnapshot::new(),
        }
    }

    fn journaling_dispatcher(journal: &Journal, panic_on_active: bool) -> EventDispatcher {
        let mut dispatcher = EventDispatcher::new(8);
        dispatcher.set_delegate(Some(Box::new(RecordingDelegate {
            journal: journal.clone(),
            panic_on_active,
        })));
        let j = journal.clone();
        dispatcher.add_observer(
            None,
            Arc::new(move |n: &Notification| {
                j.push(format!("observer:{}", n.name()));
                CallbackResult::Success
            }),
        );
        dispatcher
    }

    #[test]
    fn delegate_fires_before_observers_in_list_order() {
        let journal = Journal::default();
        let mut dispatcher = journaling_dispatcher(&journal, false);

        let report = dispatcher.dispatch(
            &ctx(),
            &[
                TransitionEvent::DidConnect,
                TransitionEvent::DidFinishLaunching,
                TransitionEvent::DidBecomeActive,
            ],
        );

        assert_eq!(
            journal.entries(),
            vec![
                "delegate:did_connect",
                "observer:did_connect",
                "delegate:did_finish_launching",
                "observer:did_finish_launching",
                "delegate:did_become_active",
                "observer:did_become_active",
            ]
        );
        assert_eq!(report.fired, 3);
        // did_connect returned Failure
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, ErrorKind::DelegateFailure);
    }

    #[test]
    fn panicking_delegate_does_not_block_observers_or_later_events() {
        let journal = Journal::default();
        let mut dispatcher = journaling_dispatcher(&journal, true);
        let mut rx = dispatcher.subscribe();

        let report = dispatcher.dispatch(
            &ctx(),
            &[
                TransitionEvent::DidBecomeActive,
                TransitionEvent::AudioStreamingChanged {
                    old: AudioStreamingState::NotAudible,
                    new: AudioStreamingState::Audible,
                },
            ],
        );

        assert_eq!(
            journal.entries(),
            vec![
                "observer:did_become_active",
                "observer:audio_streaming_state_changed",
            ]
        );
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].severity, Severity::Error);
        assert!(report.failures[0].to_string().contains("did_become_active"));

        assert_eq!(rx.try_recv().unwrap().tag(), EventTag::DidBecomeActive);
        assert_eq!(rx.try_recv().unwrap().tag(), EventTag::AudioStreamingChanged);
        assert_eq!(rx.try_recv().unwrap_err(), broadcast::error::TryRecvError::Empty);
    }

    #[test]
    fn missing_delegate_is_not_an_error() {
        let mut dispatcher = EventDispatcher::new(4);
        let report = dispatcher.dispatch(&ctx(), &[TransitionEvent::DidClose]);
        assert!(report.is_clean());
        assert_eq!(report.fired, 1);
        assert!(!dispatcher.has_delegate());
    }

    #[test]
    fn tag_filtered_observer_only_sees_its_tag() {
        let journal = Journal::default();
        let mut dispatcher = EventDispatcher::new(4);
        let j = journal.clone();
        let id = dispatcher.add_observer(
            Some(EventTag::DidClose),
            Arc::new(move |n: &Notification| {
                j.push(n.name());
                CallbackResult::Success
            }),
        );

        dispatcher.dispatch(
            &ctx(),
            &[TransitionEvent::DidEnterBackground, TransitionEvent::DidClose],
        );
        assert_eq!(journal.entries(), vec!["did_close"]);

        assert!(dispatcher.remove_observer(id));
        dispatcher.dispatch(&ctx(), &[TransitionEvent::DidClose]);
        assert_eq!(journal.entries().len(), 1);
    }

    #[test]
    fn failing_and_panicking_observers_do_not_stop_dispatch() {
        let journal = Journal::default();
        let mut dispatcher = EventDispatcher::new(8);
        let mut rx = dispatcher.subscribe();
        dispatcher.add_observer(
            None,
            Arc::new(|n: &Notification| {
                if n.tag() == EventTag::DidConnect {
                    panic!("observer exploded");
                }
                CallbackResult::Failure
            }),
        );
        let j = journal.clone();
        dispatcher.add_observer(
            None,
            Arc::new(move |n: &Notification| {
                j.push(n.name());
                CallbackResult::Success
            }),
        );

        let report = dispatcher.dispatch(
            &ctx(),
            &[
                TransitionEvent::DidConnect,
                TransitionEvent::DidFinishLaunching,
                TransitionEvent::DidBecomeActive,
            ],
        );

        assert_eq!(
            journal.entries(),
            vec!["did_connect", "did_finish_launching", "did_become_active"]
        );
        assert_eq!(report.fired, 3);
        assert_eq!(report.failures.len(), 3);
        assert_eq!(report.failures[0].severity, Severity::Error);
        assert_eq!(report.failures[1].severity, Severity::Warn);
        assert_eq!(report.failures[2].severity, Severity::Warn);
        assert!(report
            .failures
            .iter()
            .all(|e| e.kind == ErrorKind::DelegateFailure));
        assert!(matches!(
            &report.failures[0].payload,
            Payload::Context { value, .. } if value.starts_with("observer panicked")
        ));

        for expected in [
            EventTag::DidConnect,
            EventTag::DidFinishLaunching,
            EventTag::DidBecomeActive,
        ] {
            assert_eq!(rx.try_recv().unwrap().tag(), expected);
        }
    }
}
