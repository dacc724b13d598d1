use crate::error::{CoreError, Result};

use super::{ApplicationState, LifecycleSnapshot, Signal, TransitionEvent};

/// Knobs for how strictly the signal stream is interpreted.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct ResolvePolicy {
    /// Reject HMI level signals that arrive before any connect/register instead of
    /// treating them as an implied connect.
    pub strict_connect: bool,
}

impl ResolvePolicy {
    pub const fn strict() -> Self {
        Self {
            strict_connect: true,
        }
    }
}

/// Outcome of resolving one signal against a snapshot.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Resolution {
    pub previous: LifecycleSnapshot,
    pub next: LifecycleSnapshot,
    /// Ordered callbacks to fire. Empty for duplicate signals.
    pub events: Vec<TransitionEvent>,
}

impl Resolution {
    fn unchanged(current: &LifecycleSnapshot) -> Self {
        Self {
            previous: *current,
            next: *current,
            events: Vec::new(),
        }
    }

    /// True when the signal reported nothing new.
    pub fn is_noop(&self) -> bool {
        self.events.is_empty()
    }

    pub fn state_changed(&self) -> bool {
        self.previous.app_state() != self.next.app_state()
    }
}

/// Resolve a signal with the default (non-strict) policy.
pub fn resolve(current: &LifecycleSnapshot, signal: Signal) -> Result<Resolution> {
    resolve_with(current, signal, ResolvePolicy::default())
}

/// Resolve a signal against the current snapshot.
///
/// Pure: the caller commits `Resolution::next` and fires `Resolution::events`.
/// Impossible combinations return a `ProtocolViolation` and leave nothing to commit.
pub fn resolve_with(
    current: &LifecycleSnapshot,
    signal: Signal,
    policy: ResolvePolicy,
) -> Result<Resolution> {
    let state = current.app_state();

    let target = match signal {
        Signal::AudioStreamingChanged(new) => {
            let old = current.audio_streaming_state();
            if old == new {
                return Ok(Resolution::unchanged(current));
            }
            return Ok(Resolution {
                previous: *current,
                next: current.with_audio(new),
                events: vec![TransitionEvent::AudioStreamingChanged { old, new }],
            });
        }
        Signal::SystemContextChanged(new) => {
            let old = current.system_context();
            if old == new {
                return Ok(Resolution::unchanged(current));
            }
            return Ok(Resolution {
                previous: *current,
                next: current.with_system_context(new),
                events: vec![TransitionEvent::SystemContextChanged { old, new }],
            });
        }

        Signal::Disconnect => ApplicationState::Disconnected,

        Signal::Connect | Signal::Register if state.is_connected() => {
            return Err(CoreError::protocol_violation(
                state.id(),
                signal.id(),
                "session is already connected; a disconnect must come first",
            ));
        }
        Signal::Connect | Signal::Register => ApplicationState::NotRunning,

        Signal::Unregister if !state.is_connected() => {
            return Err(CoreError::protocol_violation(
                state.id(),
                signal.id(),
                "unregister received without a connected session",
            ));
        }
        Signal::Unregister => ApplicationState::NotRunning,

        Signal::HmiLevelChanged(_) if !state.is_connected() && policy.strict_connect => {
            return Err(CoreError::protocol_violation(
                state.id(),
                signal.id(),
                "HMI level received before connect",
            ));
        }
        Signal::HmiLevelChanged(level) => level.application_state(),
    };

    let events = plan_transition(state, target, current.launched());
    if events.is_empty() {
        return Ok(Resolution::unchanged(current));
    }

    Ok(Resolution {
        previous: *current,
        next: apply(current, target, &events),
        events,
    })
}

/// The lifecycle table: ordered callbacks needed to move `from -> to`.
///
/// `launched` says whether `DidFinishLaunching` already fired in the current session;
/// it is ignored when leaving `Disconnected` (a new session always launches).
pub fn plan_transition(
    from: ApplicationState,
    to: ApplicationState,
    launched: bool,
) -> Vec<TransitionEvent> {
    use ApplicationState::*;
    use TransitionEvent::*;

    let finish_launching = |entry: TransitionEvent| {
        if launched {
            vec![entry]
        } else {
            vec![DidFinishLaunching, entry]
        }
    };

    match (from, to) {
        (Disconnected, Disconnected)
        | (NotRunning, NotRunning)
        | (Background, Background)
        | (Limited, Limited)
        | (Active, Active) => Vec::new(),

        (_, Disconnected) => vec![DidDisconnect],

        (Disconnected, NotRunning) => vec![DidConnect],
        (Background | Limited | Active, NotRunning) => vec![DidClose],

        (Disconnected, Background) => vec![DidConnect, DidFinishLaunching, DidEnterBackground],
        (NotRunning, Background) => finish_launching(DidEnterBackground),
        (Limited | Active, Background) => vec![DidEnterBackground],

        (Disconnected, Limited) => vec![DidConnect, DidFinishLaunching, DidBecomeLimited],
        (NotRunning, Limited) => finish_launching(DidBecomeLimited),
        (Background | Active, Limited) => vec![DidBecomeLimited],

        (Disconnected, Active) => vec![DidConnect, DidFinishLaunching, DidBecomeActive],
        (NotRunning, Active) => finish_launching(DidBecomeActive),
        (Background | Limited, Active) => vec![DidBecomeActive],
    }
}

fn apply(
    current: &LifecycleSnapshot,
    target: ApplicationState,
    events: &[TransitionEvent],
) -> LifecycleSnapshot {
    let mut next = *current;
    for event in events {
        next = match event {
            TransitionEvent::DidConnect => next.open_session(),
            TransitionEvent::DidFinishLaunching => next.mark_launched(),
            TransitionEvent::DidDisconnect => next.close_session(),
            _ => next,
        };
    }
    next.with_app_state(target)
}

//
// Tests
//

/// Unit tests for lifecycle resolution primitives.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Domain, ErrorKind, Payload};
    use crate::lifecycle::{AudioStreamingState, HmiLevel, SystemContext, ALL_STATES};

    fn drive(signals: &[Signal]) -> LifecycleSnapshot {
        signals.iter().fold(LifecycleSnapshot::new(), |snap, sig| {
            resolve(&snap, *sig).unwrap().next
        })
    }

    #[test]
    fn register_twice_has_payload() {
        let snap = drive(&[Signal::Register]);
        let e = resolve(&snap, Signal::Register).unwrap_err();
        assert_eq!(e.kind, ErrorKind::ProtocolViolation);
        assert_eq!(e.domain, Domain::Lifecycle);

        match e.payload {
            Payload::LifecycleTransition { from_state, signal } => {
                assert_eq!(from_state, ApplicationState::NotRunning.id());
                assert_eq!(signal, Signal::Register.id());
            }
            _ => panic!("expected LifecycleTransition payload"),
        }
    }

    #[test]
    fn disconnected_to_active_is_three_hops() {
        let r = resolve(&LifecycleSnapshot::new(), Signal::HmiLevelChanged(HmiLevel::Full))
            .unwrap();
        assert_eq!(
            r.events,
            vec![
                TransitionEvent::DidConnect,
                TransitionEvent::DidFinishLaunching,
                TransitionEvent::DidBecomeActive,
            ]
        );
        assert_eq!(r.next.app_state(), ApplicationState::Active);
        assert!(r.next.session().unwrap().launched());
    }

    #[test]
    fn active_to_background_enters_background_only() {
        let snap = drive(&[Signal::HmiLevelChanged(HmiLevel::Full)]);
        let r = resolve(&snap, Signal::HmiLevelChanged(HmiLevel::Background)).unwrap();
        assert_eq!(r.events, vec![TransitionEvent::DidEnterBackground]);
        assert_eq!(r.next.app_state(), ApplicationState::Background);
    }

    #[test]
    fn repeated_signal_is_a_noop() {
        let signals = [
            Signal::Connect,
            Signal::HmiLevelChanged(HmiLevel::Limited),
            Signal::AudioStreamingChanged(AudioStreamingState::Audible),
            Signal::SystemContextChanged(SystemContext::Menu),
            Signal::Unregister,
            Signal::Disconnect,
        ];
        let mut snap = LifecycleSnapshot::new();
        for sig in signals {
            let first = resolve(&snap, sig).unwrap();
            assert!(!first.is_noop(), "{sig:?} should change something");
            let second = resolve(&first.next, sig);
            match sig {
                Signal::Connect => assert!(second.unwrap_err().is_protocol_violation()),
                _ => assert!(second.unwrap().is_noop(), "{sig:?} repeated"),
            }
            snap = first.next;
        }
    }

    #[test]
    fn close_then_foreground_does_not_relaunch() {
        let snap = drive(&[
            Signal::Register,
            Signal::HmiLevelChanged(HmiLevel::Full),
            Signal::HmiLevelChanged(HmiLevel::None),
        ]);
        assert_eq!(snap.app_state(), ApplicationState::NotRunning);

        let r = resolve(&snap, Signal::HmiLevelChanged(HmiLevel::Full)).unwrap();
        assert_eq!(r.events, vec![TransitionEvent::DidBecomeActive]);
    }

    #[test]
    fn disconnect_resets_session_and_keeps_secondary_state() {
        let snap = drive(&[
            Signal::HmiLevelChanged(HmiLevel::Full),
            Signal::AudioStreamingChanged(AudioStreamingState::Audible),
        ]);
        let first_session = snap.session_id().unwrap();

        let r = resolve(&snap, Signal::Disconnect).unwrap();
        assert_eq!(r.events, vec![TransitionEvent::DidDisconnect]);
        assert_eq!(r.next.app_state(), ApplicationState::Disconnected);
        assert!(r.next.session().is_none());
        assert_eq!(
            r.next.audio_streaming_state(),
            AudioStreamingState::Audible
        );

        let again = resolve(&r.next, Signal::Connect).unwrap();
        assert!(again.next.session_id().unwrap() > first_session);
        assert!(!again.next.session().unwrap().launched());
    }

    #[test]
    fn secondary_change_leaves_primary_untouched() {
        let snap = drive(&[
            Signal::HmiLevelChanged(HmiLevel::Full),
            Signal::AudioStreamingChanged(AudioStreamingState::Audible),
        ]);
        let r = resolve(
            &snap,
            Signal::AudioStreamingChanged(AudioStreamingState::NotAudible),
        )
        .unwrap();
        assert_eq!(
            r.events,
            vec![TransitionEvent::AudioStreamingChanged {
                old: AudioStreamingState::Audible,
                new: AudioStreamingState::NotAudible,
            }]
        );
        assert_eq!(r.next.app_state(), ApplicationState::Active);
        assert!(!r.state_changed());
    }

    #[test]
    fn strict_policy_rejects_hmi_before_connect() {
        let e = resolve_with(
            &LifecycleSnapshot::new(),
            Signal::HmiLevelChanged(HmiLevel::Full),
            ResolvePolicy::strict(),
        )
        .unwrap_err();
        assert!(e.is_protocol_violation());

        let snap = drive(&[Signal::Connect]);
        let r = resolve_with(
            &snap,
            Signal::HmiLevelChanged(HmiLevel::Full),
            ResolvePolicy::strict(),
        )
        .unwrap();
        assert_eq!(
            r.events,
            vec![
                TransitionEvent::DidFinishLaunching,
                TransitionEvent::DidBecomeActive
            ]
        );
    }

    #[test]
    fn unregister_without_session_is_rejected() {
        let e = resolve(&LifecycleSnapshot::new(), Signal::Unregister).unwrap_err();
        assert!(e.is_protocol_violation());
    }

    #[test]
    fn disconnect_from_every_connected_state_is_single_event() {
        for state in ALL_STATES.into_iter().filter(|s| s.is_connected()) {
            assert_eq!(
                plan_transition(state, ApplicationState::Disconnected, true),
                vec![TransitionEvent::DidDisconnect]
            );
        }
    }

    #[test]
    fn close_only_from_launched_states() {
        for from in ALL_STATES {
            let events = plan_transition(from, ApplicationState::NotRunning, true);
            let closes = events.contains(&TransitionEvent::DidClose);
            assert_eq!(closes, from.is_launched(), "{from:?}");
        }
    }
}
