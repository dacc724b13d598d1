use super::{AudioStreamingState, SystemContext};

/// One lifecycle callback to fire, produced by resolving a signal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TransitionEvent {
    DidConnect,
    DidFinishLaunching,
    DidBecomeActive,
    DidBecomeLimited,
    DidEnterBackground,
    DidClose,
    DidDisconnect,
    AudioStreamingChanged {
        old: AudioStreamingState,
        new: AudioStreamingState,
    },
    SystemContextChanged {
        old: SystemContext,
        new: SystemContext,
    },
}

/// Payload-free discriminant of a [`TransitionEvent`], used to key observers.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EventTag {
    DidConnect,
    DidFinishLaunching,
    DidBecomeActive,
    DidBecomeLimited,
    DidEnterBackground,
    DidClose,
    DidDisconnect,
    AudioStreamingChanged,
    SystemContextChanged,
}

impl TransitionEvent {
    pub const fn tag(self) -> EventTag {
        match self {
            TransitionEvent::DidConnect => EventTag::DidConnect,
            TransitionEvent::DidFinishLaunching => EventTag::DidFinishLaunching,
            TransitionEvent::DidBecomeActive => EventTag::DidBecomeActive,
            TransitionEvent::DidBecomeLimited => EventTag::DidBecomeLimited,
            TransitionEvent::DidEnterBackground => EventTag::DidEnterBackground,
            TransitionEvent::DidClose => EventTag::DidClose,
            TransitionEvent::DidDisconnect => EventTag::DidDisconnect,
            TransitionEvent::AudioStreamingChanged { .. } => EventTag::AudioStreamingChanged,
            TransitionEvent::SystemContextChanged { .. } => EventTag::SystemContextChanged,
        }
    }

    pub const fn is_secondary(self) -> bool {
        matches!(
            self,
            TransitionEvent::AudioStreamingChanged { .. }
                | TransitionEvent::SystemContextChanged { .. }
        )
    }
}

impl EventTag {
    /// Notification name, matching the delegate method it mirrors.
    pub const fn label(self) -> &'static str {
        match self {
            EventTag::DidConnect => "did_connect",
            EventTag::DidFinishLaunching => "did_finish_launching",
            EventTag::DidBecomeActive => "did_become_active",
            EventTag::DidBecomeLimited => "did_become_limited",
            EventTag::DidEnterBackground => "did_enter_background",
            EventTag::DidClose => "did_close",
            EventTag::DidDisconnect => "did_disconnect",
            EventTag::AudioStreamingChanged => "audio_streaming_state_changed",
            EventTag::SystemContextChanged => "system_context_changed",
        }
    }
}
