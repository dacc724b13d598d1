use super::{AudioStreamingState, HmiLevel, SystemContext};

/// A normalized status change observed on the RPC/session layer.
///
/// Signals are facts, not requests: the state machine either applies them through the
/// lifecycle table or rejects them as a protocol violation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Signal {
    Connect,
    Disconnect,
    Register,
    Unregister,
    HmiLevelChanged(HmiLevel),
    AudioStreamingChanged(AudioStreamingState),
    SystemContextChanged(SystemContext),
}

/// Internal, compact IDs used for error payloads.
impl Signal {
    pub const fn id(self) -> u8 {
        match self {
            Signal::Connect => 1,
            Signal::Disconnect => 2,
            Signal::Register => 3,
            Signal::Unregister => 4,
            Signal::HmiLevelChanged(_) => 5,
            Signal::AudioStreamingChanged(_) => 6,
            Signal::SystemContextChanged(_) => 7,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Signal::Connect => "connect",
            Signal::Disconnect => "disconnect",
            Signal::Register => "register",
            Signal::Unregister => "unregister",
            Signal::HmiLevelChanged(_) => "hmi",
            Signal::AudioStreamingChanged(_) => "audio",
            Signal::SystemContextChanged(_) => "context",
        }
    }

    /// True for signals that never touch the primary application state.
    pub const fn is_secondary(self) -> bool {
        matches!(
            self,
            Signal::AudioStreamingChanged(_) | Signal::SystemContextChanged(_)
        )
    }
}
