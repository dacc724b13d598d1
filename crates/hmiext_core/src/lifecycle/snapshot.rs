use super::{ApplicationState, AudioStreamingState, SystemContext};

/// Monotonic identifier of one connect-to-disconnect lifetime.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SessionId(u64);

impl SessionId {
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// Session-scoped bookkeeping. Dropped on disconnect.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Session {
    id: SessionId,
    launched: bool,
}

impl Session {
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// True once `DidFinishLaunching` has fired in this session.
    pub const fn launched(&self) -> bool {
        self.launched
    }
}

/// Everything the state machine needs to know about "now".
///
/// Invariant: `session()` is `Some` exactly when `app_state()` is not `Disconnected`.
/// Only [`resolve`](super::resolve) produces new snapshots.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct LifecycleSnapshot {
    app_state: ApplicationState,
    audio: AudioStreamingState,
    system_context: SystemContext,
    session: Option<Session>,
    sessions_opened: u64,
}

impl LifecycleSnapshot {
    /// Fresh process state: `Disconnected`, default secondary values, no session.
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn app_state(&self) -> ApplicationState {
        self.app_state
    }

    pub const fn audio_streaming_state(&self) -> AudioStreamingState {
        self.audio
    }

    pub const fn system_context(&self) -> SystemContext {
        self.system_context
    }

    pub const fn session(&self) -> Option<Session> {
        self.session
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.map(|s| s.id)
    }

    // ---------------- engine-only mutators ----------------

    pub(crate) fn with_app_state(mut self, state: ApplicationState) -> Self {
        self.app_state = state;
        self
    }

    pub(crate) fn with_audio(mut self, audio: AudioStreamingState) -> Self {
        self.audio = audio;
        self
    }

    pub(crate) fn with_system_context(mut self, context: SystemContext) -> Self {
        self.system_context = context;
        self
    }

    pub(crate) fn open_session(mut self) -> Self {
        self.sessions_opened += 1;
        self.session = Some(Session {
            id: SessionId(self.sessions_opened),
            launched: false,
        });
        self
    }

    pub(crate) fn close_session(mut self) -> Self {
        self.session = None;
        self
    }

    pub(crate) fn mark_launched(mut self) -> Self {
        if let Some(session) = self.session.as_mut() {
            session.launched = true;
        }
        self
    }

    pub(crate) fn launched(&self) -> bool {
        self.session.map(|s| s.launched).unwrap_or(false)
    }
}
