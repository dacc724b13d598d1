use hmiext_core::lifecycle::{AudioStreamingState, LifecycleSnapshot, SystemContext};

/// Result of a delegate or observer callback.
///
/// - Success: nothing to report
/// - Failure: the callback could not do its work; logged as a warning
/// - Error: the callback hit an unexpected condition; logged as an error
///
/// Neither outcome rolls back the committed state or stops the remaining dispatch.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CallbackResult {
    Success,
    Failure,
    Error,
}

/// Application-side lifecycle callbacks.
///
/// `did_finish_launching` is the only required method; every other callback defaults to a
/// no-op.
///
/// Every callback of one signal receives the same snapshot: the state after the whole signal.
/// For an implied connect straight to `Active`, `did_connect` already sees `Active` with the
/// session marked launched. Manager queries made during the callback still report the state
/// before the signal.
///
/// Callbacks run while the manager serializes signals. Mutating manager APIs
/// (`submit_signal`, `set_delegate`, observer registration) called from a callback return an
/// `ErrorKind::InvalidState` error; defer such work until the signal returns.
pub trait LifecycleDelegate: Send {
    /// Fired once per session, before the first foreground/background entry.
    fn did_finish_launching(&mut self, snapshot: &LifecycleSnapshot) -> CallbackResult;

    fn did_connect(&mut self, _snapshot: &LifecycleSnapshot) -> CallbackResult {
        CallbackResult::Success
    }

    fn did_become_active(&mut self, _snapshot: &LifecycleSnapshot) -> CallbackResult {
        CallbackResult::Success
    }

    fn did_become_limited(&mut self, _snapshot: &LifecycleSnapshot) -> CallbackResult {
        CallbackResult::Success
    }

    fn did_enter_background(&mut self, _snapshot: &LifecycleSnapshot) -> CallbackResult {
        CallbackResult::Success
    }

    /// Leaving a launched state for `NotRunning`. Never fired on disconnect.
    fn did_close(&mut self, _snapshot: &LifecycleSnapshot) -> CallbackResult {
        CallbackResult::Success
    }

    fn did_disconnect(&mut self, _snapshot: &LifecycleSnapshot) -> CallbackResult {
        CallbackResult::Success
    }

    fn audio_streaming_state_changed(
        &mut self,
        _old: AudioStreamingState,
        _new: AudioStreamingState,
        _snapshot: &LifecycleSnapshot,
    ) -> CallbackResult {
        CallbackResult::Success
    }

    fn system_context_changed(
        &mut self,
        _old: SystemContext,
        _new: SystemContext,
        _snapshot: &LifecycleSnapshot,
    ) -> CallbackResult {
        CallbackResult::Success
    }
}

impl<D: LifecycleDelegate + ?Sized> LifecycleDelegate for Box<D> {
    fn did_finish_launching(&mut self, snapshot: &LifecycleSnapshot) -> CallbackResult {
        (**self).did_finish_launching(snapshot)
    }
    fn did_connect(&mut self, snapshot: &LifecycleSnapshot) -> CallbackResult {
        (**self).did_connect(snapshot)
    }
    fn did_become_active(&mut self, snapshot: &LifecycleSnapshot) -> CallbackResult {
        (**self).did_become_active(snapshot)
    }
    fn did_become_limited(&mut self, snapshot: &LifecycleSnapshot) -> CallbackResult {
        (**self).did_become_limited(snapshot)
    }
    fn did_enter_background(&mut self, snapshot: &LifecycleSnapshot) -> CallbackResult {
        (**self).did_enter_background(snapshot)
    }
    fn did_close(&mut self, snapshot: &LifecycleSnapshot) -> CallbackResult {
        (**self).did_close(snapshot)
    }
    fn did_disconnect(&mut self, snapshot: &LifecycleSnapshot) -> CallbackResult {
        (**self).did_disconnect(snapshot)
    }
    fn audio_streaming_state_changed(
        &mut self,
        old: AudioStreamingState,
        new: AudioStreamingState,
        snapshot: &LifecycleSnapshot,
    ) -> CallbackResult {
        (**self).audio_streaming_state_changed(old, new, snapshot)
    }
    fn system_context_changed(
        &mut self,
        old: SystemContext,
        new: SystemContext,
        snapshot: &LifecycleSnapshot,
    ) -> CallbackResult {
        (**self).system_context_changed(old, new, snapshot)
    }
}
