//! hmiext_manager::lifecycle
//!
//! Application-facing lifecycle façade.
//!
//! Exposes the delegate/observer surfaces while keeping the transition semantics in hmiext_core.

/// Re-export core lifecycle types
pub use hmiext_core::lifecycle::{
    ApplicationState, AudioStreamingState, EventTag, HmiLevel, LifecycleSnapshot, ResolvePolicy,
    SessionId, Signal, StateGate, SystemContext, TransitionEvent,
};

// Application callbacks.
mod delegate;
pub use delegate::{CallbackResult, LifecycleDelegate};

// Notification payload (broadcast twin of a delegate call).
mod events;
pub use events::Notification;

// Passive observers.
mod observer;
pub use observer::{NotificationObserver, ObserverId};

// Ordered dual-sink dispatch.
mod dispatch;
pub use dispatch::{DispatchContext, DispatchReport, EventDispatcher};

// Lifecycle facade.
mod manager;
pub use manager::{
    LifecycleManager, LifecycleManagerBuilder, SignalOutcome, DEFAULT_NOTIFICATION_CAPACITY,
};

// State-gated timer.
mod managed_timer;
pub use managed_timer::ManagedInterval;

// Channel-fed signal ingestion.
mod pump;
pub use pump::{spawn_signal_pump, PumpSummary};
