//! hmiext_core::lifecycle
//!
//! Pure (transport-agnostic) application lifecycle semantics for a head-unit hosted app.
//! This module intentionally contains **no** RPC or transport code.
//!
//! Key ideas:
//! - Five application states ordered by HMI presence strength
//! - `resolve()` turns one signal into the next snapshot plus ordered transition events
//! - Secondary states (audio, system context) are reported as independent deltas
//! - The manager layer owns storage, dispatch and thread serialization

mod engine;
mod event;
mod gate;
mod graph;
mod signal;
mod snapshot;
mod state;

pub use engine::{plan_transition, resolve, resolve_with, Resolution, ResolvePolicy};
pub use event::{EventTag, TransitionEvent};
pub use gate::StateGate;
pub use graph::{transition_graph, TransitionEdge, TransitionGraph};
pub use signal::Signal;
pub use snapshot::{LifecycleSnapshot, Session, SessionId};
pub use state::{ApplicationState, AudioStreamingState, HmiLevel, SystemContext, ALL_STATES};
