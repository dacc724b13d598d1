//! hmiext_manager
//!
//! Lifecycle facade for head-unit applications, built on top of hmiext_core.
//! Owns current state, serializes incoming signals and fans transition events out to the
//! application delegate and to notification observers.

pub mod error;
pub mod lifecycle;

// Re-export core types that manager users will commonly need
pub use hmiext_core::error::{CoreError, Result};
pub use hmiext_core::lifecycle::{ApplicationState, Signal, TransitionEvent};
