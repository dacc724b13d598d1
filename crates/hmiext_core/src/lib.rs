//! hmiext_core: transport-agnostic lifecycle semantics for head-unit applications.
//!
//! Design goals:
//! - Pure, testable logic (no RPC deps).
//! - Explicit types; no macro wizardry.
//! - Small, stable public API surface.

pub mod error;

/// Application state machine + transition table.
pub mod lifecycle;
