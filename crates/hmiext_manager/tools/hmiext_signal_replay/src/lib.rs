//! Replay line-oriented signal scripts through a `LifecycleManager`.

pub mod config;
pub mod report;
pub mod script;
