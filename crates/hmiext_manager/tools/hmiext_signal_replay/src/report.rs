use std::fmt::Write as _;

use hmiext_core::lifecycle::{transition_graph, LifecycleSnapshot};
use hmiext_manager::lifecycle::{CallbackResult, LifecycleDelegate, Notification};
use tracing::info;

/// Delegate that logs every callback it receives.
pub struct ConsoleDelegate {
    app: String,
}

impl ConsoleDelegate {
    pub fn new(app: impl Into<String>) -> Self {
        Self { app: app.into() }
    }

    fn log(&self, callback: &str, snapshot: &LifecycleSnapshot) -> CallbackResult {
        info!(
            app = %self.app,
            callback,
            state = snapshot.app_state().label(),
            "delegate callback"
        );
        CallbackResult::Success
    }
}

impl LifecycleDelegate for ConsoleDelegate {
    fn did_finish_launching(&mut self, snapshot: &LifecycleSnapshot) -> CallbackResult {
        self.log("did_finish_launching", snapshot)
    }
    fn did_connect(&mut self, snapshot: &LifecycleSnapshot) -> CallbackResult {
        self.log("did_connect", snapshot)
    }
    fn did_become_active(&mut self, snapshot: &LifecycleSnapshot) -> CallbackResult {
        self.log("did_become_active", snapshot)
    }
    fn did_become_limited(&mut self, snapshot: &LifecycleSnapshot) -> CallbackResult {
        self.log("did_become_limited", snapshot)
    }
    fn did_enter_background(&mut self, snapshot: &LifecycleSnapshot) -> CallbackResult {
        self.log("did_enter_background", snapshot)
    }
    fn did_close(&mut self, snapshot: &LifecycleSnapshot) -> CallbackResult {
        self.log("did_close", snapshot)
    }
    fn did_disconnect(&mut self, snapshot: &LifecycleSnapshot) -> CallbackResult {
        self.log("did_disconnect", snapshot)
    }
}

/// One line per notification, e.g. `#3 session#1 did_become_active state=Active audio=audible context=main`.
pub fn format_notification(n: &Notification) -> String {
    let session = match n.session {
        Some(id) => id.to_string(),
        None => "-".to_string(),
    };
    format!(
        "#{} {} {} state={} audio={} context={}",
        n.seq,
        session,
        n.name(),
        n.snapshot.app_state().label(),
        n.snapshot.audio_streaming_state().label(),
        n.snapshot.system_context().label(),
    )
}

/// Every state pair with the events a fresh session would fire.
pub fn render_graph() -> String {
    let graph = transition_graph();
    let mut out = String::new();
    for edge in &graph.edges {
        let names: Vec<&str> = edge.events.iter().map(|e| e.tag().label()).collect();
        let _ = writeln!(
            out,
            "{} -> {}: {}",
            edge.from.label(),
            edge.to.label(),
            if names.is_empty() {
                "(none)".to_string()
            } else {
                names.join(", ")
            }
        );
    }
    out
}
