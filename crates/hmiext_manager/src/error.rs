use hmiext_core::error::{CoreError, Severity};

/// Emit a core error through `tracing` at the level its severity maps to.
pub fn log_core_error(err: &CoreError) {
    let domain = err.domain;
    let kind = err.kind;
    match err.severity {
        Severity::Trace => tracing::trace!(?domain, ?kind, "{err}"),
        Severity::Debug => tracing::debug!(?domain, ?kind, "{err}"),
        Severity::Info => tracing::info!(?domain, ?kind, "{err}"),
        Severity::Warn => tracing::warn!(?domain, ?kind, payload = ?err.payload, "{err}"),
        Severity::Error | Severity::Fatal => {
            tracing::error!(?domain, ?kind, payload = ?err.payload, "{err}")
        }
    }
}
