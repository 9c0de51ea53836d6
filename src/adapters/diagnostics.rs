//! Diagnostic reporter that writes structured log events.

use crate::ports::{Diagnostic, DiagnosticReporter};

/// Reports diagnostics as `tracing` warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnosticReporter;

impl TracingDiagnosticReporter {
    pub fn new() -> Self {
        Self
    }
}

impl DiagnosticReporter for TracingDiagnosticReporter {
    fn report(&self, diagnostic: Diagnostic) {
        let user_id = diagnostic.user_id.as_ref().map(|id| id.as_str());
        tracing::warn!(
            context = %diagnostic.context,
            user_id,
            details = ?diagnostic.details,
            "{}",
            diagnostic.message
        );
    }
}
