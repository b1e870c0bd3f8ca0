use std::sync::Mutex;

/// Receives the human-readable dumps the reporter produces while building and
/// sending an event. Not authoritative output.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, message: &str);
}

/// Forwards every record to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, message: &str) {
        tracing::debug!(target: "raven::diagnostics", "{}", message);
    }
}

/// Keeps records in memory; handy for tests and for embedding hosts that
/// surface diagnostics themselves.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<String> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, message: &str) {
        // a poisoned lock still holds usable records
        let mut records = match self.records.lock() {
            Ok(records) => records,
            Err(poisoned) => poisoned.into_inner(),
        };
        records.push(message.to_string());
    }
}
