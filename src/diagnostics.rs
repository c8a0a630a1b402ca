use std::sync::Mutex;

use crate::error::KiraError;

/// Receives load failures. The viewer never shows them on screen.
pub trait DiagnosticSink: Send + Sync {
    fn record_failure(&self, source: &str, error: &KiraError);
}

/// Forwards failures to the ambient `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record_failure(&self, source: &str, error: &KiraError) {
        tracing::error!(source, kind = error.kind(), error = %error, "failed to load study metadata");
    }
}

/// Keeps failures in memory for callers that inspect them after a load.
#[derive(Debug, Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for RecordingSink {
    fn record_failure(&self, source: &str, error: &KiraError) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(format!("{source}: {error}"));
        }
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for std::sync::Arc<T> {
    fn record_failure(&self, source: &str, error: &KiraError) {
        (**self).record_failure(source, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.record_failure("a", &KiraError::StudyHttp("refused".to_string()));
        sink.record_failure("b", &KiraError::StudyDecode("eof".to_string()));
        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].starts_with("a: "));
        assert!(entries[1].contains("eof"));
    }
}
