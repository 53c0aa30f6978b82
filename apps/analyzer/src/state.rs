use std::sync::Arc;

use crate::analysis::RemoteAnalyzer;
use crate::gate::AnalysisGate;
use crate::history::HistoryStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: RemoteAnalyzer,
    pub history: Arc<HistoryStore>,
    /// Busy flag for `/api/v1/analyze`; one analysis at a time.
    pub gate: AnalysisGate,
}
