use crate::analysis::AnalysisClient;
use crate::batch::{BatchRegistry, Orchestrator};
use crate::history::HistoryStore;
use crate::settings::Settings;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub history: HistoryStore,
    /// Used directly for per-candidate follow-ups (interview plan, raw text).
    pub analysis: AnalysisClient,
    pub orchestrator: Orchestrator,
    /// Live and recently finished batch runs, polled by the front-end.
    pub batches: BatchRegistry,
}

impl AppState {
    pub fn new(settings: Settings, history: HistoryStore, analysis: AnalysisClient) -> Self {
        Self {
            orchestrator: Orchestrator::new(analysis.clone(), history.clone()),
            settings,
            history,
            analysis,
            batches: BatchRegistry::new(),
        }
    }
}
