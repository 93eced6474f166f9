// Batch screening: sequential orchestration, live progress, ranking.
// All model calls go through analysis::AnalysisClient.

pub mod handlers;
pub mod orchestrator;
pub mod ranking;
pub mod registry;

pub use orchestrator::Orchestrator;
pub use registry::BatchRegistry;
