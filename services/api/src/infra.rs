use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use jobboard::board::{
    InMemoryBoardStore, InMemoryCompanyDirectory, JobBoardService, SessionRegistry,
};
use jobboard::config::SessionSeed;

pub(crate) type MemoryBoardService =
    JobBoardService<InMemoryBoardStore, InMemoryCompanyDirectory>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Service backed by fresh in-memory tables.
pub(crate) fn in_memory_board() -> Arc<MemoryBoardService> {
    Arc::new(JobBoardService::new(
        Arc::new(InMemoryBoardStore::new()),
        Arc::new(InMemoryCompanyDirectory::new()),
    ))
}

pub(crate) fn session_registry(seeds: &[SessionSeed]) -> Arc<SessionRegistry> {
    Arc::new(SessionRegistry::from_sessions(
        seeds
            .iter()
            .map(|seed| (seed.token.clone(), seed.caller.clone())),
    ))
}
