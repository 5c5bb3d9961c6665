use std::sync::Arc;

use crate::auth::IdentityProvider;
use crate::config::Config;
use crate::documents::{DocumentTextExtractor, ProfileScraper};
use crate::jobs::JobSearchProvider;
use crate::resilience::Orchestrator;
use crate::store::PersistenceGateway;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Holds no per-request mutable state; each orchestration run is isolated.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PersistenceGateway>,
    /// All generation calls go through here; never call the provider directly.
    pub orchestrator: Orchestrator,
    pub identity: Arc<dyn IdentityProvider>,
    pub jobs: Arc<dyn JobSearchProvider>,
    pub extractor: Arc<dyn DocumentTextExtractor>,
    pub scraper: Arc<dyn ProfileScraper>,
    pub config: Config,
}
