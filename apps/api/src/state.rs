use std::sync::Arc;

use crate::chat::composer::Composer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the search and generation collaborators chosen at startup.
    pub composer: Arc<Composer>,
}
