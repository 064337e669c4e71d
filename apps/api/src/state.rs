use std::sync::Arc;

use crate::auth::AuthProvider;
use crate::store::DataStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres in production, in-memory for local runs and tests.
    pub store: Arc<dyn DataStore>,
    pub auth: Arc<dyn AuthProvider>,
}
