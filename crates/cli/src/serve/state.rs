//! Application state shared across request handlers.

use std::sync::Arc;

use hrdesk_storage::HrStorage;

pub(crate) struct AppState {
    /// Backend holding every HR collection.
    pub(crate) storage: Arc<dyn HrStorage>,
    /// Optional API key for authentication. None = no auth required.
    pub(crate) api_key: Option<String>,
}

impl AppState {
    pub(crate) fn new(storage: Arc<dyn HrStorage>, api_key: Option<String>) -> Self {
        Self { storage, api_key }
    }
}
