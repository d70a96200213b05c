//! Shared application state for all routes.

use crate::store::ListingStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ListingStore>,
}

impl AppState {
    pub fn new(store: impl ListingStore + 'static) -> Self {
        AppState {
            store: Arc::new(store),
        }
    }
}
