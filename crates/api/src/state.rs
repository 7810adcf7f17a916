//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::CatalogStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// catalog store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Box<dyn CatalogStore>,
}

impl AppState {
    /// Create a new application state over a catalog store.
    #[must_use]
    pub fn new(store: impl CatalogStore + 'static) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store: Box::new(store),
            }),
        }
    }

    /// Get a reference to the catalog store.
    #[must_use]
    pub fn store(&self) -> &dyn CatalogStore {
        self.inner.store.as_ref()
    }
}
