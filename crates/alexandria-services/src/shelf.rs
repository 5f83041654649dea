//! The shelf listing service.
//!
//! Renders the catalog listing at the application root, which is also the
//! redirect target for document requests that name no document. GET only;
//! a POST falls through to the default `mutate` and fails with 405.

use alexandria_catalog::CatalogStore;
use alexandria_core::attr;
use alexandria_pipeline::{Exchange, ServiceHooks};
use std::sync::Arc;

/// The landing page: every document on the shelf.
pub struct ShelfService {
    catalog: Arc<dyn CatalogStore>,
}

impl ShelfService {
    /// Creates the service over the shared catalog.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }
}

impl ServiceHooks for ShelfService {
    fn name(&self) -> &'static str {
        "shelf"
    }

    fn fragment(&self) -> &'static str {
        "shelf"
    }

    fn pre_page(&self, ex: &mut Exchange) {
        // One acquisition of the catalog's critical section for the whole
        // snapshot; the listing may be stale by the time it renders, like
        // any other lookup.
        let listing = self.catalog.shelf();
        let listing = serde_json::to_value(listing).expect("metadata projections serialize");
        ex.context.set_attr(attr::SHELF_LISTING, listing);
    }
}
