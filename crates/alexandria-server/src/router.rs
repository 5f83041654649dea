//! Request routing.
//!
//! Maps request paths to registered services. Paths are literal: the
//! application's surface carries its variability in query and form
//! parameters, not in path templates. Both GET and POST route to the same
//! service; the pipeline decides what a mutating request means.

use alexandria_pipeline::{AcceptGate, ServiceHooks};
use std::collections::HashMap;
use std::sync::Arc;

/// A registered page: the service plus the acceptance gate guarding it.
#[derive(Clone)]
pub struct RouteEntry {
    service: Arc<dyn ServiceHooks>,
    gate: Arc<dyn AcceptGate>,
}

impl RouteEntry {
    /// Pairs a service with its gate.
    #[must_use]
    pub fn new(service: Arc<dyn ServiceHooks>, gate: Arc<dyn AcceptGate>) -> Self {
        Self { service, gate }
    }

    /// Returns the service.
    #[must_use]
    pub fn service(&self) -> &dyn ServiceHooks {
        self.service.as_ref()
    }

    /// Returns the acceptance gate.
    #[must_use]
    pub fn gate(&self) -> &dyn AcceptGate {
        self.gate.as_ref()
    }
}

impl std::fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteEntry")
            .field("service", &self.service.name())
            .finish()
    }
}

/// HTTP request router.
///
/// # Example
///
/// ```rust,ignore
/// let mut router = Router::new();
/// router.add_service("/document", document_service, Arc::new(AcceptAll));
/// assert!(router.resolve("/document").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: HashMap<String, RouteEntry>,
}

impl Router {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a service under a literal path.
    ///
    /// A later registration under the same path replaces the earlier one.
    pub fn add_service(
        &mut self,
        path: impl Into<String>,
        service: Arc<dyn ServiceHooks>,
        gate: Arc<dyn AcceptGate>,
    ) {
        self.routes
            .insert(path.into(), RouteEntry::new(service, gate));
    }

    /// Resolves a request path to its registered service.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&RouteEntry> {
        self.routes.get(path)
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alexandria_pipeline::{AcceptAll, Exchange};

    struct Stub(&'static str);

    impl ServiceHooks for Stub {
        fn name(&self) -> &'static str {
            self.0
        }

        fn fragment(&self) -> &'static str {
            self.0
        }

        fn pre(&self, _ex: &mut Exchange) {}
    }

    #[test]
    fn test_empty_router_resolves_nothing() {
        let router = Router::new();
        assert!(router.resolve("/document").is_none());
        assert_eq!(router.route_count(), 0);
    }

    #[test]
    fn test_resolve_registered_path() {
        let mut router = Router::new();
        router.add_service("/document", Arc::new(Stub("document")), Arc::new(AcceptAll));
        router.add_service("/", Arc::new(Stub("shelf")), Arc::new(AcceptAll));

        assert_eq!(router.resolve("/document").unwrap().service().name(), "document");
        assert_eq!(router.resolve("/").unwrap().service().name(), "shelf");
        assert!(router.resolve("/missing").is_none());
    }

    #[test]
    fn test_paths_are_literal() {
        let mut router = Router::new();
        router.add_service("/document", Arc::new(Stub("document")), Arc::new(AcceptAll));
        assert!(router.resolve("/document/7").is_none());
    }

    #[test]
    fn test_later_registration_replaces() {
        let mut router = Router::new();
        router.add_service("/", Arc::new(Stub("first")), Arc::new(AcceptAll));
        router.add_service("/", Arc::new(Stub("second")), Arc::new(AcceptAll));
        assert_eq!(router.route_count(), 1);
        assert_eq!(router.resolve("/").unwrap().service().name(), "second");
    }
}
