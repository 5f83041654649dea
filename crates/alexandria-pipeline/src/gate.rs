//! The acceptance gate.
//!
//! A gate is a pure predicate over the exchange, evaluated exactly once
//! per request. The pipeline treats its answer as authoritative and final:
//! `true` proceeds to full-page rendering, `false` to the rejection hook.
//! The contract prescribes no side effects, although a concrete gate may
//! perform side-effecting checks of its own.

use crate::exchange::Exchange;

/// Decides whether a request proceeds to full-page rendering.
pub trait AcceptGate: Send + Sync {
    /// Returns `true` to accept the request.
    fn accept(&self, ex: &Exchange) -> bool;
}

/// Accepts every request. The gate for public pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl AcceptGate for AcceptAll {
    fn accept(&self, _ex: &Exchange) -> bool {
        true
    }
}

/// Accepts only requests whose session has a patron attached.
///
/// This stands in for the subscriber-gated service variant: the gating
/// rule itself is opaque to the pipeline, which only sees the predicate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignedInGate;

impl AcceptGate for SignedInGate {
    fn accept(&self, ex: &Exchange) -> bool {
        ex.session().is_signed_in()
    }
}

/// A gate built from a closure.
///
/// # Example
///
/// ```
/// use alexandria_pipeline::{AcceptGate, Exchange, GateFn};
///
/// let gate = GateFn::new(|ex: &Exchange| ex.request().param("token").is_some());
/// ```
pub struct GateFn<F> {
    predicate: F,
}

impl<F> GateFn<F>
where
    F: Fn(&Exchange) -> bool + Send + Sync,
{
    /// Wraps `predicate` as a gate.
    pub const fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F> AcceptGate for GateFn<F>
where
    F: Fn(&Exchange) -> bool + Send + Sync,
{
    fn accept(&self, ex: &Exchange) -> bool {
        (self.predicate)(ex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::ServiceRequest;
    use alexandria_core::{Session, UserIdentity};
    use bytes::Bytes;
    use http::{HeaderMap, Method, Uri};
    use std::sync::Arc;

    fn exchange(session: Arc<Session>) -> Exchange {
        let request = ServiceRequest::new(
            Method::GET,
            Uri::from_static("/document?id=1"),
            HeaderMap::new(),
            Bytes::new(),
        );
        Exchange::new(request, session)
    }

    #[test]
    fn test_accept_all() {
        let ex = exchange(Arc::new(Session::new()));
        assert!(AcceptAll.accept(&ex));
    }

    #[test]
    fn test_signed_in_gate() {
        let session = Arc::new(Session::new());
        let ex = exchange(Arc::clone(&session));
        assert!(!SignedInGate.accept(&ex));

        session.attach_identity(UserIdentity::new("p-1"));
        assert!(SignedInGate.accept(&ex));
    }

    #[test]
    fn test_gate_fn() {
        let gate = GateFn::new(|ex: &Exchange| ex.request().param("id") == Some("1"));
        let ex = exchange(Arc::new(Session::new()));
        assert!(gate.accept(&ex));
    }
}
