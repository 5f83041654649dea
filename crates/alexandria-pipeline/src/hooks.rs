//! The service hook contract.
//!
//! Every service implements [`ServiceHooks`]; the pipeline drives the
//! hooks in a fixed order that services cannot change. Hooks run
//! synchronously to completion before the pipeline advances, so a service
//! never observes two of its hooks running concurrently for one request.

use crate::exchange::Exchange;
use http::StatusCode;

/// The capability set a service supplies to the pipeline.
///
/// All hooks have provided no-op defaults except [`mutate`], which follows
/// the reference behavior of failing the response with `405 Method Not
/// Allowed` when a service receives a mutating request it does not handle,
/// and [`rejected`], which does the same for gate-rejected requests absent
/// an override.
///
/// # Invariants (enforced by the pipeline, relied on by implementors)
///
/// - `pre` and `post` run exactly once per request
/// - `mutate` runs at most once, only for mutating requests, before the gate
/// - the page hooks run only on accepted requests, interleaved with the
///   three fragment renders: `pre_page`, header, `pre_content`, content,
///   `post_content`, footer, `post_page`
///
/// [`mutate`]: ServiceHooks::mutate
/// [`rejected`]: ServiceHooks::rejected
pub trait ServiceHooks: Send + Sync {
    /// Returns the unique name of this service, used for logging.
    fn name(&self) -> &'static str;

    /// Returns the content fragment identifier for this service.
    fn fragment(&self) -> &'static str;

    /// Runs before everything else; sets request-scoped defaults.
    fn pre(&self, _ex: &mut Exchange) {}

    /// Handles a mutating request. Runs before the acceptance gate so the
    /// page hooks observe post-mutation state.
    ///
    /// A request lacking the service's action marker must be a no-op here.
    fn mutate(&self, ex: &mut Exchange) {
        if let Err(error) = ex
            .response
            .fail(StatusCode::METHOD_NOT_ALLOWED, "mutation not supported")
        {
            tracing::debug!(service = self.name(), %error, "default mutate: response already committed");
        }
    }

    /// Runs first on the accepted path, before the header fragment.
    fn pre_page(&self, _ex: &mut Exchange) {}

    /// Runs between the header and content fragments.
    fn pre_content(&self, _ex: &mut Exchange) {}

    /// Runs between the content and footer fragments.
    fn post_content(&self, _ex: &mut Exchange) {}

    /// Runs last on the accepted path, after the footer fragment.
    fn post_page(&self, _ex: &mut Exchange) {}

    /// Runs instead of the page hooks when the gate rejects the request.
    fn rejected(&self, ex: &mut Exchange) {
        if let Err(error) = ex
            .response
            .fail(StatusCode::METHOD_NOT_ALLOWED, "request not accepted")
        {
            tracing::debug!(service = self.name(), %error, "default rejection: response already committed");
        }
    }

    /// Runs last, on both the accepted and the rejected path.
    fn post(&self, _ex: &mut Exchange) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::ServiceRequest;
    use alexandria_core::Session;
    use bytes::Bytes;
    use http::{HeaderMap, Method, Uri};
    use std::sync::Arc;

    struct Minimal;

    impl ServiceHooks for Minimal {
        fn name(&self) -> &'static str {
            "minimal"
        }

        fn fragment(&self) -> &'static str {
            "minimal"
        }
    }

    fn exchange(method: Method) -> Exchange {
        let request = ServiceRequest::new(
            method,
            Uri::from_static("/minimal"),
            HeaderMap::new(),
            Bytes::new(),
        );
        Exchange::new(request, Arc::new(Session::new()))
    }

    #[test]
    fn test_default_mutate_fails_405() {
        let mut ex = exchange(Method::POST);
        Minimal.mutate(&mut ex);
        assert_eq!(ex.response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_default_mutate_keeps_earlier_commit() {
        let mut ex = exchange(Method::POST);
        ex.response.redirect("/").unwrap();
        Minimal.mutate(&mut ex);
        assert_eq!(ex.response.status(), StatusCode::SEE_OTHER);
    }

    #[test]
    fn test_default_rejected_fails_405() {
        let mut ex = exchange(Method::GET);
        Minimal.rejected(&mut ex);
        assert_eq!(ex.response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_other_defaults_do_nothing() {
        let mut ex = exchange(Method::GET);
        Minimal.pre(&mut ex);
        Minimal.pre_page(&mut ex);
        Minimal.pre_content(&mut ex);
        Minimal.post_content(&mut ex);
        Minimal.post_page(&mut ex);
        Minimal.post(&mut ex);
        assert!(!ex.response.is_committed());
    }
}
