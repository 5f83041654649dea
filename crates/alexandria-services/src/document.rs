//! The document page service.
//!
//! Renders a single document's page (`GET /document?id=<int>`) and handles
//! the borrow action for it (`POST /document` with the `emprunter`
//! parameter).

use alexandria_catalog::{CatalogStore, Document, DocumentId};
use alexandria_core::attr;
use alexandria_pipeline::{Exchange, ServiceHooks};
use http::StatusCode;
use serde_json::json;
use std::sync::Arc;

/// Query or form parameter naming the document to operate on.
pub const PARAM_ID: &str = "id";

/// Request parameter that triggers the borrow action. Also published to
/// the render context under [`attr::ACTION_TOKEN`] so the content fragment
/// can label the borrow control.
pub const ACTION_BORROW: &str = "emprunter";

/// Message shown after a successful borrow.
const BORROW_SUCCESS: &str = "Enjoy your loan!";

/// Outcome of resolving the document named by the request.
///
/// Resolution returns tagged values and performs no logging or response
/// writes of its own; [`DocumentService::fetch_document`] applies those at
/// the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DocumentLookup {
    /// A snapshot of the document, taken under the catalog lock.
    Found(Document),
    /// The id was valid but names no document.
    NotFound,
    /// The id parameter is not an integer (raw value kept for diagnostics).
    Invalid(String),
    /// No id parameter at all.
    Missing,
}

/// The document page: view one document, borrow it.
pub struct DocumentService {
    catalog: Arc<dyn CatalogStore>,
}

impl DocumentService {
    /// Creates the service over the shared catalog.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }

    /// Resolves the document named by the request's `id` parameter.
    ///
    /// The `Found` arm holds the catalog's global critical section for
    /// exactly the lookup; the returned document is a snapshot.
    fn resolve_document(&self, ex: &Exchange) -> DocumentLookup {
        match ex.request().param(PARAM_ID) {
            None => DocumentLookup::Missing,
            Some(raw) => match raw.parse::<u64>() {
                Err(_) => DocumentLookup::Invalid(raw.to_string()),
                Ok(id) => self
                    .catalog
                    .lookup(DocumentId::new(id))
                    .map_or(DocumentLookup::NotFound, DocumentLookup::Found),
            },
        }
    }

    /// Resolves the document and applies the boundary side effects.
    ///
    /// Returns `None` for "no document". A missing id additionally issues
    /// a redirect to the application root, after which the remaining
    /// output of this request pass is unreliable; the response commit
    /// guard keeps later writes off the wire.
    fn fetch_document(&self, ex: &mut Exchange) -> Option<Document> {
        match self.resolve_document(ex) {
            DocumentLookup::Found(document) => Some(document),
            DocumentLookup::NotFound => None,
            DocumentLookup::Invalid(raw) => {
                tracing::warn!(raw = raw.as_str(), "document id is not an integer");
                None
            }
            DocumentLookup::Missing => {
                ex.context.set_attr(attr::REDIRECT, json!("/"));
                if let Err(error) = ex.response.redirect("/") {
                    tracing::debug!(%error, "redirect attempted after response commit");
                }
                None
            }
        }
    }
}

impl ServiceHooks for DocumentService {
    fn name(&self) -> &'static str {
        "document"
    }

    fn fragment(&self) -> &'static str {
        "document"
    }

    fn pre(&self, ex: &mut Exchange) {
        ex.context.set_attr(attr::ACTION_TOKEN, json!(ACTION_BORROW));
    }

    fn pre_page(&self, ex: &mut Exchange) {
        match self.fetch_document(ex) {
            Some(document) => {
                let meta = serde_json::to_value(document.meta())
                    .expect("metadata projection serializes");
                ex.context.set_attr(attr::DOCUMENT_META, meta);
            }
            None => {
                // Attempted even when resolution already redirected; the
                // commit guard keeps the first response (the redirect).
                if let Err(error) = ex
                    .response
                    .fail(StatusCode::NOT_FOUND, "document not found")
                {
                    tracing::debug!(%error, "404 attempted after response commit");
                }
            }
        }
    }

    fn mutate(&self, ex: &mut Exchange) {
        // No action marker: nothing actionable in this mutation pass.
        if ex.request().param(ACTION_BORROW).is_none() {
            return;
        }

        let Some(document) = self.fetch_document(ex) else {
            return;
        };

        // Second, separate acquisition of the catalog's critical section:
        // resolution and borrow are not atomic with respect to each other,
        // and borrow decides against current state.
        let identity = ex.session().identity();
        match self.catalog.borrow(&document, identity.as_ref()) {
            Ok(()) => {
                ex.context.set_attr(attr::MESSAGE, json!(BORROW_SUCCESS));
            }
            Err(error) => {
                tracing::info!(document = %document.id(), %error, "borrow rejected");
                ex.context.set_attr(attr::MESSAGE, json!(error.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alexandria_catalog::{Document, DocumentKind, SharedCatalog};
    use alexandria_core::{RequestContext, Session, SessionStore, UserIdentity};
    use alexandria_pipeline::{
        AcceptAll, Dispatched, FragmentRenderer, Pipeline, RenderError, ServiceRequest,
    };
    use bytes::Bytes;
    use http::header::CONTENT_TYPE;
    use http::{HeaderMap, Method, Uri};
    use serde_json::Value;
    use std::sync::Mutex;

    /// Captures what the content fragment would have seen.
    #[derive(Default)]
    struct Captured {
        meta: Mutex<Option<Value>>,
        message: Mutex<Option<String>>,
        action: Mutex<Option<String>>,
    }

    struct CapturingRenderer {
        captured: Arc<Captured>,
    }

    impl FragmentRenderer for CapturingRenderer {
        fn render(&self, fragment: &str, ctx: &RequestContext) -> Result<String, RenderError> {
            if fragment == "document" {
                *self.captured.meta.lock().unwrap() = ctx.attr(attr::DOCUMENT_META).cloned();
                *self.captured.message.lock().unwrap() =
                    ctx.attr_str(attr::MESSAGE).map(String::from);
                *self.captured.action.lock().unwrap() =
                    ctx.attr_str(attr::ACTION_TOKEN).map(String::from);
            }
            Ok(format!("<{fragment}/>"))
        }
    }

    fn seeded_catalog() -> Arc<SharedCatalog> {
        Arc::new(SharedCatalog::with_documents([
            Document::new(1, "Almagest", "Ptolemy", DocumentKind::Book),
            Document::new(2, "Metropolis", "Fritz Lang", DocumentKind::Film),
        ]))
    }

    struct Harness {
        pipeline: Pipeline,
        service: DocumentService,
        catalog: Arc<SharedCatalog>,
        captured: Arc<Captured>,
    }

    impl Harness {
        fn new() -> Self {
            Self::over(seeded_catalog())
        }

        fn over(catalog: Arc<SharedCatalog>) -> Self {
            let captured = Arc::new(Captured::default());
            let pipeline = Pipeline::new(
                Arc::new(CapturingRenderer {
                    captured: Arc::clone(&captured),
                }),
                Arc::new(SessionStore::new()),
            );
            let service = DocumentService::new(Arc::clone(&catalog) as Arc<dyn CatalogStore>);
            Self {
                pipeline,
                service,
                catalog,
                captured,
            }
        }

        fn signed_in_session(&self, user_id: &str) -> Arc<Session> {
            let session = self.pipeline.sessions().get_or_create(None);
            session.attach_identity(UserIdentity::new(user_id));
            session
        }

        fn get(&self, uri: &str) -> Dispatched {
            let request = ServiceRequest::new(
                Method::GET,
                uri.parse::<Uri>().expect("test uri is valid"),
                HeaderMap::new(),
                Bytes::new(),
            );
            self.pipeline
                .dispatch(&self.service, &AcceptAll, request, None)
                .expect("dispatch should not fault")
        }

        fn post(&self, uri: &str, body: &str, session: &Arc<Session>) -> Dispatched {
            let mut headers = HeaderMap::new();
            headers.insert(
                CONTENT_TYPE,
                http::HeaderValue::from_static("application/x-www-form-urlencoded"),
            );
            let request = ServiceRequest::new(
                Method::POST,
                uri.parse::<Uri>().expect("test uri is valid"),
                headers,
                Bytes::from(body.to_string()),
            );
            self.pipeline
                .dispatch(&self.service, &AcceptAll, request, Some(session.id()))
                .expect("dispatch should not fault")
        }
    }

    #[test]
    fn test_get_existing_document_renders_metadata() {
        let harness = Harness::new();
        let dispatched = harness.get("/document?id=1");

        assert_eq!(dispatched.response.status(), StatusCode::OK);

        let meta = harness.captured.meta.lock().unwrap().clone().expect("metadata attached");
        assert_eq!(meta["title"], "Almagest");
        assert_eq!(meta["on_loan"], false);
        assert_eq!(
            harness.captured.action.lock().unwrap().as_deref(),
            Some(ACTION_BORROW),
            "the pre hook labels the borrow control"
        );
    }

    #[test]
    fn test_get_unknown_id_is_404() {
        let harness = Harness::new();
        let dispatched = harness.get("/document?id=99");
        assert_eq!(dispatched.response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_get_non_integer_id_is_404() {
        let harness = Harness::new();
        let dispatched = harness.get("/document?id=almagest");
        assert_eq!(dispatched.response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_get_missing_id_redirects_and_never_404s() {
        let harness = Harness::new();
        let dispatched = harness.get("/document");

        // The page hook still attempts its unconditional 404, but the
        // commit guard keeps the redirect: both must never happen on the
        // same request.
        assert_eq!(dispatched.response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            dispatched.response.headers().get(http::header::LOCATION).unwrap(),
            "/"
        );
    }

    #[test]
    fn test_pre_page_404_attempt_is_rejected_after_redirect() {
        // Drive the hook directly to observe that the 404 write is
        // attempted and rejected rather than never made.
        let harness = Harness::new();
        let request = ServiceRequest::new(
            Method::GET,
            Uri::from_static("/document"),
            HeaderMap::new(),
            Bytes::new(),
        );
        let mut ex = Exchange::new(request, Arc::new(Session::new()));

        harness.service.pre_page(&mut ex);

        assert!(ex.response.is_committed());
        assert_eq!(ex.response.status(), StatusCode::SEE_OTHER);
        assert_eq!(ex.context.attr_str(attr::REDIRECT), Some("/"));
    }

    #[test]
    fn test_post_borrow_success_then_get_reflects_loan() {
        let harness = Harness::new();
        let session = harness.signed_in_session("p-1");

        let dispatched = harness.post("/document?id=1", "emprunter=1", &session);
        assert_eq!(dispatched.response.status(), StatusCode::OK);
        assert_eq!(
            harness.captured.message.lock().unwrap().as_deref(),
            Some(BORROW_SUCCESS)
        );

        // Subsequent GET observes the loan.
        harness.get("/document?id=1");
        let meta = harness.captured.meta.lock().unwrap().clone().unwrap();
        assert_eq!(meta["on_loan"], true);
    }

    #[test]
    fn test_post_borrow_id_in_form_body() {
        let harness = Harness::new();
        let session = harness.signed_in_session("p-1");

        harness.post("/document", "emprunter=1&id=2", &session);
        assert!(harness.catalog.lookup(DocumentId::new(2)).unwrap().is_on_loan());
    }

    #[test]
    fn test_post_without_action_is_a_noop() {
        let harness = Harness::new();
        let session = harness.signed_in_session("p-1");

        let dispatched = harness.post("/document?id=1", "", &session);

        assert_eq!(dispatched.response.status(), StatusCode::OK);
        assert!(
            harness.captured.message.lock().unwrap().is_none(),
            "no message for a mutation pass with nothing actionable"
        );
        assert!(!harness.catalog.lookup(DocumentId::new(1)).unwrap().is_on_loan());
    }

    #[test]
    fn test_post_borrow_without_identity_degrades_to_message() {
        let harness = Harness::new();
        let session = harness.pipeline.sessions().get_or_create(None);

        let dispatched = harness.post("/document?id=1", "emprunter=1", &session);

        assert_eq!(dispatched.response.status(), StatusCode::OK);
        let message = harness.captured.message.lock().unwrap().clone().unwrap();
        assert!(message.contains("sign in"));
        assert!(!harness.catalog.lookup(DocumentId::new(1)).unwrap().is_on_loan());
    }

    #[test]
    fn test_post_borrow_already_on_loan_shows_domain_message() {
        let harness = Harness::new();
        let first = harness.signed_in_session("p-1");
        let second = harness.signed_in_session("p-2");

        harness.post("/document?id=1", "emprunter=1", &first);
        let dispatched = harness.post("/document?id=1", "emprunter=1", &second);

        // A rejected borrow is a page message, not an HTTP error.
        assert_eq!(dispatched.response.status(), StatusCode::OK);
        let message = harness.captured.message.lock().unwrap().clone().unwrap();
        assert!(message.contains("already on loan"));

        let holder = harness
            .catalog
            .lookup(DocumentId::new(1))
            .unwrap()
            .loan()
            .unwrap()
            .holder
            .clone();
        assert_eq!(holder, "p-1");
    }

    #[test]
    fn test_concurrent_borrows_at_most_one_wins() {
        let catalog = seeded_catalog();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let catalog = Arc::clone(&catalog);
                std::thread::spawn(move || {
                    // Each request runs in its own session, all against the
                    // same shared catalog.
                    let harness = Harness::over(catalog);
                    let session = harness.signed_in_session(&format!("p-{i}"));
                    harness.post("/document?id=1", "emprunter=1", &session);
                    let message = harness.captured.message.lock().unwrap().clone().unwrap();
                    message
                })
            })
            .collect();

        let messages: Vec<String> = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread should not panic"))
            .collect();

        let winners = messages.iter().filter(|m| *m == BORROW_SUCCESS).count();
        let losers = messages
            .iter()
            .filter(|m| m.contains("already on loan"))
            .count();
        assert_eq!(winners, 1, "at most one concurrent borrow may succeed");
        assert_eq!(losers, messages.len() - 1);

        // The catalog records exactly one holder.
        let document = catalog.lookup(DocumentId::new(1)).unwrap();
        assert!(document.is_on_loan());
    }

    mod resolution_properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Any id that does not parse as an integer renders a 404,
            /// never a fault.
            #[test]
            fn non_integer_ids_yield_404(raw in "[a-zA-Z][a-zA-Z0-9 ]{0,16}") {
                prop_assume!(raw.parse::<u64>().is_err());

                let harness = Harness::new();
                let uri = format!(
                    "/document?id={}",
                    raw.replace(' ', "%20")
                );
                let dispatched = harness.get(&uri);
                prop_assert_eq!(dispatched.response.status(), StatusCode::NOT_FOUND);
            }

            /// Valid ids with no matching document also render a 404.
            #[test]
            fn unknown_numeric_ids_yield_404(id in 1000u64..u64::MAX) {
                let harness = Harness::new();
                let dispatched = harness.get(&format!("/document?id={id}"));
                prop_assert_eq!(dispatched.response.status(), StatusCode::NOT_FOUND);
            }
        }
    }
}
