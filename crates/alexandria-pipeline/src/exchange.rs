//! The per-request exchange passed to every hook.

use alexandria_core::{RequestContext, Response, ResponseSink, Session};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method, Uri};
use std::collections::HashMap;
use std::sync::Arc;

/// A parsed view over the inbound HTTP request.
///
/// Query and form parameters are decoded once at construction;
/// [`ServiceRequest::param`] then follows the servlet-style contract the
/// services rely on: query parameters shadow form parameters of the same
/// name, and a parameter that fails to decode simply does not exist.
///
/// # Example
///
/// ```
/// use alexandria_pipeline::ServiceRequest;
/// use http::{HeaderMap, Method, Uri};
/// use bytes::Bytes;
///
/// let request = ServiceRequest::new(
///     Method::GET,
///     Uri::from_static("/document?id=7"),
///     HeaderMap::new(),
///     Bytes::new(),
/// );
/// assert_eq!(request.param("id"), Some("7"));
/// assert!(!request.is_mutation());
/// ```
#[derive(Debug)]
pub struct ServiceRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    query: HashMap<String, String>,
    form: HashMap<String, String>,
}

impl ServiceRequest {
    /// Builds a request view from its parts and the collected body.
    #[must_use]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        let query = uri
            .query()
            .map(Self::parse_urlencoded)
            .unwrap_or_default();

        let form = if Self::is_form_content(&headers) {
            std::str::from_utf8(&body)
                .map(Self::parse_urlencoded)
                .unwrap_or_default()
        } else {
            HashMap::new()
        };

        Self {
            method,
            uri,
            headers,
            query,
            form,
        }
    }

    fn is_form_content(headers: &HeaderMap) -> bool {
        headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
    }

    fn parse_urlencoded(raw: &str) -> HashMap<String, String> {
        match serde_urlencoded::from_str(raw) {
            Ok(params) => params,
            Err(error) => {
                tracing::debug!(%error, "ignoring undecodable urlencoded parameters");
                HashMap::new()
            }
        }
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a request parameter: query string first, then form body.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .get(name)
            .or_else(|| self.form.get(name))
            .map(String::as_str)
    }

    /// Returns `true` for state-changing (POST) requests, which get the
    /// MUTATE phase.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        self.method == Method::POST
    }
}

/// Everything a hook can touch for one request.
///
/// The request view is read-only; the context and response are the hook's
/// to mutate. The exchange is owned by a single pipeline execution and
/// never shared across requests.
#[derive(Debug)]
pub struct Exchange {
    request: ServiceRequest,

    /// Attribute bag handed to the fragment renderers.
    pub context: RequestContext,

    /// Response under assembly.
    pub response: ResponseSink,
}

impl Exchange {
    /// Creates an exchange for `request` on behalf of `session`.
    #[must_use]
    pub fn new(request: ServiceRequest, session: Arc<Session>) -> Self {
        Self {
            request,
            context: RequestContext::new(session),
            response: ResponseSink::new(),
        }
    }

    /// Returns the inbound request view.
    #[must_use]
    pub const fn request(&self) -> &ServiceRequest {
        &self.request
    }

    /// Returns the client's session.
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        self.context.session()
    }

    /// Finalizes the exchange into an HTTP response.
    #[must_use]
    pub fn into_response(self) -> Response {
        self.response.into_response()
    }
}
