//! HTTP message types and the response assembly sink.
//!
//! The pipeline assembles each page out of three rendered fragments and a
//! handful of terminal writes (redirects, error statuses). [`ResponseSink`]
//! accumulates those pieces and enforces single-commit semantics: the first
//! terminal write wins, and later ones are reported back to the caller as
//! [`ResponseError::AlreadyCommitted`] instead of clobbering what is
//! already on the wire.

use bytes::Bytes;
use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE, LOCATION};
use http::StatusCode;
use http_body_util::Full;
use thiserror::Error;

/// The HTTP request type used by the pipeline.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type produced by the pipeline.
pub type Response = http::Response<Full<Bytes>>;

/// What committed a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Committed {
    /// A redirect to the given location.
    Redirect(String),

    /// A terminal error status.
    Failed(StatusCode),
}

/// Errors from writing to a [`ResponseSink`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResponseError {
    /// A terminal write was attempted after the response had committed.
    ///
    /// The earlier commit stands; the attempted write never reaches the
    /// client. Callers log and discard this.
    #[error("response already committed")]
    AlreadyCommitted {
        /// The write that committed the response first.
        first: Committed,
        /// The write that was rejected.
        attempted: Committed,
    },
}

/// Accumulates the response for one request.
///
/// Body fragments are appended in render order. A redirect or an error
/// status is a *terminal* write: it commits the response, after which
/// fragments are dropped and further terminal writes fail with
/// [`ResponseError::AlreadyCommitted`].
///
/// # Example
///
/// ```
/// use alexandria_core::ResponseSink;
/// use http::StatusCode;
///
/// let mut sink = ResponseSink::new();
/// sink.redirect("/").unwrap();
///
/// // The page hook's 404 attempt is rejected, not written.
/// assert!(sink.fail(StatusCode::NOT_FOUND, "document not found").is_err());
///
/// let response = sink.into_response();
/// assert_eq!(response.status(), StatusCode::SEE_OTHER);
/// ```
#[derive(Debug)]
pub struct ResponseSink {
    headers: HeaderMap,
    fragments: Vec<String>,
    committed: Option<Committed>,
    error_message: Option<String>,
}

impl ResponseSink {
    /// Creates an empty sink. The default outcome is `200 OK` with the
    /// accumulated fragments as body.
    #[must_use]
    pub fn new() -> Self {
        Self {
            headers: HeaderMap::new(),
            fragments: Vec::new(),
            committed: None,
            error_message: None,
        }
    }

    /// Returns `true` once a terminal write has committed the response.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        self.committed.is_some()
    }

    /// Returns what committed the response, if anything.
    #[must_use]
    pub fn committed(&self) -> Option<&Committed> {
        self.committed.as_ref()
    }

    /// Returns the status the response will carry.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match &self.committed {
            None => StatusCode::OK,
            Some(Committed::Redirect(_)) => StatusCode::SEE_OTHER,
            Some(Committed::Failed(status)) => *status,
        }
    }

    /// Sets a response header, replacing any previous value.
    pub fn insert_header(&mut self, name: http::header::HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Appends a rendered fragment to the body.
    ///
    /// Fragments pushed after the response has committed are dropped: the
    /// body belongs to whatever committed the response. Returns `true` if
    /// the fragment was kept.
    pub fn push_fragment(&mut self, fragment: impl Into<String>) -> bool {
        if self.committed.is_some() {
            tracing::debug!("dropping fragment pushed after response commit");
            return false;
        }
        self.fragments.push(fragment.into());
        true
    }

    /// Commits the response as a `303 See Other` redirect to `location`.
    pub fn redirect(&mut self, location: impl Into<String>) -> Result<(), ResponseError> {
        self.commit(Committed::Redirect(location.into()))
    }

    /// Commits the response with an error status and explanatory message.
    pub fn fail(
        &mut self,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Result<(), ResponseError> {
        let message = message.into();
        self.commit(Committed::Failed(status)).map(|()| {
            self.error_message = Some(message);
        })
    }

    fn commit(&mut self, write: Committed) -> Result<(), ResponseError> {
        match &self.committed {
            Some(first) => Err(ResponseError::AlreadyCommitted {
                first: first.clone(),
                attempted: write,
            }),
            None => {
                self.committed = Some(write);
                Ok(())
            }
        }
    }

    /// Finalizes the sink into an HTTP response.
    #[must_use]
    pub fn into_response(self) -> Response {
        let (status, content_type, body) = match &self.committed {
            None => (
                StatusCode::OK,
                "text/html; charset=utf-8",
                self.fragments.concat(),
            ),
            Some(Committed::Redirect(_)) => (StatusCode::SEE_OTHER, "text/plain; charset=utf-8", String::new()),
            Some(Committed::Failed(failed)) => (
                *failed,
                "text/plain; charset=utf-8",
                self.error_message.clone().unwrap_or_default(),
            ),
        };

        let mut response = http::Response::builder()
            .status(status)
            .body(Full::new(Bytes::from(body)))
            .expect("static response parts are valid");

        response.headers_mut().extend(self.headers);
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));

        if let Some(Committed::Redirect(location)) = self.committed {
            let value = HeaderValue::try_from(location)
                .unwrap_or_else(|_| HeaderValue::from_static("/"));
            response.headers_mut().insert(LOCATION, value);
        }

        response
    }
}

impl Default for ResponseSink {
    fn default() -> Self {
        Self::new()
    }
}
