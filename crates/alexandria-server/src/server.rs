//! HTTP server implementation.
//!
//! Built on Hyper and Tokio. The server owns the outermost
//! request-handling duties: TCP accept loop, body collection with a
//! timeout, session cookie extraction and issuance, routing, and the
//! unhandled-fault boundary (a pipeline fault becomes a generic 500, never
//! a crash of the serving process).

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Method, Response, StatusCode, Uri};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::TcpListener;

use alexandria_core::{ServiceError, SessionStore};
use alexandria_pipeline::{AcceptGate, FragmentRenderer, HtmlFragments, Pipeline, ServiceHooks, ServiceRequest};

use crate::config::ServerConfig;
use crate::cookie;
use crate::router::Router;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Type alias for the HTTP response body.
pub type ResponseBody = Full<Bytes>;

/// Type alias for the HTTP response.
pub type HttpResponse = Response<ResponseBody>;

/// Errors from running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured address could not be bound.
    #[error("Failed to bind: {0}")]
    Bind(String),

    /// An I/O error outside any single connection.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The Alexandria HTTP server.
///
/// # Example
///
/// ```rust,ignore
/// let server = Server::builder()
///     .config(ServerConfig::builder().http_addr("127.0.0.1:8080").build())
///     .renderer(fragments)
///     .route("/document", document_service, Arc::new(AcceptAll))
///     .build();
///
/// server.run().await?;
/// ```
pub struct Server {
    /// Server configuration.
    config: ServerConfig,

    /// Path-to-service routing table.
    router: Router,

    /// The request pipeline shared by every connection.
    pipeline: Pipeline,
}

impl Server {
    /// Creates a new server builder.
    #[must_use]
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the routing table.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Runs the server until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot bind to the configured
    /// address or the listener fails.
    pub async fn run(self) -> Result<(), ServerError> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Runs the server with a caller-controlled shutdown signal.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot bind or an I/O error occurs
    /// outside a single connection.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self.config.socket_addr().map_err(|e| {
            ServerError::Bind(format!("invalid address '{}': {}", self.config.http_addr(), e))
        })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("failed to bind to {addr}: {e}")))?;

        tracing::info!("server listening on {}", addr);

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            let server = Arc::clone(&server);
                            let token = tracker.acquire();
                            let shutdown = shutdown.clone();

                            tokio::spawn(async move {
                                if let Err(e) = server.handle_connection(stream, remote_addr, shutdown).await {
                                    tracing::error!("connection error from {}: {}", remote_addr, e);
                                }
                                drop(token);
                            });
                        }
                        Err(e) => {
                            tracing::error!("failed to accept connection: {}", e);
                        }
                    }
                }

                _ = shutdown.recv() => {
                    tracing::info!("shutdown signal received, stopping server");
                    break;
                }
            }
        }

        let shutdown_timeout = server.config.shutdown_timeout();
        tracing::info!(
            "waiting up to {:?} for {} connections to close",
            shutdown_timeout,
            tracker.active_connections()
        );

        tokio::select! {
            _ = tracker.drained() => {
                tracing::info!("all connections closed");
            }
            _ = tokio::time::sleep(shutdown_timeout) => {
                tracing::warn!(
                    "shutdown timeout reached, {} connections still active",
                    tracker.active_connections()
                );
            }
        }

        tracing::info!("server stopped");
        Ok(())
    }

    /// Handles a single connection.
    async fn handle_connection(
        self: &Arc<Self>,
        stream: tokio::net::TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(self);

        let service = service_fn(move |req: http::Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { server.handle_request(req).await }
        });

        let conn = http1::Builder::new().serve_connection(io, service);

        tokio::select! {
            result = conn => result,
            _ = shutdown.recv() => {
                tracing::debug!("connection from {} closed due to shutdown", remote_addr);
                Ok(())
            }
        }
    }

    /// Handles a single HTTP request: collects the body, then dispatches.
    async fn handle_request(
        self: &Arc<Self>,
        req: http::Request<Incoming>,
    ) -> Result<HttpResponse, Infallible> {
        let (parts, body) = req.into_parts();

        let body = match tokio::time::timeout(
            self.config.request_timeout(),
            Self::collect_body(body),
        )
        .await
        {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                tracing::error!("failed to collect request body: {}", e);
                return Ok(error_response(
                    StatusCode::BAD_REQUEST,
                    "failed to read request body",
                ));
            }
            Err(_) => {
                tracing::warn!("request body collection timed out");
                return Ok(error_response(
                    StatusCode::REQUEST_TIMEOUT,
                    "request body collection timed out",
                ));
            }
        };

        Ok(self.respond(parts.method, parts.uri, parts.headers, body))
    }

    /// Collects the request body into bytes.
    async fn collect_body(body: Incoming) -> Result<Bytes, hyper::Error> {
        Ok(body.collect().await?.to_bytes())
    }

    /// Routes a collected request through the pipeline.
    ///
    /// This is the synchronous heart of the serving layer: hooks introduce
    /// no suspension points, so the whole dispatch runs to completion here.
    fn respond(&self, method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> HttpResponse {
        tracing::debug!("{} {}", method, uri.path());

        if method != Method::GET && method != Method::POST {
            return fault_response(&ServiceError::unsupported(method.to_string()));
        }

        let Some(entry) = self.router.resolve(uri.path()) else {
            return fault_response(&ServiceError::not_found(format!(
                "no page at '{}'",
                uri.path()
            )));
        };

        let cookie_name = self.config.session_cookie();
        let inbound_session = cookie::session_from_headers(&headers, cookie_name);

        let request = ServiceRequest::new(method, uri, headers, body);
        match self
            .pipeline
            .dispatch(entry.service(), entry.gate(), request, inbound_session)
        {
            Ok(dispatched) => {
                let mut response = dispatched.response;
                // Issue the cookie when the client does not know this
                // session yet.
                if inbound_session != Some(dispatched.session.id()) {
                    response.headers_mut().append(
                        http::header::SET_COOKIE,
                        cookie::session_cookie(cookie_name, dispatched.session.id()),
                    );
                }
                response
            }
            Err(error) => {
                // Unhandled fault: generic server error, no retry.
                tracing::error!(%error, service = entry.service().name(), "pipeline fault");
                fault_response(&ServiceError::internal_with_source(
                    "request processing failed",
                    error,
                ))
            }
        }
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("routes", &self.router.route_count())
            .finish()
    }
}

/// Builds the response for a classified error, using its category's
/// status mapping.
fn fault_response(error: &ServiceError) -> HttpResponse {
    error_response(error.status_code(), &error.to_string())
}

/// Builds an error response with a plain-text body.
fn error_response(status: StatusCode, message: &str) -> HttpResponse {
    Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from(message.to_string())))
        .expect("static response parts are valid")
}

/// Builder for [`Server`].
#[derive(Default)]
pub struct ServerBuilder {
    config: ServerConfig,
    router: Router,
    renderer: Option<Arc<dyn FragmentRenderer>>,
    sessions: Option<Arc<SessionStore>>,
}

impl ServerBuilder {
    /// Sets the server configuration.
    #[must_use]
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the fragment renderer shared by every service.
    #[must_use]
    pub fn renderer(mut self, renderer: Arc<dyn FragmentRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Sets the session store. A fresh one is created if unset.
    #[must_use]
    pub fn sessions(mut self, sessions: Arc<SessionStore>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    /// Registers a service under a literal path.
    #[must_use]
    pub fn route(
        mut self,
        path: impl Into<String>,
        service: Arc<dyn ServiceHooks>,
        gate: Arc<dyn AcceptGate>,
    ) -> Self {
        self.router.add_service(path, service, gate);
        self
    }

    /// Builds the server.
    #[must_use]
    pub fn build(self) -> Server {
        let renderer = self
            .renderer
            .unwrap_or_else(|| Arc::new(HtmlFragments::new()));
        let sessions = self.sessions.unwrap_or_else(|| Arc::new(SessionStore::new()));

        Server {
            config: self.config,
            router: self.router,
            pipeline: Pipeline::new(renderer, sessions),
        }
    }
}

impl std::fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("config", &self.config)
            .field("routes", &self.router.route_count())
            .finish()
    }
}
