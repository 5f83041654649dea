//! # Alexandria
//!
//! A library/media-center web application: patrons view documents and
//! borrow them.
//!
//! Every inbound request flows through one fixed lifecycle, identical for
//! all pages:
//!
//! ```text
//! Request → session → pre → [mutate, POST only] → gate ─┬→ page hooks + 3 fragments → post
//!                                                       └→ rejected → post
//! ```
//!
//! The pieces:
//!
//! - [`pipeline`] drives the lifecycle and owns its ordering guarantees
//! - [`services`] implements the concrete pages (document view/borrow, shelf)
//! - [`catalog`] is the shared document store behind one global critical section
//! - [`server`] hosts it all on Hyper/Tokio with session cookies and
//!   graceful shutdown
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use alexandria::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog: Arc<dyn CatalogStore> = Arc::new(SharedCatalog::new());
//!
//!     Server::builder()
//!         .renderer(Arc::new(my_fragments()))
//!         .route("/document", Arc::new(DocumentService::new(catalog)), Arc::new(AcceptAll))
//!         .build()
//!         .run()
//!         .await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/alexandria/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use alexandria_core as core;

pub use alexandria_catalog as catalog;

pub use alexandria_pipeline as pipeline;

pub use alexandria_services as services;

pub use alexandria_server as server;

pub use alexandria_telemetry as telemetry;

/// Commonly used types, importable in one line.
pub mod prelude {
    pub use alexandria_catalog::{
        BorrowError, CatalogStore, Document, DocumentId, DocumentKind, DocumentMeta, SharedCatalog,
    };
    pub use alexandria_core::{
        attr, RequestContext, ResponseSink, ServiceError, Session, SessionStore, UserIdentity,
    };
    pub use alexandria_pipeline::{
        AcceptAll, AcceptGate, Exchange, FragmentRenderer, GateFn, HtmlFragments, Pipeline,
        ServiceHooks, ServiceRequest, SignedInGate,
    };
    pub use alexandria_server::{Server, ServerConfig};
    pub use alexandria_services::{DocumentService, ShelfService};
    pub use alexandria_telemetry::{init_logging, LogConfig};
}
