//! # Alexandria Server
//!
//! The HTTP serving layer for the Alexandria media center:
//!
//! - HTTP/1.1 via Hyper and Tokio
//! - Literal-path routing to `(service, gate)` pairs
//! - Session cookie plumbing in front of the pipeline
//! - Graceful shutdown with in-flight connection draining
//!
//! ## Example
//!
//! ```rust,ignore
//! use alexandria_server::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::builder()
//!         .config(ServerConfig::builder().http_addr("0.0.0.0:8080").build())
//!         .route("/document", document_service, gate)
//!         .build();
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/alexandria-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod cookie;
mod router;
mod server;
pub mod shutdown;

pub use config::{ServerConfig, ServerConfigBuilder};
pub use router::{RouteEntry, Router};
pub use server::{HttpResponse, ResponseBody, Server, ServerBuilder, ServerError};
pub use shutdown::ShutdownSignal;
