//! # Alexandria Core
//!
//! Core types for the Alexandria media-center application.
//!
//! This crate provides the foundational types used throughout Alexandria:
//!
//! - [`RequestContext`] - Per-request attribute bag passed from hooks to rendering
//! - [`RequestId`] - UUID v7 request identifier
//! - [`Session`] / [`SessionStore`] - Per-client state with lazy creation
//! - [`UserIdentity`] - The patron attached to a session
//! - [`ServiceError`] - Standard error taxonomy
//! - [`ResponseSink`] - Response assembly with single-commit semantics

#![doc(html_root_url = "https://docs.rs/alexandria-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod identity;
mod response;
mod session;

pub use context::{attr, RequestContext, RequestId};
pub use error::{ErrorCategory, ServiceError, ServiceResult};
pub use identity::UserIdentity;
pub use response::{Committed, Request, Response, ResponseError, ResponseSink};
pub use session::{Session, SessionId, SessionStore};
