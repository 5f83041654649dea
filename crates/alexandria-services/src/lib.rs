//! # Alexandria Services
//!
//! The concrete page services of the media center, built on the
//! [`alexandria_pipeline`] hook contract:
//!
//! - [`DocumentService`] renders a single document's page and handles the
//!   borrow action for it;
//! - [`ShelfService`] renders the catalog listing at the application root.

#![doc(html_root_url = "https://docs.rs/alexandria-services/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod document;
mod shelf;

pub use document::{DocumentService, ACTION_BORROW, PARAM_ID};
pub use shelf::ShelfService;
