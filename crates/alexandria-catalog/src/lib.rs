//! # Alexandria Catalog
//!
//! The shared store of documents and their loan status.
//!
//! The catalog is modeled as an injected capability ([`CatalogStore`])
//! rather than a process-wide singleton, so tests can substitute their own
//! implementation. The default [`SharedCatalog`] keeps the reference
//! semantics as an explicit contract: one global critical section
//! serializing **every** lookup and **every** borrow system-wide.

#![doc(html_root_url = "https://docs.rs/alexandria-catalog/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod document;
mod store;

pub use document::{Document, DocumentId, DocumentKind, DocumentMeta, LoanRecord};
pub use store::{BorrowError, CatalogStore, SharedCatalog};
