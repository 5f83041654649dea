//! The catalog store contract and its default implementation.
//!
//! Locking contract of [`SharedCatalog`]: one mutex guards the whole
//! store, so every lookup and every borrow is mutually exclusive with
//! every other catalog operation system-wide. This is a single global
//! critical section, not one scoped per document: it gives up read
//! parallelism for a total order over loan-state transitions, so no two
//! borrows can interleave and record the same document as lent twice.
//!
//! Callers that resolve a document and then borrow it perform two
//! *separate* acquisitions; the snapshot observed at resolution may no
//! longer hold at borrow time. [`CatalogStore::borrow`] therefore re-reads
//! current state under its own acquisition and answers with a
//! [`BorrowError`] when the world has moved on.

use crate::document::{Document, DocumentId, DocumentMeta, LoanRecord};
use alexandria_core::UserIdentity;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use thiserror::Error;

/// Why a borrow was rejected.
///
/// Borrow failures are domain outcomes, not faults: they surface as a
/// message in the rendered page and the `Display` text is that message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BorrowError {
    /// Someone already holds the document.
    #[error("this document is already on loan")]
    AlreadyOnLoan,

    /// No patron is signed in to the requesting session.
    #[error("sign in to borrow documents")]
    MissingIdentity,

    /// The document disappeared between resolution and borrow.
    #[error("this document is no longer in the catalog")]
    Gone,
}

/// Lookup and borrow operations over the shared catalog.
///
/// Injected into services rather than reached as a global, so tests can
/// substitute an in-memory fake with different semantics.
pub trait CatalogStore: Send + Sync {
    /// Looks up a document by ID, returning a snapshot.
    fn lookup(&self, id: DocumentId) -> Option<Document>;

    /// Records a loan of `document` to `identity`.
    ///
    /// The `document` argument is the caller's (possibly stale) snapshot;
    /// implementations decide against *current* state.
    fn borrow(
        &self,
        document: &Document,
        identity: Option<&UserIdentity>,
    ) -> Result<(), BorrowError>;

    /// Returns the metadata projection of every document, for listings.
    fn shelf(&self) -> Vec<DocumentMeta>;
}

/// The default catalog: an in-memory store behind one global mutex.
///
/// # Example
///
/// ```
/// use alexandria_catalog::{CatalogStore, Document, DocumentId, DocumentKind, SharedCatalog};
/// use alexandria_core::UserIdentity;
///
/// let catalog = SharedCatalog::with_documents([
///     Document::new(1, "Almagest", "Ptolemy", DocumentKind::Book),
/// ]);
///
/// let doc = catalog.lookup(DocumentId::new(1)).unwrap();
/// let patron = UserIdentity::new("p-1");
/// catalog.borrow(&doc, Some(&patron)).unwrap();
/// assert!(catalog.lookup(DocumentId::new(1)).unwrap().is_on_loan());
/// ```
#[derive(Debug, Default)]
pub struct SharedCatalog {
    /// The single system-wide critical section.
    inner: Mutex<BTreeMap<DocumentId, Document>>,
}

impl SharedCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog seeded with `documents`.
    #[must_use]
    pub fn with_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        let catalog = Self::new();
        {
            let mut inner = catalog.inner.lock();
            for document in documents {
                inner.insert(document.id(), document);
            }
        }
        catalog
    }

    /// Adds or replaces a document.
    pub fn insert(&self, document: Document) {
        self.inner.lock().insert(document.id(), document);
    }

    /// Removes a document, returning it if present.
    pub fn remove(&self, id: DocumentId) -> Option<Document> {
        self.inner.lock().remove(&id)
    }

    /// Returns the number of documents held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if the catalog holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl CatalogStore for SharedCatalog {
    fn lookup(&self, id: DocumentId) -> Option<Document> {
        self.inner.lock().get(&id).cloned()
    }

    fn borrow(
        &self,
        document: &Document,
        identity: Option<&UserIdentity>,
    ) -> Result<(), BorrowError> {
        let identity = identity.ok_or(BorrowError::MissingIdentity)?;

        let mut inner = self.inner.lock();
        let current = inner.get_mut(&document.id()).ok_or(BorrowError::Gone)?;
        if current.is_on_loan() {
            return Err(BorrowError::AlreadyOnLoan);
        }

        current.record_loan(LoanRecord::to(identity.user_id.clone()));
        tracing::debug!(
            document = %document.id(),
            patron = %identity.log_id(),
            "loan recorded"
        );
        Ok(())
    }

    fn shelf(&self) -> Vec<DocumentMeta> {
        self.inner.lock().values().map(Document::meta).collect()
    }
}
