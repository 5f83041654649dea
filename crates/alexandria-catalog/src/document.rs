//! Document entities and their metadata projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Numeric identifier of a document, as carried in the `id` query
/// parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(u64);

impl DocumentId {
    /// Creates a document ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for DocumentId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// What kind of media a document is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// A printed book.
    Book,
    /// A film.
    Film,
    /// A music album.
    Album,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Book => "book",
            Self::Film => "film",
            Self::Album => "album",
        };
        write!(f, "{label}")
    }
}

/// A live loan: who holds the document and since when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRecord {
    /// Stable identifier of the patron holding the document.
    pub holder: String,

    /// When the loan was recorded.
    pub since: DateTime<Utc>,
}

impl LoanRecord {
    /// Records a loan to `holder` starting now.
    #[must_use]
    pub fn to(holder: impl Into<String>) -> Self {
        Self {
            holder: holder.into(),
            since: Utc::now(),
        }
    }
}

/// A document held by the media center.
///
/// The pipeline never mutates a `Document` directly; loan transitions go
/// through the catalog store so they happen inside its critical section.
/// Values returned by lookups are snapshots and may go stale as soon as
/// the lock is released.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    id: DocumentId,
    title: String,
    creator: String,
    kind: DocumentKind,
    loan: Option<LoanRecord>,
}

impl Document {
    /// Creates an available (not on loan) document.
    #[must_use]
    pub fn new(
        id: impl Into<DocumentId>,
        title: impl Into<String>,
        creator: impl Into<String>,
        kind: DocumentKind,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            creator: creator.into(),
            kind,
            loan: None,
        }
    }

    /// Returns the document ID.
    #[must_use]
    pub const fn id(&self) -> DocumentId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the author, director or artist.
    #[must_use]
    pub fn creator(&self) -> &str {
        &self.creator
    }

    /// Returns the media kind.
    #[must_use]
    pub const fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Returns the live loan, if the document is out.
    #[must_use]
    pub fn loan(&self) -> Option<&LoanRecord> {
        self.loan.as_ref()
    }

    /// Returns `true` if the document is currently on loan.
    #[must_use]
    pub fn is_on_loan(&self) -> bool {
        self.loan.is_some()
    }

    /// Records a loan. Only the catalog store calls this, inside its
    /// critical section.
    pub(crate) fn record_loan(&mut self, loan: LoanRecord) {
        self.loan = Some(loan);
    }

    /// Returns the metadata projection attached to render contexts.
    #[must_use]
    pub fn meta(&self) -> DocumentMeta {
        DocumentMeta {
            id: self.id,
            title: self.title.clone(),
            creator: self.creator.clone(),
            kind: self.kind,
            on_loan: self.loan.is_some(),
        }
    }
}

/// The metadata projection of a document.
///
/// This is what fragment templates see; it deliberately omits the loan
/// holder so a patron cannot learn who has a document out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// Document ID.
    pub id: DocumentId,
    /// Title.
    pub title: String,
    /// Author, director or artist.
    pub creator: String,
    /// Media kind.
    pub kind: DocumentKind,
    /// Whether the document is currently out.
    pub on_loan: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_is_available() {
        let doc = Document::new(1, "Almagest", "Ptolemy", DocumentKind::Book);
        assert!(!doc.is_on_loan());
        assert!(doc.loan().is_none());
    }

    #[test]
    fn test_record_loan() {
        let mut doc = Document::new(1, "Almagest", "Ptolemy", DocumentKind::Book);
        doc.record_loan(LoanRecord::to("p-1"));
        assert!(doc.is_on_loan());
        assert_eq!(doc.loan().unwrap().holder, "p-1");
    }

    #[test]
    fn test_meta_projection_hides_holder() {
        let mut doc = Document::new(2, "Elements", "Euclid", DocumentKind::Book);
        doc.record_loan(LoanRecord::to("p-1"));

        let meta = doc.meta();
        assert_eq!(meta.id, DocumentId::new(2));
        assert!(meta.on_loan);

        let json = serde_json::to_value(&meta).expect("serialization should work");
        assert!(json.get("holder").is_none(), "holder must not leak");
    }

    #[test]
    fn test_document_id_display() {
        assert_eq!(DocumentId::new(42).to_string(), "42");
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(DocumentKind::Book.to_string(), "book");
        assert_eq!(DocumentKind::Film.to_string(), "film");
        assert_eq!(DocumentKind::Album.to_string(), "album");
    }
}
