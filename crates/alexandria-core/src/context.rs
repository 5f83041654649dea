//! Request context types.
//!
//! The [`RequestContext`] is the per-request bag of named attributes that
//! hooks use to hand data to the rendering step. It is created when a
//! request enters the pipeline, owned exclusively by that request, and
//! discarded when the response completes.

use crate::session::Session;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Attribute names used by the core services.
///
/// These names are part of the rendering contract: fragment templates look
/// attributes up by name, so the constants live here rather than in the
/// services that set them.
pub mod attr {
    /// Metadata projection of the document being viewed.
    pub const DOCUMENT_META: &str = "document-metadata";

    /// User-facing message (borrow confirmation, domain failure, ...).
    pub const MESSAGE: &str = "message";

    /// Set when a hook has asked for a redirect; value is the target path.
    pub const REDIRECT: &str = "redirect-flag";

    /// Name of the request parameter that triggers the mutation action.
    pub const ACTION_TOKEN: &str = "action-token";

    /// Listing of the whole shelf, attached by the shelf page.
    pub const SHELF_LISTING: &str = "shelf-listing";
}

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it ideal for request tracking
/// and log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-request context flowing from hooks to the rendering step.
///
/// The context carries:
/// - a unique request ID for log correlation,
/// - the per-client [`Session`] handle,
/// - the named attribute bag read by fragment templates,
/// - request timing information.
///
/// Insertion order of attributes is irrelevant; there is no cross-request
/// persistence. Anything that must outlive the request belongs on the
/// session instead.
///
/// # Example
///
/// ```
/// use alexandria_core::{attr, RequestContext, Session};
/// use std::sync::Arc;
///
/// let mut ctx = RequestContext::new(Arc::new(Session::new()));
/// ctx.set_attr(attr::MESSAGE, "enjoy your loan".into());
/// assert_eq!(ctx.attr_str(attr::MESSAGE), Some("enjoy your loan"));
/// ```
#[derive(Debug)]
pub struct RequestContext {
    /// Unique identifier for this request.
    request_id: RequestId,

    /// The client's session, created lazily by the pipeline.
    session: Arc<Session>,

    /// Named attributes handed to the fragment renderers.
    attributes: HashMap<String, Value>,

    /// When the request started processing.
    started_at: Instant,
}

impl RequestContext {
    /// Creates a new request context with a fresh request ID.
    #[must_use]
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            request_id: RequestId::new(),
            session,
            attributes: HashMap::new(),
            started_at: Instant::now(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the client's session.
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Stores a named attribute, replacing any previous value.
    pub fn set_attr(&mut self, name: impl Into<String>, value: Value) {
        self.attributes.insert(name.into(), value);
    }

    /// Returns a named attribute, if set.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Returns a named attribute as a string slice, if set and a string.
    #[must_use]
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    /// Returns `true` if the attribute is set.
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> RequestContext {
        RequestContext::new(Arc::new(Session::new()))
    }

    #[test]
    fn test_request_id_new_generates_unique_ids() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();
        assert_ne!(id1, id2, "Each RequestId should be unique");
    }

    #[test]
    fn test_request_id_display() {
        let id = RequestId::new();
        let display = id.to_string();
        assert_eq!(display.len(), 36, "UUID string should be 36 characters");
        assert!(display.contains('-'), "UUID should contain hyphens");
    }

    #[test]
    fn test_request_id_serialization() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).expect("serialization should work");
        let parsed: RequestId = serde_json::from_str(&json).expect("deserialization should work");
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_new_context_is_empty() {
        let ctx = ctx();
        assert!(!ctx.has_attr(attr::MESSAGE));
        assert!(ctx.attr(attr::DOCUMENT_META).is_none());
    }

    #[test]
    fn test_set_and_get_attr() {
        let mut ctx = ctx();
        ctx.set_attr(attr::ACTION_TOKEN, json!("emprunter"));
        assert_eq!(ctx.attr_str(attr::ACTION_TOKEN), Some("emprunter"));
    }

    #[test]
    fn test_set_attr_replaces() {
        let mut ctx = ctx();
        ctx.set_attr(attr::MESSAGE, json!("first"));
        ctx.set_attr(attr::MESSAGE, json!("second"));
        assert_eq!(ctx.attr_str(attr::MESSAGE), Some("second"));
    }

    #[test]
    fn test_attr_str_on_non_string() {
        let mut ctx = ctx();
        ctx.set_attr(attr::DOCUMENT_META, json!({"id": 7}));
        assert!(ctx.attr_str(attr::DOCUMENT_META).is_none());
        assert_eq!(ctx.attr(attr::DOCUMENT_META).unwrap()["id"], 7);
    }

    #[test]
    fn test_elapsed() {
        let ctx = ctx();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(ctx.elapsed() >= std::time::Duration::from_millis(5));
    }
}
