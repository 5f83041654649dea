//! Per-client sessions.
//!
//! A [`Session`] is the process-wide, per-client key-value store from the
//! reference design, reduced to what the core needs: at most one attached
//! [`UserIdentity`]. Sessions outlive individual requests; invalidation is
//! out of scope.
//!
//! The [`SessionStore`] owns every live session and creates them lazily and
//! non-destructively: asking for an existing session never replaces it.

use crate::identity::UserIdentity;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// A unique identifier for a client session, using UUID v7.
///
/// Carried in the session cookie; parse failures fall back to a fresh
/// session rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new unique session ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A single client's session.
///
/// Shared between all concurrent requests from the same client; the
/// identity slot is the only mutable state and is guarded accordingly.
#[derive(Debug)]
pub struct Session {
    /// Identifier carried in the session cookie.
    id: SessionId,

    /// The patron attached to this session, if any.
    identity: RwLock<Option<UserIdentity>>,
}

impl Session {
    /// Creates a session with a fresh ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(SessionId::new())
    }

    /// Creates a session with a specific ID.
    ///
    /// Used when a client presents a cookie for a session this process no
    /// longer knows, so the cookie value stays stable.
    #[must_use]
    pub fn with_id(id: SessionId) -> Self {
        Self {
            id,
            identity: RwLock::new(None),
        }
    }

    /// Returns the session ID.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Returns a clone of the attached identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<UserIdentity> {
        self.identity.read().clone()
    }

    /// Attaches a patron identity, replacing any previous one.
    pub fn attach_identity(&self, identity: UserIdentity) {
        *self.identity.write() = Some(identity);
    }

    /// Detaches the patron identity, if any.
    pub fn detach_identity(&self) {
        *self.identity.write() = None;
    }

    /// Returns `true` if a patron is attached.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.identity.read().is_some()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide registry of live sessions.
///
/// # Example
///
/// ```
/// use alexandria_core::SessionStore;
///
/// let store = SessionStore::new();
/// let session = store.get_or_create(None);
/// let again = store.get_or_create(Some(session.id()));
/// assert_eq!(session.id(), again.id());
/// ```
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<SessionId, Arc<Session>>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Returns the session for `id`, creating one if absent.
    ///
    /// Creation is lazy and non-destructive: an existing session is never
    /// replaced. When `id` is `None` (no cookie) a fresh session is
    /// created; when `id` names an unknown session (stale cookie or
    /// restart), a new session is created under that same id.
    #[must_use]
    pub fn get_or_create(&self, id: Option<SessionId>) -> Arc<Session> {
        let id = id.unwrap_or_default();
        Arc::clone(
            &self
                .sessions
                .entry(id)
                .or_insert_with(|| Arc::new(Session::with_id(id))),
        )
    }

    /// Returns the session for `id` without creating one.
    #[must_use]
    pub fn get(&self, id: SessionId) -> Option<Arc<Session>> {
        self.sessions.get(&id).map(|entry| Arc::clone(&entry))
    }

    /// Returns the number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if no sessions are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_starts_anonymous() {
        let session = Session::new();
        assert!(!session.is_signed_in());
        assert!(session.identity().is_none());
    }

    #[test]
    fn test_attach_and_detach_identity() {
        let session = Session::new();
        session.attach_identity(UserIdentity::new("p-1"));
        assert!(session.is_signed_in());
        assert_eq!(session.identity().unwrap().user_id, "p-1");

        session.detach_identity();
        assert!(!session.is_signed_in());
    }

    #[test]
    fn test_attach_replaces_identity() {
        let session = Session::new();
        session.attach_identity(UserIdentity::new("p-1"));
        session.attach_identity(UserIdentity::new("p-2"));
        assert_eq!(session.identity().unwrap().user_id, "p-2");
    }

    #[test]
    fn test_get_or_create_without_cookie() {
        let store = SessionStore::new();
        let session = store.get_or_create(None);
        assert_eq!(store.len(), 1);
        assert!(store.get(session.id()).is_some());
    }

    #[test]
    fn test_get_or_create_is_non_destructive() {
        let store = SessionStore::new();
        let session = store.get_or_create(None);
        session.attach_identity(UserIdentity::new("p-1"));

        // A later request with the same cookie sees the same session.
        let again = store.get_or_create(Some(session.id()));
        assert!(Arc::ptr_eq(&session, &again));
        assert!(again.is_signed_in());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_or_create_with_stale_cookie() {
        let store = SessionStore::new();
        let stale = SessionId::new();
        let session = store.get_or_create(Some(stale));
        assert_eq!(session.id(), stale, "cookie value should stay stable");
        assert!(!session.is_signed_in());
    }

    #[test]
    fn test_session_id_round_trips_through_string() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().expect("parse should work");
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_session_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<SessionId>().is_err());
    }
}
