//! Patron identity.
//!
//! Alexandria does not define how a patron signs in; some upstream
//! authentication step attaches a [`UserIdentity`] to the session. The
//! request pipeline only borrows it for the duration of a mutation call.

use serde::{Deserialize, Serialize};

/// The authenticated patron attached to a session.
///
/// # Example
///
/// ```
/// use alexandria_core::UserIdentity;
///
/// let identity = UserIdentity::named("p-417", "Hypatia");
/// assert_eq!(identity.log_id(), "user:p-417");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Stable identifier for the patron.
    pub user_id: String,

    /// Display name shown in rendered pages.
    pub name: Option<String>,

    /// Contact address, if known.
    pub email: Option<String>,
}

impl UserIdentity {
    /// Creates an identity with just a user id.
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: None,
            email: None,
        }
    }

    /// Creates an identity with a display name.
    #[must_use]
    pub fn named(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: Some(name.into()),
            email: None,
        }
    }

    /// Returns a string identifier suitable for logging.
    ///
    /// This never contains credentials. The format is `user:<user_id>`.
    #[must_use]
    pub fn log_id(&self) -> String {
        format!("user:{}", self.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_has_no_name() {
        let identity = UserIdentity::new("p-1");
        assert_eq!(identity.user_id, "p-1");
        assert!(identity.name.is_none());
        assert!(identity.email.is_none());
    }

    #[test]
    fn test_named() {
        let identity = UserIdentity::named("p-2", "Callimachus");
        assert_eq!(identity.name.as_deref(), Some("Callimachus"));
    }

    #[test]
    fn test_log_id() {
        let identity = UserIdentity::new("p-3");
        assert_eq!(identity.log_id(), "user:p-3");
    }

    #[test]
    fn test_serialization_round_trip() {
        let identity = UserIdentity::named("p-4", "Zenodotus");
        let json = serde_json::to_string(&identity).expect("serialization should work");
        let parsed: UserIdentity = serde_json::from_str(&json).expect("deserialization should work");
        assert_eq!(identity, parsed);
    }
}
