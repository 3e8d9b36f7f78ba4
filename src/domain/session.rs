//! Session model: bearer token plus the identity derived from it.
//!
//! The session is created empty at start-up, receives a token on login, an
//! identity once the profile endpoint answers, and is emptied on logout. The
//! only mutators are the methods below, which keep the invariant that an
//! identity never exists without a token.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Role held by a user, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Administrators may manage teachers and moderate posts.
    Admin,
    /// Regular community member.
    User,
    /// Any role name this client does not know about.
    Other(String),
}

impl Role {
    /// Wire name of the role.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "Admin",
            Self::User => "User",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Admin" => Self::Admin,
            "User" => Self::User,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who the current token belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub erp: Option<i64>,
    pub roles: BTreeSet<Role>,
}

impl Identity {
    /// Whether the identity holds `role`.
    #[must_use]
    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }

    /// Whether the identity holds at least one of `required`.
    ///
    /// An empty requirement is satisfied by everyone.
    #[must_use]
    pub fn has_any_role(&self, required: &[Role]) -> bool {
        required.is_empty() || required.iter().any(|role| self.roles.contains(role))
    }
}

/// Client-held authentication state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    identity: Option<Identity>,
    epoch: u64,
}

impl Session {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a session from a durably stored token and optional cached user.
    #[must_use]
    pub fn restored(token: String, identity: Option<Identity>) -> Self {
        let mut session = Self::new();
        session.sign_in(token, identity);
        session
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Generation counter, bumped on every sign-in and clear.
    ///
    /// Requests are tagged with the epoch they were issued under so that a
    /// reply arriving after logout cannot repopulate state.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Installs a fresh token and, if known, the identity that came with it.
    pub fn sign_in(&mut self, token: String, identity: Option<Identity>) {
        self.token = Some(token);
        self.identity = identity;
        self.epoch += 1;
    }

    /// Replaces the identity. Ignored when no token is held.
    ///
    /// Returns whether the identity was stored.
    pub fn set_identity(&mut self, identity: Identity) -> bool {
        if self.token.is_none() {
            return false;
        }
        self.identity = Some(identity);
        true
    }

    /// Drops token and identity. Calling it on an empty session changes nothing.
    pub fn clear(&mut self) {
        if self.token.is_none() && self.identity.is_none() {
            return;
        }
        self.token = None;
        self.identity = None;
        self.epoch += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(roles: &[&str]) -> Identity {
        Identity {
            id: "u1".into(),
            display_name: "Ada Lovelace".into(),
            email: "ada@example.edu".into(),
            erp: Some(12345),
            roles: roles.iter().map(|r| Role::from(*r)).collect(),
        }
    }

    #[test]
    fn identity_requires_token() {
        let mut session = Session::new();
        assert!(!session.set_identity(identity(&["User"])));
        assert!(session.identity().is_none());

        session.sign_in("tok".into(), None);
        assert!(session.set_identity(identity(&["User"])));
        assert!(session.identity().is_some());
    }

    #[test]
    fn clear_is_idempotent() {
        let mut session = Session::restored("tok".into(), Some(identity(&["Admin"])));
        session.clear();
        let after_first = session.clone();
        session.clear();
        assert_eq!(session, after_first);
        assert!(session.token().is_none());
        assert!(session.identity().is_none());
    }

    #[test]
    fn epoch_moves_on_sign_in_and_clear() {
        let mut session = Session::new();
        assert_eq!(session.epoch(), 0);
        session.sign_in("a".into(), None);
        assert_eq!(session.epoch(), 1);
        session.clear();
        assert_eq!(session.epoch(), 2);
    }

    #[test]
    fn roles_round_trip_through_wire_names() {
        let roles: Vec<Role> = serde_json::from_str(r#"["Admin","User","Moderator"]"#).unwrap();
        assert_eq!(
            roles,
            vec![Role::Admin, Role::User, Role::Other("Moderator".into())]
        );
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""Admin""#);
    }

    #[test]
    fn empty_requirement_is_always_met() {
        assert!(identity(&[]).has_any_role(&[]));
        assert!(!identity(&["User"]).has_any_role(&[Role::Admin]));
    }
}
