//! Session domain model.

use serde::{Deserialize, Serialize};

/// A signed-in dashboard user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Free-form role label (e.g. "admin", "operator").
    #[serde(default)]
    pub role: String,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role: String::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }
}

/// The process-wide session. Exactly one lives inside each store.
///
/// `is_authenticated` is always `user.is_some()`. It is serialized for
/// readers of snapshots but recomputed from `user` on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SessionRecord")]
pub struct Session {
    user: Option<User>,
    is_authenticated: bool,
}

/// Wire shape accepted when reading a session; any stored flag is ignored.
#[derive(Deserialize)]
struct SessionRecord {
    #[serde(default)]
    user: Option<User>,
}

impl From<SessionRecord> for Session {
    fn from(record: SessionRecord) -> Self {
        let mut session = Session::new();
        session.set_user(record.user);
        session
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn set_user(&mut self, user: Option<User>) {
        self.is_authenticated = user.is_some();
        self.user = user;
    }

    pub fn clear(&mut self) {
        self.set_user(None);
    }
}
