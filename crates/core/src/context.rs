//! Request identity.

use serde::{Deserialize, Serialize};

/// The acting user, as established by a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    /// Id of the user the token was issued to.
    pub user_id: String,
    /// E-mail address at issuance time.
    pub email: String,
}

impl Actor {
    /// Create an actor for `user_id`.
    #[must_use]
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
        }
    }

    /// Whether this actor is the user `id`.
    #[must_use]
    pub fn is(&self, id: &str) -> bool {
        self.user_id == id
    }
}
