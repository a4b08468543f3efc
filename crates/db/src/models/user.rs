use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use super::profile::Role;

/// Account record held by the built-in credential provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub metadata: AccountMetadata,
    pub last_sign_in_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Signup metadata stored alongside the account. The role here is what was
/// requested at signup; the authoritative assignment lives in the role profile.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AccountMetadata {
    pub display_name: String,
    pub requested_role: Option<Role>,
}

/// Identity as seen by the rest of the system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: ObjectId,
    pub email: String,
    pub display_name: String,
}

impl User {
    pub const COLLECTION: &'static str = "users";

    pub fn account(&self) -> Option<Account> {
        self.id.map(|id| Account {
            id,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        })
    }
}
