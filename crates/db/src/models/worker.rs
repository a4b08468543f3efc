use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// A tracked team member. May exist without a login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Worker {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub contact_info: Option<String>,
    pub email: Option<String>,
    pub specialty: String,
    #[serde(default = "bool_true")]
    pub active: bool,
    /// Set when the worker is bound to a `worker`-role account.
    pub account_id: Option<ObjectId>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

fn bool_true() -> bool {
    true
}

impl Worker {
    pub const COLLECTION: &'static str = "workers";

    pub fn new(name: String, specialty: String) -> Self {
        let now = DateTime::now();
        Self {
            id: None,
            name,
            contact_info: None,
            email: None,
            specialty,
            active: true,
            account_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}
