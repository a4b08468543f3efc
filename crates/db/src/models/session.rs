use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// A signed-out session. Access and refresh tokens carrying this sid are
/// refused until `forget_after`, when the TTL index removes the row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevokedSession {
    #[serde(rename = "_id")]
    pub session_id: String,
    pub account_id: ObjectId,
    pub forget_after: DateTime,
    pub created_at: DateTime,
}

impl RevokedSession {
    pub const COLLECTION: &'static str = "revoked_sessions";

    pub fn new(session_id: impl Into<String>, account_id: ObjectId, forget_after: DateTime) -> Self {
        Self {
            session_id: session_id.into(),
            account_id,
            forget_after,
            created_at: DateTime::now(),
        }
    }

    pub fn is_live(&self, now: DateTime) -> bool {
        self.forget_after > now
    }
}
