use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use super::profile::Role;

/// Append-only record of one attempt to redeem an invite code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteRedemption {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub code: String,
    pub account_id: Option<ObjectId>,
    pub email: String,
    pub role: Role,
    pub success: bool,
    pub created_at: DateTime,
}

impl InviteRedemption {
    pub const COLLECTION: &'static str = "invite_redemptions";

    pub fn new(
        code: &str,
        account_id: Option<ObjectId>,
        email: &str,
        role: Role,
        success: bool,
    ) -> Self {
        Self {
            id: None,
            code: code.to_string(),
            account_id,
            email: email.to_string(),
            role,
            success,
            created_at: DateTime::now(),
        }
    }
}
