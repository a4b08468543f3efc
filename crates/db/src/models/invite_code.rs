use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use super::profile::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteCode {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub code: String,
    pub target_role: Role,
    /// Never increases once issued.
    #[serde(default)]
    pub remaining_uses: u32,
    #[serde(default)]
    pub active: bool,
    pub created_by: Option<ObjectId>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl InviteCode {
    pub const COLLECTION: &'static str = "invite_codes";

    pub fn new(code: String, target_role: Role, uses: u32, created_by: Option<ObjectId>) -> Self {
        let now = DateTime::now();
        Self {
            id: None,
            code,
            target_role,
            remaining_uses: uses,
            active: uses > 0,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_redeemable_for(&self, role: Role) -> bool {
        self.active && self.remaining_uses > 0 && self.target_role == role
    }

    /// Consumes one use in place. Callers must hold exclusive access to the record.
    pub fn consume(&mut self, role: Role) -> bool {
        if !self.is_redeemable_for(role) {
            return false;
        }
        self.remaining_uses -= 1;
        if self.remaining_uses == 0 {
            self.active = false;
        }
        self.updated_at = DateTime::now();
        true
    }
}
