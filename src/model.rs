//! Domain entities (§3): the relational shape the Store traits persist.
//! The SQL schema itself is out of scope — these are the Rust-side
//! records a `Store` implementation reads and writes, with `uuid`/`chrono`
//! filling in for the opaque ids and timestamps every entity carries.

use {
    crate::policy::PolicyDocument,
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    uuid::Uuid,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum AccountStatus {
    Active,
    Suspended,
    Deleted,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum UserStatus {
    Active,
    Suspended,
    Deleted,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct User {
    pub id: Uuid,
    pub account_id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub is_root: bool,
    pub status: UserStatus,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Group {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    /// §3: `path` begins with `/` and ends with `/` unless it is exactly `/`.
    pub fn path_is_valid(path: &str) -> bool {
        path.starts_with('/') && (path == "/" || path.ends_with('/'))
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Role {
    pub id: Uuid,
    /// `None` for system roles (e.g. `root`), shared process-wide.
    pub account_id: Option<Uuid>,
    pub name: String,
    pub path: String,
    pub trust_document: String,
    pub max_session_duration: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub const MIN_SESSION_DURATION: u32 = 900;
    pub const MAX_SESSION_DURATION: u32 = 43200;
    pub const DEFAULT_SESSION_DURATION: u32 = 3600;
    pub const ROOT_ROLE_NAME: &'static str = "root";

    #[inline]
    pub fn is_system(&self) -> bool {
        self.account_id.is_none()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.is_system() && self.name == Self::ROOT_ROLE_NAME
    }

    pub fn duration_is_valid(seconds: u32) -> bool {
        (Self::MIN_SESSION_DURATION..=Self::MAX_SESSION_DURATION).contains(&seconds)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum PolicyType {
    Aws,
    Custom,
    Inline,
    System,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct PolicyRecord {
    pub id: Uuid,
    pub account_id: Option<Uuid>,
    pub name: String,
    pub path: String,
    pub document: PolicyDocument,
    pub policy_type: PolicyType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PolicyRecord {
    #[inline]
    pub fn is_system(&self) -> bool {
        matches!(self.policy_type, PolicyType::System)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Permission {
    pub id: Uuid,
    pub account_id: Option<Uuid>,
    pub service: String,
    pub action: String,
    pub resource_pattern: String,
    pub effect: crate::effect::Effect,
    pub conditions: Option<crate::condition::Condition>,
    pub is_system: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum AttachmentTargetType {
    User,
    Group,
    Role,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Attachment {
    pub policy_id: Uuid,
    pub target_type: AttachmentTargetType,
    pub target_id: Uuid,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct GroupMembership {
    pub group_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct UserRoleAssignment {
    pub user_id: Uuid,
    pub role_id: Uuid,
    pub assigned_by: Uuid,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub role_id: Uuid,
    /// The user id or external principal identifier that assumed the role.
    pub assumed_by: String,
    pub session_name: String,
    pub token_hash: String,
    pub assumed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    pub source_ip: Option<String>,
    pub user_agent: Option<String>,
    pub external_id: Option<String>,
}

impl Session {
    /// §4.9: `expiresAt > assumedAt` and `expiresAt - assumedAt <=
    /// role.maxSessionDuration`.
    pub fn bounds_are_valid(&self, max_session_duration: u32) -> bool {
        self.expires_at > self.assumed_at
            && (self.expires_at - self.assumed_at).num_seconds() <= max_session_duration as i64
    }

    #[inline]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum TokenType {
    Access,
    Refresh,
    Global,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct RevokedToken {
    pub token_hash: String,
    pub token_type: TokenType,
    pub user_id: Uuid,
    pub account_id: Uuid,
    pub revoked_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub reason: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RevokedToken {
    /// §4.10: `revokeAllForUser` inserts this synthetic row in place of one
    /// per concrete token.
    pub fn synthetic_all_tokens_hash(user_id: Uuid) -> String {
        format!("ALL_TOKENS_{}", user_id)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    #[test_log::test]
    fn test_group_path_validation() {
        assert!(Group::path_is_valid("/"));
        assert!(Group::path_is_valid("/engineering/"));
        assert!(!Group::path_is_valid("/engineering"));
        assert!(!Group::path_is_valid("engineering/"));
    }

    #[test_log::test]
    fn test_role_duration_bounds() {
        assert!(Role::duration_is_valid(900));
        assert!(Role::duration_is_valid(43200));
        assert!(Role::duration_is_valid(3600));
        assert!(!Role::duration_is_valid(899));
        assert!(!Role::duration_is_valid(43201));
    }

    #[test_log::test]
    fn test_synthetic_all_tokens_hash() {
        let id = Uuid::nil();
        assert_eq!(RevokedToken::synthetic_all_tokens_hash(id), format!("ALL_TOKENS_{}", id));
    }
}
