//! Store traits (§3, §4.9, §4.10): the persistence seams this crate
//! contracts against. The SQL schema itself (§6) is out of scope — only
//! these trait boundaries and an in-memory reference implementation
//! (`memory`) are implemented; a production deployment supplies its own
//! `sqlx`-backed implementations behind the same traits.

pub mod memory;

use {
    crate::{
        model::{
            Account, AccountStatus, Attachment, AttachmentTargetType, Group, GroupMembership, Permission, PolicyRecord,
            Role, Session, User, UserRoleAssignment,
        },
        policy::PolicyDocument,
        IamError,
    },
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    uuid::Uuid,
};

pub type StoreResult<T> = Result<T, IamError>;

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create_account(&self, name: &str, email: &str) -> StoreResult<Account>;
    async fn get_account(&self, id: Uuid) -> StoreResult<Account>;
    async fn get_account_by_email(&self, email: &str) -> StoreResult<Account>;
    async fn set_account_status(&self, id: Uuid, status: AccountStatus) -> StoreResult<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    async fn create_user(
        &self,
        account_id: Uuid,
        username: &str,
        password_hash: &str,
        is_root: bool,
        email: Option<&str>,
    ) -> StoreResult<User>;
    async fn get_user(&self, id: Uuid) -> StoreResult<User>;
    async fn get_user_by_username(&self, account_id: Uuid, username: &str) -> StoreResult<User>;
    async fn get_root_user(&self, account_id: Uuid) -> StoreResult<User>;
    async fn delete_user(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn create_group(&self, account_id: Uuid, name: &str, path: &str) -> StoreResult<Group>;
    async fn get_group(&self, id: Uuid) -> StoreResult<Group>;
    async fn add_user_to_group(&self, group_id: Uuid, user_id: Uuid) -> StoreResult<GroupMembership>;
    async fn remove_user_from_group(&self, group_id: Uuid, user_id: Uuid) -> StoreResult<()>;
    async fn groups_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Group>>;
    async fn members_of_group(&self, group_id: Uuid) -> StoreResult<Vec<Uuid>>;
    async fn delete_group(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn create_role(
        &self,
        account_id: Option<Uuid>,
        name: &str,
        path: &str,
        trust_document: &str,
        max_session_duration: u32,
    ) -> StoreResult<Role>;
    async fn get_role(&self, id: Uuid) -> StoreResult<Role>;
    async fn get_role_by_name(&self, account_id: Option<Uuid>, name: &str) -> StoreResult<Role>;
    async fn assign_role_to_user(&self, user_id: Uuid, role_id: Uuid, assigned_by: Uuid) -> StoreResult<UserRoleAssignment>;
    async fn roles_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Role>>;
}

#[async_trait]
pub trait PolicyStore: Send + Sync {
    async fn create_policy(
        &self,
        account_id: Option<Uuid>,
        name: &str,
        path: &str,
        document: PolicyDocument,
        policy_type: crate::model::PolicyType,
    ) -> StoreResult<PolicyRecord>;
    async fn get_policy(&self, id: Uuid) -> StoreResult<PolicyRecord>;
    async fn attach_policy(&self, policy_id: Uuid, target_type: AttachmentTargetType, target_id: Uuid) -> StoreResult<Attachment>;
    async fn detach_policy(&self, policy_id: Uuid, target_type: AttachmentTargetType, target_id: Uuid) -> StoreResult<()>;
    async fn attachment_count(&self, policy_id: Uuid) -> StoreResult<usize>;
    async fn policies_for_target(&self, target_type: AttachmentTargetType, target_id: Uuid) -> StoreResult<Vec<PolicyRecord>>;
    async fn delete_policy(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    async fn create_session(
        &self,
        role_id: Uuid,
        assumed_by: &str,
        session_name: &str,
        token_hash: &str,
        assumed_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        source_ip: Option<&str>,
        user_agent: Option<&str>,
        external_id: Option<&str>,
    ) -> StoreResult<Session>;
    async fn get_session(&self, id: Uuid) -> StoreResult<Session>;
    async fn get_session_by_token_hash(&self, token_hash: &str) -> StoreResult<Session>;
    async fn extend_session(&self, id: Uuid, new_expires_at: DateTime<Utc>) -> StoreResult<Session>;
    async fn deactivate_session(&self, id: Uuid) -> StoreResult<()>;
}

/// Granular `Permission` rows (§3) attached to policies via the
/// `policy_permissions` join table (§6) — the optional alternate source of
/// statements the Policy Resolver (C4) synthesizes into single-statement
/// documents, per §4.7.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    async fn create_permission(
        &self,
        account_id: Option<Uuid>,
        service: &str,
        action: &str,
        resource_pattern: &str,
        effect: crate::effect::Effect,
        conditions: Option<crate::condition::Condition>,
        is_system: bool,
    ) -> StoreResult<Permission>;
    async fn get_permission(&self, id: Uuid) -> StoreResult<Permission>;
    async fn attach_permission(&self, policy_id: Uuid, permission_id: Uuid) -> StoreResult<()>;
    async fn permissions_for_policy(&self, policy_id: Uuid) -> StoreResult<Vec<Permission>>;
}

/// The hybrid Revocation Store (C9 — §4.10).
#[async_trait]
pub trait RevocationStore: Send + Sync {
    async fn revoke(
        &self,
        token_hash: &str,
        token_type: crate::model::TokenType,
        user_id: Uuid,
        account_id: Uuid,
        expires_at: DateTime<Utc>,
        reason: &str,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> StoreResult<()>;

    /// Fails closed: any error here must be treated as "revoked" by the
    /// caller, never as "not revoked".
    async fn is_revoked(&self, token_hash: &str, user_id: Uuid, issued_at: DateTime<Utc>) -> StoreResult<bool>;

    async fn revoke_all_for_user(&self, user_id: Uuid, account_id: Uuid, reason: &str) -> StoreResult<()>;

    async fn cleanup(&self) -> StoreResult<usize>;
}

/// Password hashing seam; kept separate from `UserStore` so a real
/// deployment can swap in `argon2`/`bcrypt` without touching persistence.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> StoreResult<String>;
    fn verify(&self, password: &str, hash: &str) -> bool;
}
