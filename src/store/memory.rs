//! In-memory reference implementation of the Store traits, guarded by
//! `tokio::sync::RwLock` per collection the way a connection-pooled backend
//! would guard its tables — one lock acquisition per operation, released on
//! completion (§5's "acquired per operation; released on completion").

use {
    super::{
        AccountStore, GroupStore, PasswordHasher, PermissionStore, PolicyStore, RevocationStore, RoleStore, SessionStore,
        StoreResult, UserStore,
    },
    crate::{
        condition::Condition,
        effect::Effect,
        model::{
            Account, AccountStatus, Attachment, AttachmentTargetType, Group, GroupMembership, Permission, PolicyRecord,
            PolicyType, RevokedToken, Role, Session, TokenType, User, UserRoleAssignment, UserStatus,
        },
        policy::PolicyDocument,
        IamError,
    },
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    sha2::{Digest, Sha256},
    std::{collections::HashMap, time::Duration},
    tokio::sync::RwLock,
    uuid::Uuid,
};

#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create_account(&self, name: &str, email: &str) -> StoreResult<Account> {
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.email == email) {
            return Err(IamError::conflict(format!("email already in use: {}", email)));
        }

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        };
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn get_account(&self, id: Uuid) -> StoreResult<Account> {
        self.accounts.read().await.get(&id).cloned().ok_or_else(|| IamError::not_found(format!("account {}", id)))
    }

    async fn get_account_by_email(&self, email: &str) -> StoreResult<Account> {
        self.accounts
            .read()
            .await
            .values()
            .find(|a| a.email == email)
            .cloned()
            .ok_or_else(|| IamError::not_found(format!("account with email {}", email)))
    }

    async fn set_account_status(&self, id: Uuid, status: AccountStatus) -> StoreResult<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(&id).ok_or_else(|| IamError::not_found(format!("account {}", id)))?;
        account.status = status;
        account.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(
        &self,
        account_id: Uuid,
        username: &str,
        password_hash: &str,
        is_root: bool,
        email: Option<&str>,
    ) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.account_id == account_id && u.username == username) {
            return Err(IamError::conflict(format!("username already in use: {}", username)));
        }
        if is_root && users.values().any(|u| u.account_id == account_id && u.is_root) {
            return Err(IamError::conflict("account already has a root user"));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            account_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            is_root,
            status: UserStatus::Active,
            email: email.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<User> {
        self.users.read().await.get(&id).cloned().ok_or_else(|| IamError::not_found(format!("user {}", id)))
    }

    async fn get_user_by_username(&self, account_id: Uuid, username: &str) -> StoreResult<User> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.account_id == account_id && u.username == username)
            .cloned()
            .ok_or_else(|| IamError::not_found(format!("user {}", username)))
    }

    async fn get_root_user(&self, account_id: Uuid) -> StoreResult<User> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.account_id == account_id && u.is_root)
            .cloned()
            .ok_or_else(|| IamError::not_found(format!("root user for account {}", account_id)))
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        let mut users = self.users.write().await;
        let user = users.get(&id).ok_or_else(|| IamError::not_found(format!("user {}", id)))?;
        if user.is_root {
            return Err(IamError::validation("the root user cannot be deleted"));
        }
        users.remove(&id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryGroupStore {
    groups: RwLock<HashMap<Uuid, Group>>,
    memberships: RwLock<Vec<GroupMembership>>,
}

#[async_trait]
impl GroupStore for MemoryGroupStore {
    async fn create_group(&self, account_id: Uuid, name: &str, path: &str) -> StoreResult<Group> {
        if !Group::path_is_valid(path) {
            return Err(IamError::validation(format!("invalid group path: {}", path)));
        }

        let mut groups = self.groups.write().await;
        if groups.values().any(|g| g.account_id == account_id && g.name == name) {
            return Err(IamError::conflict(format!("group name already in use: {}", name)));
        }

        let now = Utc::now();
        let group =
            Group { id: Uuid::new_v4(), account_id, name: name.to_string(), path: path.to_string(), created_at: now, updated_at: now };
        groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn get_group(&self, id: Uuid) -> StoreResult<Group> {
        self.groups.read().await.get(&id).cloned().ok_or_else(|| IamError::not_found(format!("group {}", id)))
    }

    async fn add_user_to_group(&self, group_id: Uuid, user_id: Uuid) -> StoreResult<GroupMembership> {
        let mut memberships = self.memberships.write().await;
        if memberships.iter().any(|m| m.group_id == group_id && m.user_id == user_id) {
            return Err(IamError::conflict("user is already a member of this group"));
        }
        let membership = GroupMembership { group_id, user_id };
        memberships.push(membership.clone());
        Ok(membership)
    }

    async fn remove_user_from_group(&self, group_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        let mut memberships = self.memberships.write().await;
        memberships.retain(|m| !(m.group_id == group_id && m.user_id == user_id));
        Ok(())
    }

    async fn groups_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Group>> {
        let memberships = self.memberships.read().await;
        let groups = self.groups.read().await;
        Ok(memberships
            .iter()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| groups.get(&m.group_id).cloned())
            .collect())
    }

    async fn members_of_group(&self, group_id: Uuid) -> StoreResult<Vec<Uuid>> {
        Ok(self.memberships.read().await.iter().filter(|m| m.group_id == group_id).map(|m| m.user_id).collect())
    }

    async fn delete_group(&self, id: Uuid) -> StoreResult<()> {
        let members = self.members_of_group(id).await?;
        if !members.is_empty() {
            return Err(IamError::ResourceInUse { resource: format!("group {}", id), attachment_count: members.len() });
        }
        self.groups.write().await.remove(&id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryRoleStore {
    roles: RwLock<HashMap<Uuid, Role>>,
    assignments: RwLock<Vec<UserRoleAssignment>>,
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn create_role(
        &self,
        account_id: Option<Uuid>,
        name: &str,
        path: &str,
        trust_document: &str,
        max_session_duration: u32,
    ) -> StoreResult<Role> {
        if !Role::duration_is_valid(max_session_duration) {
            return Err(IamError::validation(format!("max session duration out of range: {}", max_session_duration)));
        }
        crate::trust::TrustPolicy::from_str(trust_document).map_err(|e| IamError::validation(e.to_string()))?;

        let mut roles = self.roles.write().await;
        if roles.values().any(|r| r.account_id == account_id && r.name == name) {
            return Err(IamError::conflict(format!("role name already in use: {}", name)));
        }

        let now = Utc::now();
        let role = Role {
            id: Uuid::new_v4(),
            account_id,
            name: name.to_string(),
            path: path.to_string(),
            trust_document: trust_document.to_string(),
            max_session_duration,
            created_at: now,
            updated_at: now,
        };
        roles.insert(role.id, role.clone());
        Ok(role)
    }

    async fn get_role(&self, id: Uuid) -> StoreResult<Role> {
        self.roles.read().await.get(&id).cloned().ok_or_else(|| IamError::not_found(format!("role {}", id)))
    }

    async fn get_role_by_name(&self, account_id: Option<Uuid>, name: &str) -> StoreResult<Role> {
        self.roles
            .read()
            .await
            .values()
            .find(|r| r.account_id == account_id && r.name == name)
            .cloned()
            .ok_or_else(|| IamError::not_found(format!("role {}", name)))
    }

    async fn assign_role_to_user(&self, user_id: Uuid, role_id: Uuid, assigned_by: Uuid) -> StoreResult<UserRoleAssignment> {
        let mut assignments = self.assignments.write().await;
        if assignments.iter().any(|a| a.user_id == user_id && a.role_id == role_id) {
            return Err(IamError::conflict("user already holds this role"));
        }
        let assignment = UserRoleAssignment { user_id, role_id, assigned_by, assigned_at: Utc::now() };
        assignments.push(assignment.clone());
        Ok(assignment)
    }

    async fn roles_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Role>> {
        let assignments = self.assignments.read().await;
        let roles = self.roles.read().await;
        Ok(assignments
            .iter()
            .filter(|a| a.user_id == user_id)
            .filter_map(|a| roles.get(&a.role_id).cloned())
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryPolicyStore {
    policies: RwLock<HashMap<Uuid, PolicyRecord>>,
    attachments: RwLock<Vec<Attachment>>,
}

#[async_trait]
impl PolicyStore for MemoryPolicyStore {
    async fn create_policy(
        &self,
        account_id: Option<Uuid>,
        name: &str,
        path: &str,
        document: PolicyDocument,
        policy_type: PolicyType,
    ) -> StoreResult<PolicyRecord> {
        let mut policies = self.policies.write().await;
        if policies.values().any(|p| p.account_id == account_id && p.name == name) {
            return Err(IamError::conflict(format!("policy name already in use: {}", name)));
        }

        let now = Utc::now();
        let policy = PolicyRecord {
            id: Uuid::new_v4(),
            account_id,
            name: name.to_string(),
            path: path.to_string(),
            document,
            policy_type,
            created_at: now,
            updated_at: now,
        };
        policies.insert(policy.id, policy.clone());
        Ok(policy)
    }

    async fn get_policy(&self, id: Uuid) -> StoreResult<PolicyRecord> {
        self.policies.read().await.get(&id).cloned().ok_or_else(|| IamError::not_found(format!("policy {}", id)))
    }

    async fn attach_policy(&self, policy_id: Uuid, target_type: AttachmentTargetType, target_id: Uuid) -> StoreResult<Attachment> {
        let mut attachments = self.attachments.write().await;
        if attachments.iter().any(|a| a.policy_id == policy_id && a.target_type == target_type && a.target_id == target_id) {
            return Err(IamError::conflict("policy already attached to this target"));
        }
        let attachment = Attachment { policy_id, target_type, target_id };
        attachments.push(attachment.clone());
        Ok(attachment)
    }

    async fn detach_policy(&self, policy_id: Uuid, target_type: AttachmentTargetType, target_id: Uuid) -> StoreResult<()> {
        let mut attachments = self.attachments.write().await;
        attachments.retain(|a| !(a.policy_id == policy_id && a.target_type == target_type && a.target_id == target_id));
        Ok(())
    }

    async fn attachment_count(&self, policy_id: Uuid) -> StoreResult<usize> {
        Ok(self.attachments.read().await.iter().filter(|a| a.policy_id == policy_id).count())
    }

    async fn policies_for_target(&self, target_type: AttachmentTargetType, target_id: Uuid) -> StoreResult<Vec<PolicyRecord>> {
        let attachments = self.attachments.read().await;
        let policies = self.policies.read().await;
        Ok(attachments
            .iter()
            .filter(|a| a.target_type == target_type && a.target_id == target_id)
            .filter_map(|a| policies.get(&a.policy_id).cloned())
            .collect())
    }

    async fn delete_policy(&self, id: Uuid) -> StoreResult<()> {
        let policy = self.get_policy(id).await?;
        if policy.is_system() {
            return Err(IamError::validation("system policies are immutable"));
        }
        let count = self.attachment_count(id).await?;
        if count > 0 {
            return Err(IamError::ResourceInUse { resource: format!("policy {}", id), attachment_count: count });
        }
        self.policies.write().await.remove(&id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPermissionStore {
    permissions: RwLock<HashMap<Uuid, Permission>>,
    attachments: RwLock<Vec<(Uuid, Uuid)>>, // (policy_id, permission_id)
}

#[async_trait]
impl PermissionStore for MemoryPermissionStore {
    async fn create_permission(
        &self,
        account_id: Option<Uuid>,
        service: &str,
        action: &str,
        resource_pattern: &str,
        effect: Effect,
        conditions: Option<Condition>,
        is_system: bool,
    ) -> StoreResult<Permission> {
        let mut permissions = self.permissions.write().await;
        if permissions.values().any(|p| {
            p.account_id == account_id && p.service == service && p.action == action && p.resource_pattern == resource_pattern
        }) {
            return Err(IamError::conflict(format!("permission already exists: {}:{} on {}", service, action, resource_pattern)));
        }

        let permission = Permission {
            id: Uuid::new_v4(),
            account_id,
            service: service.to_string(),
            action: action.to_string(),
            resource_pattern: resource_pattern.to_string(),
            effect,
            conditions,
            is_system,
        };
        permissions.insert(permission.id, permission.clone());
        Ok(permission)
    }

    async fn get_permission(&self, id: Uuid) -> StoreResult<Permission> {
        self.permissions.read().await.get(&id).cloned().ok_or_else(|| IamError::not_found(format!("permission {}", id)))
    }

    async fn attach_permission(&self, policy_id: Uuid, permission_id: Uuid) -> StoreResult<()> {
        self.get_permission(permission_id).await?;
        let mut attachments = self.attachments.write().await;
        if attachments.iter().any(|(p, perm)| *p == policy_id && *perm == permission_id) {
            return Err(IamError::conflict("permission already attached to this policy"));
        }
        attachments.push((policy_id, permission_id));
        Ok(())
    }

    async fn permissions_for_policy(&self, policy_id: Uuid) -> StoreResult<Vec<Permission>> {
        let attachments = self.attachments.read().await;
        let permissions = self.permissions.read().await;
        Ok(attachments
            .iter()
            .filter(|(p, _)| *p == policy_id)
            .filter_map(|(_, perm_id)| permissions.get(perm_id).cloned())
            .collect())
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

#[async_trait]
impl SessionStore for MemorySessionStore {
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
    ) -> StoreResult<Session> {
        let mut sessions = self.sessions.write().await;
        if sessions.values().any(|s| s.token_hash == token_hash) {
            return Err(IamError::conflict("token hash collision"));
        }

        let session = Session {
            id: Uuid::new_v4(),
            role_id,
            assumed_by: assumed_by.to_string(),
            session_name: session_name.to_string(),
            token_hash: token_hash.to_string(),
            assumed_at,
            expires_at,
            is_active: true,
            source_ip: source_ip.map(str::to_string),
            user_agent: user_agent.map(str::to_string),
            external_id: external_id.map(str::to_string),
        };
        sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn get_session(&self, id: Uuid) -> StoreResult<Session> {
        self.sessions.read().await.get(&id).cloned().ok_or_else(|| IamError::not_found(format!("session {}", id)))
    }

    async fn get_session_by_token_hash(&self, token_hash: &str) -> StoreResult<Session> {
        self.sessions
            .read()
            .await
            .values()
            .find(|s| s.token_hash == token_hash)
            .cloned()
            .ok_or_else(|| IamError::not_found("session for token"))
    }

    async fn extend_session(&self, id: Uuid, new_expires_at: DateTime<Utc>) -> StoreResult<Session> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or_else(|| IamError::not_found(format!("session {}", id)))?;
        session.expires_at = new_expires_at;
        Ok(session.clone())
    }

    async fn deactivate_session(&self, id: Uuid) -> StoreResult<()> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or_else(|| IamError::not_found(format!("session {}", id)))?;
        session.is_active = false;
        Ok(())
    }
}

struct ColdRow {
    token_type: TokenType,
    user_id: Uuid,
    account_id: Uuid,
    expires_at: DateTime<Utc>,
    revoked_at: DateTime<Utc>,
    reason: String,
    ip_address: Option<String>,
    user_agent: Option<String>,
}

/// Hybrid revocation store (§4.10): a hot TTL-ish map and a cold durable
/// map, both in-memory here. Production deployments back the cold tier
/// with the `token_blacklist` table and the hot tier with an external KV;
/// the fail-closed/repopulate contract is identical either way.
pub struct MemoryRevocationStore {
    hot: RwLock<HashMap<String, DateTime<Utc>>>,
    cold: RwLock<HashMap<String, ColdRow>>,
    hot_timeout: Duration,
}

impl Default for MemoryRevocationStore {
    fn default() -> Self {
        Self::new(Duration::from_millis(50))
    }
}

impl MemoryRevocationStore {
    pub fn new(hot_timeout: Duration) -> Self {
        Self { hot: RwLock::default(), cold: RwLock::default(), hot_timeout }
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn revoke(
        &self,
        token_hash: &str,
        token_type: TokenType,
        user_id: Uuid,
        account_id: Uuid,
        expires_at: DateTime<Utc>,
        reason: &str,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> StoreResult<()> {
        let now = Utc::now();
        if expires_at <= now {
            return Ok(());
        }

        let row = ColdRow {
            token_type,
            user_id,
            account_id,
            expires_at,
            revoked_at: now,
            reason: reason.to_string(),
            ip_address: ip_address.map(str::to_string),
            user_agent: user_agent.map(str::to_string),
        };
        self.cold.write().await.insert(token_hash.to_string(), row);
        self.hot.write().await.insert(token_hash.to_string(), expires_at);
        Ok(())
    }

    async fn is_revoked(&self, token_hash: &str, user_id: Uuid, issued_at: DateTime<Utc>) -> StoreResult<bool> {
        let now = Utc::now();

        // §5: the hot tier gets a bounded budget; a timeout falls through to
        // the cold tier below instead of failing the whole lookup.
        let hot_hit = match tokio::time::timeout(self.hot_timeout, self.hot.read()).await {
            Ok(hot) => hot.get(token_hash).is_some_and(|expires_at| *expires_at > now),
            Err(_) => false,
        };
        if hot_hit {
            return Ok(true);
        }

        let all_tokens_key = RevokedToken::synthetic_all_tokens_hash(user_id);
        {
            let cold = self.cold.read().await;
            if let Some(row) = cold.get(&all_tokens_key) {
                if row.expires_at > now && row.revoked_at > issued_at {
                    self.hot.write().await.insert(all_tokens_key, row.expires_at);
                    return Ok(true);
                }
            }

            if let Some(row) = cold.get(token_hash) {
                if row.expires_at > now {
                    self.hot.write().await.insert(token_hash.to_string(), row.expires_at);
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }

    async fn revoke_all_for_user(&self, user_id: Uuid, account_id: Uuid, reason: &str) -> StoreResult<()> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(30);
        let key = RevokedToken::synthetic_all_tokens_hash(user_id);

        let row = ColdRow {
            token_type: TokenType::Global,
            user_id,
            account_id,
            expires_at,
            revoked_at: now,
            reason: reason.to_string(),
            ip_address: None,
            user_agent: None,
        };
        self.cold.write().await.insert(key.clone(), row);
        self.hot.write().await.insert(key, expires_at);
        Ok(())
    }

    async fn cleanup(&self) -> StoreResult<usize> {
        let now = Utc::now();
        let mut cold = self.cold.write().await;
        let before = cold.len();
        cold.retain(|_, row| row.expires_at > now);
        let removed = before - cold.len();

        let mut hot = self.hot.write().await;
        hot.retain(|_, expires_at| *expires_at > now);

        Ok(removed)
    }
}

/// `SHA-256(password || salt)` hex, salt prepended to the stored hash as
/// `salt$digest`. Not a KDF — a real deployment swaps this seam for
/// `argon2`/`bcrypt`; the in-memory store only needs a working contract.
#[derive(Default)]
pub struct Sha256PasswordHasher;

impl PasswordHasher for Sha256PasswordHasher {
    fn hash(&self, password: &str) -> StoreResult<String> {
        let salt: [u8; 16] = rand::random();
        let salt_hex = hex_encode(&salt);
        let digest = Sha256::digest(format!("{}{}", salt_hex, password).as_bytes());
        Ok(format!("{}${}", salt_hex, hex_encode(&digest)))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let Some((salt_hex, expected_digest)) = hash.split_once('$') else {
            return false;
        };
        let digest = Sha256::digest(format!("{}{}", salt_hex, password).as_bytes());
        hex_encode(&digest) == expected_digest
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut acc, b| {
        let _ = write!(acc, "{:02x}", b);
        acc
    })
}

use std::str::FromStr as _;

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_account_and_root_user() {
        let accounts = MemoryAccountStore::default();
        let users = MemoryUserStore::default();

        let account = accounts.create_account("Acme", "admin@acme.example").await.unwrap();
        let root = users.create_user(account.id, "root", "hash", true, Some("admin@acme.example")).await.unwrap();
        assert!(root.is_root);

        let second_root = users.create_user(account.id, "root2", "hash", true, None).await;
        assert!(second_root.is_err());
    }

    #[test_log::test(tokio::test)]
    async fn test_group_membership_roundtrip() {
        let groups = MemoryGroupStore::default();
        let account_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        let group = groups.create_group(account_id, "engineers", "/").await.unwrap();
        groups.add_user_to_group(group.id, user_id).await.unwrap();
        assert_eq!(groups.groups_for_user(user_id).await.unwrap().len(), 1);

        groups.remove_user_from_group(group.id, user_id).await.unwrap();
        assert!(groups.groups_for_user(user_id).await.unwrap().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_delete_group_rejects_while_nonempty() {
        let groups = MemoryGroupStore::default();
        let account_id = Uuid::new_v4();

        let group = groups.create_group(account_id, "engineers", "/").await.unwrap();
        groups.add_user_to_group(group.id, Uuid::new_v4()).await.unwrap();
        groups.add_user_to_group(group.id, Uuid::new_v4()).await.unwrap();

        match groups.delete_group(group.id).await {
            Err(IamError::ResourceInUse { attachment_count, .. }) => assert_eq!(attachment_count, 2),
            other => panic!("expected ResourceInUse with count 2, got {:?}", other),
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_policy_delete_rejected_while_attached() {
        let policies = MemoryPolicyStore::default();
        let doc: PolicyDocument =
            r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":"*","Resource":"*"}]}"#.parse().unwrap();

        let policy = policies.create_policy(None, "FullAccess", "/", doc, PolicyType::Custom).await.unwrap();
        let user_id = Uuid::new_v4();
        policies.attach_policy(policy.id, AttachmentTargetType::User, user_id).await.unwrap();

        assert!(policies.delete_policy(policy.id).await.is_err());

        policies.detach_policy(policy.id, AttachmentTargetType::User, user_id).await.unwrap();
        assert!(policies.delete_policy(policy.id).await.is_ok());
    }

    #[test_log::test(tokio::test)]
    async fn test_permission_attach_and_lookup() {
        let permissions = MemoryPermissionStore::default();
        let policy_id = Uuid::new_v4();

        let permission =
            permissions.create_permission(None, "s3", "GetObject", "arn:aws:s3:::bucket/*", Effect::Allow, None, false).await.unwrap();
        permissions.attach_permission(policy_id, permission.id).await.unwrap();

        let attached = permissions.permissions_for_policy(policy_id).await.unwrap();
        assert_eq!(attached.len(), 1);
        assert_eq!(attached[0].service, "s3");

        assert!(permissions.attach_permission(policy_id, permission.id).await.is_err());
    }

    #[test_log::test(tokio::test)]
    async fn test_revocation_hot_and_cold() {
        let store = MemoryRevocationStore::default();
        let user_id = Uuid::new_v4();
        let account_id = Uuid::new_v4();
        let issued_at = Utc::now() - chrono::Duration::seconds(5);
        let expires_at = Utc::now() + chrono::Duration::minutes(15);

        assert!(!store.is_revoked("abc", user_id, issued_at).await.unwrap());

        store.revoke("abc", TokenType::Access, user_id, account_id, expires_at, "logout", None, None).await.unwrap();
        assert!(store.is_revoked("abc", user_id, issued_at).await.unwrap());
    }

    #[test_log::test(tokio::test)]
    async fn test_revoke_all_for_user_rejects_older_tokens() {
        let store = MemoryRevocationStore::default();
        let user_id = Uuid::new_v4();
        let account_id = Uuid::new_v4();
        let issued_before = Utc::now() - chrono::Duration::seconds(5);

        store.revoke_all_for_user(user_id, account_id, "admin revoke").await.unwrap();
        assert!(store.is_revoked("any-token-hash", user_id, issued_before).await.unwrap());

        let issued_after = Utc::now() + chrono::Duration::seconds(5);
        assert!(!store.is_revoked("any-token-hash", user_id, issued_after).await.unwrap());
    }

    #[test_log::test]
    fn test_password_hash_roundtrip() {
        let hasher = Sha256PasswordHasher;
        let hash = hasher.hash("correct horse battery staple").unwrap();
        assert!(hasher.verify("correct horse battery staple", &hash));
        assert!(!hasher.verify("wrong password", &hash));
    }
}
