//! Policy Resolver (C4 — §4.7): given a principal, walks user, group, and
//! role attachments into the ordered, deduplicated policy set the Access
//! Decision Engine (C5) evaluates. Grounded on `store/mod.rs`'s trait
//! boundaries — this module only orchestrates calls across them. Also
//! synthesizes single-statement policy documents from any `Permission` rows
//! attached to a resolved policy (§4.7's optional granular-permission model).

use {
    crate::{
        action::{Action, ActionList},
        model::{AttachmentTargetType, Permission, PolicyRecord},
        policy::{PolicyDocument, PolicyVersion},
        resource::{Resource, ResourceList},
        statement::Statement,
        store::{GroupStore, PermissionStore, PolicyStore, RoleStore},
        IamError,
    },
    std::collections::HashSet,
    uuid::Uuid,
};

/// A policy document synthesized from one `Permission` row, attributed back
/// to the policy it is attached to for the audit trail (§4.5's
/// `matchedPolicies`).
pub struct SynthesizedPolicy {
    pub policy_id: Uuid,
    pub policy_name: String,
    pub document: PolicyDocument,
}

/// Builds the single-statement document §4.7 describes: one `Allow`/`Deny`
/// statement from `service:action`, `resourcePattern`, `effect`, `conditions`.
fn synthesize_policy_document(permission: &Permission) -> Result<PolicyDocument, IamError> {
    let action = Action::new(&permission.service, &permission.action)?;
    let resource: Resource = permission.resource_pattern.parse()?;

    let mut statement_builder = Statement::builder();
    statement_builder.effect(permission.effect).action(ActionList::from(action)).resource(ResourceList::from(resource));
    if let Some(condition) = &permission.conditions {
        statement_builder.condition(condition.clone());
    }
    let statement = statement_builder.build().map_err(|e| IamError::internal(e.to_string()))?;

    PolicyDocument::builder().version(PolicyVersion::V2012_10_17).statement(vec![statement]).build().map_err(|e| IamError::internal(e.to_string()))
}

/// Synthesizes one `SynthesizedPolicy` per `Permission` attached to `policy`,
/// appended after the document-model policies per §4.7.
async fn synthesize_for_policy(policy: &PolicyRecord, permission_store: &dyn PermissionStore) -> Result<Vec<SynthesizedPolicy>, IamError> {
    let mut synthesized = Vec::new();
    for permission in permission_store.permissions_for_policy(policy.id).await? {
        synthesized.push(SynthesizedPolicy {
            policy_id: policy.id,
            policy_name: policy.name.clone(),
            document: synthesize_policy_document(&permission)?,
        });
    }
    Ok(synthesized)
}

/// §4.7: direct user attachments, then group attachments for every group
/// the user belongs to, then role policies for every role the user holds.
/// Deduplicated by policy id, first occurrence wins — so a user's own
/// attachment shadows the same policy reached again through a group.
pub async fn resolve_policies_for_user(
    user_id: Uuid,
    group_store: &dyn GroupStore,
    role_store: &dyn RoleStore,
    policy_store: &dyn PolicyStore,
    permission_store: &dyn PermissionStore,
) -> Result<(Vec<PolicyRecord>, Vec<SynthesizedPolicy>), IamError> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::new();

    for policy in policy_store.policies_for_target(AttachmentTargetType::User, user_id).await? {
        if seen.insert(policy.id) {
            resolved.push(policy);
        }
    }

    for group in group_store.groups_for_user(user_id).await? {
        for policy in policy_store.policies_for_target(AttachmentTargetType::Group, group.id).await? {
            if seen.insert(policy.id) {
                resolved.push(policy);
            }
        }
    }

    for role in role_store.roles_for_user(user_id).await? {
        for policy in policy_store.policies_for_target(AttachmentTargetType::Role, role.id).await? {
            if seen.insert(policy.id) {
                resolved.push(policy);
            }
        }
    }

    let mut synthesized = Vec::new();
    for policy in &resolved {
        synthesized.extend(synthesize_for_policy(policy, permission_store).await?);
    }

    Ok((resolved, synthesized))
}

/// The policies attached directly to an assumed role's session — used once
/// a caller has already become `(roleId)` via AssumeRole, as distinct from
/// the roles a user merely *holds* via `UserRoleAssignment`.
pub async fn resolve_policies_for_role(
    role_id: Uuid,
    policy_store: &dyn PolicyStore,
    permission_store: &dyn PermissionStore,
) -> Result<(Vec<PolicyRecord>, Vec<SynthesizedPolicy>), IamError> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::new();

    for policy in policy_store.policies_for_target(AttachmentTargetType::Role, role_id).await? {
        if seen.insert(policy.id) {
            resolved.push(policy);
        }
    }

    let mut synthesized = Vec::new();
    for policy in &resolved {
        synthesized.extend(synthesize_for_policy(policy, permission_store).await?);
    }

    Ok((resolved, synthesized))
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            effect::Effect,
            model::PolicyType,
            policy::PolicyDocument,
            store::memory::{MemoryGroupStore, MemoryPermissionStore, MemoryPolicyStore, MemoryRoleStore},
        },
    };

    fn allow_all_doc() -> PolicyDocument {
        r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":"*","Resource":"*"}]}"#.parse().unwrap()
    }

    #[test_log::test(tokio::test)]
    async fn test_dedup_across_direct_and_group_attachment() {
        let groups = MemoryGroupStore::default();
        let roles = MemoryRoleStore::default();
        let policies = MemoryPolicyStore::default();
        let permissions = MemoryPermissionStore::default();

        let account_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let policy = policies.create_policy(Some(account_id), "Shared", "/", allow_all_doc(), PolicyType::Custom).await.unwrap();

        let group = groups.create_group(account_id, "team", "/").await.unwrap();
        groups.add_user_to_group(group.id, user_id).await.unwrap();

        policies.attach_policy(policy.id, AttachmentTargetType::User, user_id).await.unwrap();
        policies.attach_policy(policy.id, AttachmentTargetType::Group, group.id).await.unwrap();

        let (resolved, synthesized) = resolve_policies_for_user(user_id, &groups, &roles, &policies, &permissions).await.unwrap();
        assert_eq!(resolved.len(), 1);
        assert!(synthesized.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_role_policies_included() {
        let groups = MemoryGroupStore::default();
        let roles = MemoryRoleStore::default();
        let policies = MemoryPolicyStore::default();
        let permissions = MemoryPermissionStore::default();

        let account_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let trust = r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Principal":{"AWS":"*"},"Action":"sts:AssumeRole"}]}"#;
        let role = roles.create_role(Some(account_id), "Auditor", "/", trust, 3600).await.unwrap();
        roles.assign_role_to_user(user_id, role.id, user_id).await.unwrap();

        let policy = policies.create_policy(Some(account_id), "AuditOnly", "/", allow_all_doc(), PolicyType::Custom).await.unwrap();
        policies.attach_policy(policy.id, AttachmentTargetType::Role, role.id).await.unwrap();

        let (resolved, _synthesized) = resolve_policies_for_user(user_id, &groups, &roles, &policies, &permissions).await.unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].name, "AuditOnly");
    }

    #[test_log::test(tokio::test)]
    async fn test_no_attachments_resolves_empty() {
        let groups = MemoryGroupStore::default();
        let roles = MemoryRoleStore::default();
        let policies = MemoryPolicyStore::default();
        let permissions = MemoryPermissionStore::default();

        let (resolved, synthesized) = resolve_policies_for_user(Uuid::new_v4(), &groups, &roles, &policies, &permissions).await.unwrap();
        assert!(resolved.is_empty());
        assert!(synthesized.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_permission_row_synthesized_after_document_policy() {
        let groups = MemoryGroupStore::default();
        let roles = MemoryRoleStore::default();
        let policies = MemoryPolicyStore::default();
        let permissions = MemoryPermissionStore::default();

        let account_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let policy = policies.create_policy(Some(account_id), "Granular", "/", allow_all_doc(), PolicyType::Custom).await.unwrap();
        policies.attach_policy(policy.id, AttachmentTargetType::User, user_id).await.unwrap();

        let permission =
            permissions.create_permission(Some(account_id), "s3", "GetObject", "arn:aws:s3:::bucket/*", Effect::Allow, None, false).await.unwrap();
        permissions.attach_permission(policy.id, permission.id).await.unwrap();

        let (resolved, synthesized) = resolve_policies_for_user(user_id, &groups, &roles, &policies, &permissions).await.unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(synthesized.len(), 1);
        assert_eq!(synthesized[0].policy_name, "Granular");
        assert_eq!(synthesized[0].document.statement().len(), 1);
    }
}
