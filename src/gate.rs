//! Authorization Gate (C10 — §4.11): the per-request entry point. Ties
//! together the Revocation Store (C9), root escape hatch, Policy Resolver
//! (C4), Policy Evaluator (C3), and Access Decision Engine (C5); also
//! orchestrates AssumeRole (C6 + C7 + C8) and logout. Grounded on
//! `policy.rs`/`resolver.rs`/`decision.rs` for evaluation, new orchestration
//! glue for the request lifecycle itself.

use {
    crate::{
        config::Config,
        context::EvalContext,
        credential::{self, AccessClaims, RefreshClaims, SigningKey},
        decision::{evaluate_access, AccessDecision, Decision, ResolvedPolicy},
        model::{Role, TokenType},
        resolver::resolve_policies_for_user,
        resource::Arn,
        session,
        store::{GroupStore, PasswordHasher, PermissionStore, PolicyStore, RevocationStore, RoleStore, SessionStore, UserStore},
        trust::TrustPolicy,
        IamError,
    },
    chrono::Utc,
    std::{collections::BTreeMap, str::FromStr, sync::Arc, time::Duration},
    uuid::Uuid,
};

/// Request-scoped metadata the Gate folds into the evaluation context
/// (§4.11: "builds the context from request metadata ... the Gate never
/// reads other request state").
#[derive(Clone, Debug, Default)]
pub struct RequestMetadata {
    pub source_ip: Option<String>,
    pub user_agent: Option<String>,
    pub requested_region: Option<String>,
    /// Caller-supplied `x-context-*` headers, already stripped of the
    /// `x-context-` prefix (e.g. `sts:ExternalId`).
    pub extra_context: BTreeMap<String, String>,
}

pub struct AuthorizeRequest {
    pub user_id: Uuid,
    pub token_hash: String,
    pub token_issued_at: chrono::DateTime<Utc>,
    pub action: String,
    pub resource: Option<Arn>,
    pub metadata: RequestMetadata,
}

pub struct AssumeRoleRequest {
    pub actor: crate::principal::Actor,
    pub role_id: Uuid,
    pub session_name: String,
    pub requested_duration_secs: Option<u32>,
    pub external_id: Option<String>,
    pub metadata: RequestMetadata,
}

pub struct AssumedCredentials {
    pub access_token: String,
    pub refresh_token: String,
    pub session_id: Uuid,
    pub expires_at: chrono::DateTime<Utc>,
}

pub struct Gate {
    pub group_store: Arc<dyn GroupStore>,
    pub role_store: Arc<dyn RoleStore>,
    pub policy_store: Arc<dyn PolicyStore>,
    pub permission_store: Arc<dyn PermissionStore>,
    pub session_store: Arc<dyn SessionStore>,
    pub revocation_store: Arc<dyn RevocationStore>,
    pub user_store: Arc<dyn UserStore>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub signing_key: SigningKey,
    pub config: Config,
}

impl Gate {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        group_store: Arc<dyn GroupStore>,
        role_store: Arc<dyn RoleStore>,
        policy_store: Arc<dyn PolicyStore>,
        permission_store: Arc<dyn PermissionStore>,
        session_store: Arc<dyn SessionStore>,
        revocation_store: Arc<dyn RevocationStore>,
        user_store: Arc<dyn UserStore>,
        password_hasher: Arc<dyn PasswordHasher>,
        signing_key: SigningKey,
        config: Config,
    ) -> Self {
        Self {
            group_store,
            role_store,
            policy_store,
            permission_store,
            session_store,
            revocation_store,
            user_store,
            password_hasher,
            signing_key,
            config,
        }
    }

    /// §4.11, steps 1-5. `deadline` bounds the whole call (§5): on expiry
    /// every suspension point below is abandoned and `DeadlineExceeded` is
    /// surfaced instead of whatever partial result was in flight.
    pub async fn authorize(&self, req: AuthorizeRequest, deadline: Duration) -> Result<AccessDecision, IamError> {
        tokio::time::timeout(deadline, self.authorize_inner(req)).await.map_err(|_| IamError::DeadlineExceeded)?
    }

    async fn authorize_inner(&self, req: AuthorizeRequest) -> Result<AccessDecision, IamError> {
        let revoked = match self.revocation_store.is_revoked(&req.token_hash, req.user_id, req.token_issued_at).await {
            Ok(revoked) => revoked,
            // fail closed: a broken revocation store must never be read as "not revoked" (§4.10).
            Err(_) => true,
        };
        if revoked {
            return Ok(AccessDecision { decision: Decision::Deny, reason: "token revoked".to_string(), matched_policies: vec![] });
        }

        let roles = self.role_store.roles_for_user(req.user_id).await?;
        if roles.iter().any(Role::is_root) {
            return Ok(AccessDecision { decision: Decision::Allow, reason: "root role".to_string(), matched_policies: vec![] });
        }

        let (policies, synthesized) = resolve_policies_for_user(
            req.user_id,
            self.group_store.as_ref(),
            self.role_store.as_ref(),
            self.policy_store.as_ref(),
            self.permission_store.as_ref(),
        )
        .await?;

        let ctx = build_context(&req.action, req.resource, &req.metadata);
        let mut resolved: Vec<ResolvedPolicy> =
            policies.iter().map(|p| ResolvedPolicy { policy_id: p.id.to_string(), policy_name: p.name.clone(), document: &p.document }).collect();
        resolved.extend(
            synthesized
                .iter()
                .map(|s| ResolvedPolicy { policy_id: s.policy_id.to_string(), policy_name: s.policy_name.clone(), document: &s.document }),
        );

        Ok(evaluate_access(&ctx, &resolved))
    }

    /// Trust evaluation (C6) + token issuance (C7) + session creation (C8).
    pub async fn assume_role(&self, req: AssumeRoleRequest, deadline: Duration) -> Result<AssumedCredentials, IamError> {
        tokio::time::timeout(deadline, self.assume_role_inner(req)).await.map_err(|_| IamError::DeadlineExceeded)?
    }

    async fn assume_role_inner(&self, req: AssumeRoleRequest) -> Result<AssumedCredentials, IamError> {
        let role = self.role_store.get_role(req.role_id).await?;
        let trust_policy = TrustPolicy::from_str(&role.trust_document).map_err(|e| IamError::internal(e.to_string()))?;

        let mut ctx = EvalContext::builder().action("sts:AssumeRole").service("sts").build().unwrap();
        if let Some(source_ip) = &req.metadata.source_ip {
            ctx.values.insert("aws:SourceIp".to_string(), source_ip.clone());
        }
        if let Some(external_id) = &req.external_id {
            ctx.values.insert("sts:ExternalId".to_string(), external_id.clone());
        }
        for (k, v) in &req.metadata.extra_context {
            ctx.values.insert(k.clone(), v.clone());
        }

        if trust_policy.evaluate(&req.actor, &ctx) != crate::trust::TrustDecision::Allowed {
            return Err(IamError::AuthorizationDenied { reason: "trust policy denied".to_string(), matched_policies: vec![] });
        }

        let assumed_at = Utc::now();
        let expires_at = session::compute_assume_role_expiry(&role, req.requested_duration_secs, assumed_at);
        let session_id = Uuid::new_v4();

        let account_id = role.account_id.unwrap_or(Uuid::nil());
        let user_id = Uuid::from_str(&req.actor.identifier).unwrap_or(Uuid::nil());

        let access_claims = AccessClaims {
            user_id,
            account_id,
            username: req.actor.identifier.clone(),
            is_root: false,
            session_id: Some(session_id),
            role_id: Some(role.id),
            iat: assumed_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        let access_token = credential::issue_access_token(&self.signing_key, &access_claims)?;

        let refresh_claims = RefreshClaims {
            user_id,
            account_id,
            session_id: Some(session_id),
            token_family: Uuid::new_v4(),
            iat: assumed_at.timestamp(),
            exp: (assumed_at + chrono::Duration::from_std(self.config.refresh_token_ttl).unwrap()).timestamp(),
        };
        let refresh_token = credential::issue_refresh_token(&self.signing_key, &refresh_claims)?;

        let token_hash = credential::token_hash(&access_token);
        self.session_store
            .create_session(
                role.id,
                &req.actor.identifier,
                &req.session_name,
                &token_hash,
                assumed_at,
                expires_at,
                req.metadata.source_ip.as_deref(),
                req.metadata.user_agent.as_deref(),
                req.external_id.as_deref(),
            )
            .await?;

        Ok(AssumedCredentials { access_token, refresh_token, session_id, expires_at })
    }

    /// Revokes both tokens and deactivates the backing session.
    pub async fn logout(&self, access_token: &str, refresh_token: &str, deadline: Duration) -> Result<(), IamError> {
        tokio::time::timeout(deadline, self.logout_inner(access_token, refresh_token)).await.map_err(|_| IamError::DeadlineExceeded)?
    }

    async fn logout_inner(&self, access_token: &str, refresh_token: &str) -> Result<(), IamError> {
        let access_claims = credential::decode_access_token(&self.signing_key, access_token)?;
        let refresh_claims = credential::decode_refresh_token(&self.signing_key, refresh_token)?;

        let access_hash = credential::token_hash(access_token);
        let refresh_hash = credential::token_hash(refresh_token);

        let access_exp = chrono::DateTime::from_timestamp(access_claims.exp, 0).unwrap_or_else(Utc::now);
        let refresh_exp = chrono::DateTime::from_timestamp(refresh_claims.exp, 0).unwrap_or_else(Utc::now);

        self.revocation_store
            .revoke(&access_hash, TokenType::Access, access_claims.user_id, access_claims.account_id, access_exp, "logout", None, None)
            .await?;
        self.revocation_store
            .revoke(&refresh_hash, TokenType::Refresh, refresh_claims.user_id, refresh_claims.account_id, refresh_exp, "logout", None, None)
            .await?;

        if let Some(session_id) = access_claims.session_id {
            self.session_store.deactivate_session(session_id).await?;
        }

        Ok(())
    }

    pub async fn revoke_all_for_user(&self, user_id: Uuid, account_id: Uuid, reason: &str, deadline: Duration) -> Result<(), IamError> {
        tokio::time::timeout(deadline, self.revocation_store.revoke_all_for_user(user_id, account_id, reason))
            .await
            .map_err(|_| IamError::DeadlineExceeded)?
    }
}

/// §4.11: builds `aws:SourceIp`, `aws:UserAgent`, `aws:CurrentTime`,
/// `aws:RequestedRegion`, plus caller-supplied `x-context-*` entries.
fn build_context(action: &str, resource: Option<Arn>, metadata: &RequestMetadata) -> EvalContext {
    let service = action.split_once(':').map(|(s, _)| s).unwrap_or(action).to_string();
    let mut ctx = EvalContext::builder().action(action).service(service).build().unwrap();

    if let Some(resource) = resource {
        ctx.resources.push(resource);
    }

    if let Some(source_ip) = &metadata.source_ip {
        ctx.values.insert("aws:SourceIp".to_string(), source_ip.clone());
    }
    if let Some(user_agent) = &metadata.user_agent {
        ctx.values.insert("aws:UserAgent".to_string(), user_agent.clone());
    }
    if let Some(region) = &metadata.requested_region {
        ctx.values.insert("aws:RequestedRegion".to_string(), region.clone());
    }
    ctx.values.insert("aws:CurrentTime".to_string(), Utc::now().to_rfc3339());

    for (k, v) in &metadata.extra_context {
        ctx.values.insert(k.clone(), v.clone());
    }

    ctx
}
