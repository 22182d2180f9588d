//! Trust Evaluator (C6 — §4.6): a variant of the Policy Evaluator (C3)
//! specialized for role-assumption trust documents, where each statement
//! additionally names the principal(s) allowed to assume the role. Grounded
//! on `policy.rs`'s document/evaluate shape, generalized with the `Principal`
//! match this crate's `statement.rs` deliberately dropped.

use {
    crate::{
        action::ActionList, condition::Condition, context::EvalContext, display_json, effect::Effect,
        from_str_json, principal::{Actor, Principal},
        IamError,
    },
    derive_builder::Builder,
    serde::{
        de::{Deserializer, MapAccess, Visitor},
        Deserialize, Serialize,
    },
    std::fmt::{Formatter, Result as FmtResult},
};

/// Outcome of a trust-policy evaluation (§4.6): whether `actor` may assume
/// the role under `ctx`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TrustDecision {
    Allowed,
    Denied,
}

#[derive(Builder, Clone, Debug, Eq, PartialEq, Serialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct TrustStatement {
    #[builder(setter(into, strip_option), default)]
    #[serde(rename = "Sid", skip_serializing_if = "Option::is_none")]
    sid: Option<String>,

    #[serde(rename = "Effect")]
    effect: Effect,

    #[serde(rename = "Principal")]
    principal: Principal,

    #[serde(rename = "Action")]
    action: ActionList,

    #[builder(setter(into, strip_option), default)]
    #[serde(rename = "Condition", skip_serializing_if = "Option::is_none")]
    condition: Option<Condition>,
}

impl TrustStatement {
    pub fn builder() -> TrustStatementBuilder {
        TrustStatementBuilder::default()
    }

    #[inline]
    pub fn effect(&self) -> Effect {
        self.effect
    }

    #[inline]
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    #[inline]
    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    /// §4.6.1-3: principal must match, action must be an `sts:AssumeRole`
    /// variant, then the condition (if present, including an
    /// `sts:ExternalId` challenge) must pass.
    fn applies_to(&self, actor: &Actor, ctx: &EvalContext) -> bool {
        if !self.principal.matches(actor) {
            return false;
        }

        let action_matches = self.action.iter().any(|a| a.matches("sts", "AssumeRole"));
        if !action_matches {
            return false;
        }

        match &self.condition {
            Some(condition) => condition.matches(ctx),
            None => true,
        }
    }
}

display_json!(TrustStatement);
from_str_json!(TrustStatement);

impl<'de> Deserialize<'de> for TrustStatement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TrustStatementVisitor)
    }
}

struct TrustStatementVisitor;
impl<'de> Visitor<'de> for TrustStatementVisitor {
    type Value = TrustStatement;

    fn expecting(&self, f: &mut Formatter) -> FmtResult {
        f.write_str("a trust statement with Effect, Principal, and Action")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<TrustStatement, A::Error> {
        let mut builder = TrustStatement::builder();
        let mut sid_seen = false;
        let mut effect_seen = false;
        let mut principal_seen = false;
        let mut action_seen = false;
        let mut condition_seen = false;

        while let Some(key) = access.next_key::<&str>()? {
            match key {
                "Sid" => {
                    if sid_seen {
                        return Err(serde::de::Error::duplicate_field("Sid"));
                    }
                    sid_seen = true;
                    builder.sid(access.next_value::<&str>()?);
                }
                "Effect" => {
                    if effect_seen {
                        return Err(serde::de::Error::duplicate_field("Effect"));
                    }
                    effect_seen = true;
                    builder.effect(access.next_value::<Effect>()?);
                }
                "Principal" => {
                    if principal_seen {
                        return Err(serde::de::Error::duplicate_field("Principal"));
                    }
                    principal_seen = true;
                    builder.principal(access.next_value::<Principal>()?);
                }
                "Action" => {
                    if action_seen {
                        return Err(serde::de::Error::duplicate_field("Action"));
                    }
                    action_seen = true;
                    builder.action(access.next_value::<ActionList>()?);
                }
                "Condition" => {
                    if condition_seen {
                        return Err(serde::de::Error::duplicate_field("Condition"));
                    }
                    condition_seen = true;
                    builder.condition(access.next_value::<Condition>()?);
                }
                _ => {
                    return Err(serde::de::Error::unknown_field(
                        key,
                        &["Sid", "Effect", "Principal", "Action", "Condition"],
                    ));
                }
            }
        }

        builder.build().map_err(serde::de::Error::custom)
    }
}

impl TrustStatementBuilder {
    fn validate(&self) -> Result<(), TrustStatementBuilderError> {
        if self.effect.is_none() {
            return Err(TrustStatementBuilderError::ValidationError("Effect must be set.".to_string()));
        }
        if self.principal.is_none() {
            return Err(TrustStatementBuilderError::ValidationError("Principal must be set.".to_string()));
        }
        if self.action.is_none() {
            return Err(TrustStatementBuilderError::ValidationError("Action must be set.".to_string()));
        }

        Ok(())
    }
}

/// A role's trust document: `{ Version, Statement: [TrustStatement, ...] }`.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct TrustPolicy {
    #[serde(rename = "Version")]
    version: crate::policy::PolicyVersion,

    #[serde(rename = "Statement")]
    statement: Vec<TrustStatement>,
}

impl TrustPolicy {
    pub fn new(version: crate::policy::PolicyVersion, statement: Vec<TrustStatement>) -> Result<Self, IamError> {
        if statement.is_empty() {
            return Err(IamError::validation("trust policy Statement must be non-empty"));
        }
        Ok(Self { version, statement })
    }

    #[inline]
    pub fn statement(&self) -> &[TrustStatement] {
        &self.statement
    }

    /// §4.6: any matched `Deny` rejects; else any matched `Allow` admits;
    /// else implicit deny.
    pub fn evaluate(&self, actor: &Actor, ctx: &EvalContext) -> TrustDecision {
        let mut allowed = false;

        for statement in &self.statement {
            if !statement.applies_to(actor, ctx) {
                continue;
            }

            match statement.effect {
                Effect::Deny => return TrustDecision::Denied,
                Effect::Allow => allowed = true,
            }
        }

        if allowed {
            TrustDecision::Allowed
        } else {
            TrustDecision::Denied
        }
    }
}

display_json!(TrustPolicy);
from_str_json!(TrustPolicy);

#[cfg(test)]
mod tests {
    use {super::*, crate::policy::PolicyVersion, indoc::indoc, pretty_assertions::assert_eq};

    #[test_log::test]
    fn test_wildcard_principal_allows() {
        let tp: TrustPolicy = serde_json::from_str(indoc! {r#"
        {
            "Version": "2012-10-17",
            "Statement": [
                { "Effect": "Allow", "Principal": { "AWS": "*" }, "Action": "sts:AssumeRole" }
            ]
        }"#}).unwrap();

        let actor = Actor::aws("arn:aws:iam::123456789012:user/alice");
        let ctx = EvalContext::builder().action("sts:AssumeRole").service("sts").build().unwrap();
        assert_eq!(tp.evaluate(&actor, &ctx), TrustDecision::Allowed);
    }

    #[test_log::test]
    fn test_external_id_required() {
        let tp: TrustPolicy = serde_json::from_str(indoc! {r#"
        {
            "Version": "2012-10-17",
            "Statement": [
                {
                    "Effect": "Allow",
                    "Principal": { "AWS": "*" },
                    "Action": "sts:AssumeRole",
                    "Condition": { "StringEquals": { "sts:ExternalId": "abc123" } }
                }
            ]
        }"#}).unwrap();

        let actor = Actor::aws("arn:aws:iam::123456789012:user/alice");

        let good_ctx = EvalContext::builder()
            .action("sts:AssumeRole")
            .service("sts")
            .build()
            .unwrap()
            .with_value("sts:ExternalId", "abc123");
        assert_eq!(tp.evaluate(&actor, &good_ctx), TrustDecision::Allowed);

        let bad_ctx = EvalContext::builder()
            .action("sts:AssumeRole")
            .service("sts")
            .build()
            .unwrap()
            .with_value("sts:ExternalId", "wrong");
        assert_eq!(tp.evaluate(&actor, &bad_ctx), TrustDecision::Denied);
    }

    #[test_log::test]
    fn test_principal_mismatch_denied() {
        let tp: TrustPolicy = serde_json::from_str(indoc! {r#"
        {
            "Version": "2012-10-17",
            "Statement": [
                { "Effect": "Allow", "Principal": { "AWS": "123456789012" }, "Action": "sts:AssumeRole" }
            ]
        }"#}).unwrap();

        let actor = Actor::aws("999999999999");
        let ctx = EvalContext::builder().action("sts:AssumeRole").service("sts").build().unwrap();
        assert_eq!(tp.evaluate(&actor, &ctx), TrustDecision::Denied);
    }

    #[test_log::test]
    fn test_explicit_deny_wins() {
        let tp: TrustPolicy = serde_json::from_str(indoc! {r#"
        {
            "Version": "2012-10-17",
            "Statement": [
                { "Effect": "Allow", "Principal": { "AWS": "*" }, "Action": "sts:AssumeRole" },
                { "Effect": "Deny", "Principal": { "AWS": "999999999999" }, "Action": "sts:AssumeRole" }
            ]
        }"#}).unwrap();

        let actor = Actor::aws("999999999999");
        let ctx = EvalContext::builder().action("sts:AssumeRole").service("sts").build().unwrap();
        assert_eq!(tp.evaluate(&actor, &ctx), TrustDecision::Denied);
    }

    #[test_log::test]
    fn test_empty_statement_rejected() {
        assert!(TrustPolicy::new(PolicyVersion::V2012_10_17, vec![]).is_err());
    }
}
