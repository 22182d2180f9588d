//! A single clause within a policy document (C3 — per-statement match).
//! Uses a Visitor-with-seen-flags deserialization idiom and validates
//! exactly-one-of Action/Resource at parse time. The policy-document
//! grammar this crate implements (§4.1) has no `Not*` fields, so
//! `NotAction`/`NotResource`/`NotPrincipal` are not modeled.

use {
    crate::{
        action::ActionList, condition::Condition, context::EvalContext, display_json, effect::Effect,
        from_str_json, resource::ResourceList,
    },
    derive_builder::Builder,
    serde::{
        de::{Deserializer, MapAccess, Visitor},
        Deserialize, Serialize,
    },
    std::fmt::{Formatter, Result as FmtResult},
};

/// Outcome of evaluating one statement against `(action, resource, context)`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatementOutcome {
    NoMatch,
    Allow,
    Deny,
}

#[derive(Builder, Clone, Debug, Eq, PartialEq, Serialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Statement {
    #[builder(setter(into, strip_option), default)]
    #[serde(rename = "Sid", skip_serializing_if = "Option::is_none")]
    sid: Option<String>,

    #[serde(rename = "Effect")]
    effect: Effect,

    #[serde(rename = "Action")]
    action: ActionList,

    #[serde(rename = "Resource")]
    resource: ResourceList,

    #[builder(setter(into, strip_option), default)]
    #[serde(rename = "Condition", skip_serializing_if = "Option::is_none")]
    condition: Option<Condition>,
}

impl Statement {
    pub fn builder() -> StatementBuilder {
        StatementBuilder::default()
    }

    #[inline]
    pub fn sid(&self) -> Option<&str> {
        self.sid.as_deref()
    }

    #[inline]
    pub fn effect(&self) -> Effect {
        self.effect
    }

    #[inline]
    pub fn action(&self) -> &ActionList {
        &self.action
    }

    #[inline]
    pub fn resource(&self) -> &ResourceList {
        &self.resource
    }

    #[inline]
    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    /// `Action` matches, *and* `Resource` matches, *and* `Condition` (if any)
    /// passes (§4.4).
    pub fn evaluate(&self, ctx: &EvalContext) -> StatementOutcome {
        let action_matches = self.action.iter().any(|a| a.matches(&ctx.service, action_name(&ctx.action)));
        if !action_matches {
            return StatementOutcome::NoMatch;
        }

        // §4.4 evaluates against a required resource R; a request with no
        // resource at all cannot satisfy any statement's Resource restriction.
        let resource_matches = ctx.resources.iter().any(|r| self.resource.iter().any(|pattern| pattern.matches(r)));
        if !resource_matches {
            return StatementOutcome::NoMatch;
        }

        if let Some(condition) = &self.condition {
            if !condition.matches(ctx) {
                return StatementOutcome::NoMatch;
            }
        }

        match self.effect {
            Effect::Allow => StatementOutcome::Allow,
            Effect::Deny => StatementOutcome::Deny,
        }
    }
}

/// `ctx.action` is the full `service:action` string; `Action::matches` takes
/// the bare action name, so strip the service prefix the same way the
/// context's own `service` field identifies it.
fn action_name(full: &str) -> &str {
    full.split_once(':').map(|(_, action)| action).unwrap_or(full)
}

display_json!(Statement);
from_str_json!(Statement);

impl<'de> Deserialize<'de> for Statement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(StatementVisitor)
    }
}

struct StatementVisitor;
impl<'de> Visitor<'de> for StatementVisitor {
    type Value = Statement;

    fn expecting(&self, f: &mut Formatter) -> FmtResult {
        f.write_str("a map of statement properties")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Statement, A::Error> {
        let mut builder = Statement::builder();
        let mut sid_seen = false;
        let mut effect_seen = false;
        let mut action_seen = false;
        let mut resource_seen = false;
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
                "Action" => {
                    if action_seen {
                        return Err(serde::de::Error::duplicate_field("Action"));
                    }
                    action_seen = true;
                    builder.action(access.next_value::<ActionList>()?);
                }
                "Resource" => {
                    if resource_seen {
                        return Err(serde::de::Error::duplicate_field("Resource"));
                    }
                    resource_seen = true;
                    builder.resource(access.next_value::<ResourceList>()?);
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
                        &["Sid", "Effect", "Action", "Resource", "Condition"],
                    ));
                }
            }
        }

        builder.build().map_err(serde::de::Error::custom)
    }
}

impl StatementBuilder {
    fn validate(&self) -> Result<(), StatementBuilderError> {
        if self.effect.is_none() {
            return Err(StatementBuilderError::ValidationError("Effect must be set.".to_string()));
        }
        if self.action.is_none() {
            return Err(StatementBuilderError::ValidationError("Action must be set.".to_string()));
        }
        if self.resource.is_none() {
            return Err(StatementBuilderError::ValidationError("Resource must be set.".to_string()));
        }

        Ok(())
    }
}

pub type StatementList = Vec<Statement>;

#[cfg(test)]
mod tests {
    use {super::*, indoc::indoc, pretty_assertions::assert_eq};

    fn ctx(action: &str, service: &str, resource_arn: &str) -> EvalContext {
        use crate::resource::Arn;
        let arn: Arn = resource_arn.parse().unwrap();
        EvalContext::builder().action(action).service(service).build().unwrap().tap_resource(arn)
    }

    trait TapResource {
        fn tap_resource(self, arn: crate::resource::Arn) -> Self;
    }

    impl TapResource for EvalContext {
        fn tap_resource(mut self, arn: crate::resource::Arn) -> Self {
            self.resources.push(arn);
            self
        }
    }

    #[test_log::test]
    fn test_allow_match() {
        let s: Statement = serde_json::from_str(indoc! {r#"
        {
            "Effect": "Allow",
            "Action": "s3:GetObject",
            "Resource": "arn:aws:s3:::bucket/*"
        }"#}).unwrap();

        let ctx = ctx("s3:GetObject", "s3", "arn:aws:s3:::bucket/photo.png");
        assert_eq!(s.evaluate(&ctx), StatementOutcome::Allow);
    }

    #[test_log::test]
    fn test_no_match_wrong_action() {
        let s: Statement = serde_json::from_str(indoc! {r#"
        {
            "Effect": "Allow",
            "Action": "s3:GetObject",
            "Resource": "*"
        }"#}).unwrap();

        let ctx = ctx("s3:PutObject", "s3", "arn:aws:s3:::bucket/photo.png");
        assert_eq!(s.evaluate(&ctx), StatementOutcome::NoMatch);
    }

    #[test_log::test]
    fn test_deny_effect() {
        let s: Statement = serde_json::from_str(indoc! {r#"
        {
            "Effect": "Deny",
            "Action": "s3:*",
            "Resource": "*"
        }"#}).unwrap();

        let ctx = ctx("s3:GetObject", "s3", "arn:aws:s3:::bucket/photo.png");
        assert_eq!(s.evaluate(&ctx), StatementOutcome::Deny);
    }

    #[test_log::test]
    fn test_condition_filters() {
        let s: Statement = serde_json::from_str(indoc! {r#"
        {
            "Effect": "Allow",
            "Action": "s3:GetObject",
            "Resource": "*",
            "Condition": {
                "IpAddress": {
                    "aws:SourceIp": "192.168.1.0/24"
                }
            }
        }"#}).unwrap();

        let allowed_ctx = ctx("s3:GetObject", "s3", "arn:aws:s3:::bucket/photo.png").with_value("aws:SourceIp", "192.168.1.5");
        assert_eq!(s.evaluate(&allowed_ctx), StatementOutcome::Allow);

        let denied_ctx = ctx("s3:GetObject", "s3", "arn:aws:s3:::bucket/photo.png").with_value("aws:SourceIp", "10.0.0.1");
        assert_eq!(s.evaluate(&denied_ctx), StatementOutcome::NoMatch);
    }

    #[test_log::test]
    fn test_missing_effect_rejected() {
        let result: Result<Statement, _> = serde_json::from_str(indoc! {r#"
        {
            "Action": "s3:GetObject",
            "Resource": "*"
        }"#});
        assert!(result.is_err());
    }

    #[test_log::test]
    fn test_unknown_field_rejected() {
        let result: Result<Statement, _> = serde_json::from_str(indoc! {r#"
        {
            "Effect": "Allow",
            "Action": "s3:GetObject",
            "Resource": "*",
            "Principal": "*"
        }"#});
        assert!(result.is_err());
    }

    #[test_log::test]
    fn test_duplicate_field_rejected() {
        let result: Result<Statement, _> = serde_json::from_str(indoc! {r#"
        {
            "Effect": "Allow",
            "Effect": "Deny",
            "Action": "s3:GetObject",
            "Resource": "*"
        }"#});
        assert!(result.is_err());
    }
}
