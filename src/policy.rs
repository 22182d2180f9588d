//! The top-level policy document (§4.1) and the per-document evaluator
//! (C3 — §4.4), using the same `PolicyVersion` and builder/Visitor
//! deserialization idiom as the rest of this crate. Evaluation scans every
//! statement (rather than stopping at the first match) so that a later
//! `Deny` dominates an earlier `Allow`, per §4.4's "a matched Deny dominates
//! any matched Allow" within a single policy.

use {
    crate::{
        context::EvalContext, display_json, effect::Effect, from_str_json, statement::{Statement, StatementList, StatementOutcome},
        IamError,
    },
    derive_builder::Builder,
    serde::{
        de::{Deserializer, MapAccess, Visitor},
        Deserialize, Serialize,
    },
    std::{
        fmt::{Display, Formatter, Result as FmtResult},
        str::FromStr,
    },
};

/// Only the one version this crate's policy language understands.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum PolicyVersion {
    #[default]
    None,
    V2012_10_17,
}

impl Display for PolicyVersion {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::None => f.write_str(""),
            Self::V2012_10_17 => f.write_str("2012-10-17"),
        }
    }
}

impl FromStr for PolicyVersion {
    type Err = IamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2012-10-17" => Ok(Self::V2012_10_17),
            _ => Err(IamError::validation(format!("invalid policy version: {}", s))),
        }
    }
}

impl<'de> Deserialize<'de> for PolicyVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PolicyVersion::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for PolicyVersion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Per-document outcome (C3), collapsed to `Allow`/`Deny`/`NoMatch` before
/// being handed to the Access Decision Engine (C5).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PolicyOutcome {
    NoMatch,
    Allow,
    Deny,
}

#[derive(Builder, Clone, Debug, Eq, PartialEq, Serialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct PolicyDocument {
    #[serde(rename = "Version")]
    version: PolicyVersion,

    #[builder(setter(into, strip_option), default)]
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    id: Option<String>,

    #[serde(rename = "Statement")]
    statement: StatementList,
}

impl PolicyDocument {
    pub fn builder() -> PolicyDocumentBuilder {
        PolicyDocumentBuilder::default()
    }

    #[inline]
    pub fn version(&self) -> PolicyVersion {
        self.version
    }

    #[inline]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    #[inline]
    pub fn statement(&self) -> &StatementList {
        &self.statement
    }

    /// Scan every statement; a matched `Deny` dominates a matched `Allow`.
    pub fn evaluate(&self, ctx: &EvalContext) -> PolicyOutcome {
        let mut allowed = false;

        for statement in &self.statement {
            match statement.evaluate(ctx) {
                StatementOutcome::Deny => return PolicyOutcome::Deny,
                StatementOutcome::Allow => allowed = true,
                StatementOutcome::NoMatch => {}
            }
        }

        if allowed {
            PolicyOutcome::Allow
        } else {
            PolicyOutcome::NoMatch
        }
    }

    /// Which statement indices matched and with what effect; used by the
    /// Access Decision Engine to build `matchedPolicies` (§4.5).
    pub fn matched_statement_indices(&self, ctx: &EvalContext) -> Vec<(usize, Effect)> {
        self.statement
            .iter()
            .enumerate()
            .filter_map(|(i, s)| match s.evaluate(ctx) {
                StatementOutcome::Allow => Some((i, Effect::Allow)),
                StatementOutcome::Deny => Some((i, Effect::Deny)),
                StatementOutcome::NoMatch => None,
            })
            .collect()
    }
}

display_json!(PolicyDocument);
from_str_json!(PolicyDocument);

impl<'de> Deserialize<'de> for PolicyDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(PolicyDocumentVisitor)
    }
}

struct PolicyDocumentVisitor;
impl<'de> Visitor<'de> for PolicyDocumentVisitor {
    type Value = PolicyDocument;

    fn expecting(&self, f: &mut Formatter) -> FmtResult {
        f.write_str("a policy document with Version and Statement")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<PolicyDocument, A::Error> {
        let mut builder = PolicyDocument::builder();
        let mut version_seen = false;
        let mut id_seen = false;
        let mut statement_seen = false;

        while let Some(key) = access.next_key::<&str>()? {
            match key {
                "Version" => {
                    if version_seen {
                        return Err(serde::de::Error::duplicate_field("Version"));
                    }
                    version_seen = true;
                    builder.version(access.next_value::<PolicyVersion>()?);
                }
                "Id" => {
                    if id_seen {
                        return Err(serde::de::Error::duplicate_field("Id"));
                    }
                    id_seen = true;
                    builder.id(access.next_value::<&str>()?);
                }
                "Statement" => {
                    if statement_seen {
                        return Err(serde::de::Error::duplicate_field("Statement"));
                    }
                    statement_seen = true;
                    builder.statement(access.next_value::<StatementList>()?);
                }
                _ => {
                    return Err(serde::de::Error::unknown_field(key, &["Version", "Id", "Statement"]));
                }
            }
        }

        if !version_seen {
            return Err(serde::de::Error::missing_field("Version"));
        }

        builder.build().map_err(serde::de::Error::custom)
    }
}

impl PolicyDocumentBuilder {
    fn validate(&self) -> Result<(), PolicyDocumentBuilderError> {
        match &self.statement {
            Some(list) if !list.is_empty() => Ok(()),
            _ => Err(PolicyDocumentBuilderError::ValidationError("Statement must be a non-empty array.".to_string())),
        }
    }
}
