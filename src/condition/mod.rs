//! Condition handling (C2): a `Condition` block passes iff every operator in
//! it passes; an operator passes iff every `(contextKey, expectedValue)`
//! under it passes. A BTreeMap-backed `Condition` newtype, trimmed to the
//! operator set §4.3 requires.

mod boolean;
mod date;
mod ipaddr;
mod numeric;
mod op;
mod string;

pub use op::ConditionOperator;

use {
    crate::{context::EvalContext, display_json, serutil::StringLikeStrList},
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
};

pub type ConditionBlock = BTreeMap<String, StringLikeStrList>;

/// A `Statement.Condition` object: operator name → `{contextKey: values}`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Condition(BTreeMap<ConditionOperator, ConditionBlock>);

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, op: &ConditionOperator) -> Option<&ConditionBlock> {
        self.0.get(op)
    }

    pub fn insert(&mut self, op: ConditionOperator, block: ConditionBlock) -> Option<ConditionBlock> {
        self.0.insert(op, block)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ConditionOperator, &ConditionBlock)> {
        self.0.iter()
    }

    /// Every operator must pass; the empty condition trivially passes.
    pub fn matches(&self, ctx: &EvalContext) -> bool {
        self.0.iter().all(|(op, block)| op.matches(block, ctx))
    }
}

impl FromIterator<(ConditionOperator, ConditionBlock)> for Condition {
    fn from_iter<I: IntoIterator<Item = (ConditionOperator, ConditionBlock)>>(iter: I) -> Self {
        Self(BTreeMap::from_iter(iter))
    }
}

display_json!(Condition);
