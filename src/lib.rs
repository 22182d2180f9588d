#![warn(clippy::all)]

//! Multi-tenant IAM policy evaluation, role assumption, and session
//! management. The module layout mirrors the ten components this crate
//! implements: pattern matching and condition evaluation feed the policy
//! evaluator, which the access decision engine aggregates across a
//! resolved policy set; trust evaluation, credential issuance, and the
//! session/revocation stores back role assumption; the gate ties all of
//! it together behind one per-request entry point.

pub mod action;
pub mod condition;
pub mod config;
pub mod context;
pub mod credential;
pub mod decision;
pub mod effect;
pub mod error;
pub mod gate;
pub mod matcher;
pub mod model;
pub mod policy;
pub mod principal;
pub mod resolver;
pub mod resource;
#[macro_use]
pub mod serutil;
pub mod session;
pub mod statement;
pub mod store;
pub mod trust;

pub use {
    action::{Action, ActionList},
    condition::{Condition, ConditionOperator},
    context::{EvalContext, EvalContextBuilder},
    decision::{evaluate_access, AccessDecision, Decision, MatchedPolicy, ResolvedPolicy},
    effect::Effect,
    error::IamError,
    policy::{PolicyDocument, PolicyOutcome, PolicyVersion},
    principal::{Actor, Principal, PrincipalType},
    resource::{Arn, Resource, ResourceList},
    statement::{Statement, StatementList, StatementOutcome},
    trust::{TrustDecision, TrustPolicy, TrustStatement},
};
