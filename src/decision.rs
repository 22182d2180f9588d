//! Access Decision Engine (C5 — §4.5): aggregates the per-policy outcomes
//! of the Policy Evaluator (C3) across the full policy set a Policy
//! Resolver (C4) hands it. Grounded on `policy.rs`'s full-scan,
//! deny-dominates aggregation, lifted one level to span *multiple*
//! documents instead of the statements within one.

use {
    crate::{context::EvalContext, effect::Effect, policy::PolicyDocument},
    serde::Serialize,
    std::fmt::{Display, Formatter, Result as FmtResult},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum Decision {
    Allow,
    Deny,
}

impl Display for Decision {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.write_str(match self {
            Self::Allow => "ALLOW",
            Self::Deny => "DENY",
        })
    }
}

/// One policy document that matched the request, for the audit trail in
/// `AccessDecision::matched_policies`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MatchedPolicy {
    pub policy_id: String,
    pub policy_name: String,
    pub effect: Effect,
    pub statement_index: usize,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct AccessDecision {
    pub decision: Decision,
    pub reason: String,
    pub matched_policies: Vec<MatchedPolicy>,
}

/// A policy as resolved by C4: its identity plus the document to evaluate.
pub struct ResolvedPolicy<'a> {
    pub policy_id: String,
    pub policy_name: String,
    pub document: &'a PolicyDocument,
}

/// §4.5: any `Deny` anywhere in the set wins; else any `Allow` wins; else
/// implicit deny. `matched_policies` records every statement that
/// participated in the final decision's effect, across every document,
/// not just the first one found.
pub fn evaluate_access(ctx: &EvalContext, policies: &[ResolvedPolicy]) -> AccessDecision {
    let mut allow_matches = Vec::new();
    let mut deny_matches = Vec::new();

    for policy in policies {
        for (statement_index, effect) in policy.document.matched_statement_indices(ctx) {
            let matched = MatchedPolicy {
                policy_id: policy.policy_id.clone(),
                policy_name: policy.policy_name.clone(),
                effect,
                statement_index,
            };

            match effect {
                Effect::Deny => deny_matches.push(matched),
                Effect::Allow => allow_matches.push(matched),
            }
        }
    }

    if !deny_matches.is_empty() {
        let reason = format!("Explicit deny from policy {}", deny_matches[0].policy_name);
        return AccessDecision { decision: Decision::Deny, reason, matched_policies: deny_matches };
    }

    if !allow_matches.is_empty() {
        let reason = format!("Allowed by policy {}", allow_matches[0].policy_name);
        return AccessDecision { decision: Decision::Allow, reason, matched_policies: allow_matches };
    }

    AccessDecision {
        decision: Decision::Deny,
        reason: "No policy allows this action; default deny".to_string(),
        matched_policies: Vec::new(),
    }
}
