use std::{
    error::Error,
    fmt::{Display, Formatter, Result as FmtResult},
};

/// The single error type that flows from policy-document parsing through to
/// the service layer: one `kind` tag plus a human-readable message, per the
/// error taxonomy this crate implements.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum IamError {
    /// Invalid payload: bad ARN, wrong policy version, malformed action,
    /// unknown condition operator, and similar parse/shape failures.
    Validation(String),

    /// Entity lookup miss (user, group, role, policy, session, ...).
    NotFound(String),

    /// Unique-constraint violation: duplicate name, already-attached policy.
    Conflict(String),

    /// Bad credentials, invalid/expired/revoked token.
    Authentication(String),

    /// The Access Decision Engine returned `Deny`.
    AuthorizationDenied { reason: String, matched_policies: Vec<String> },

    /// A delete was rejected because the resource is still attached somewhere.
    ResourceInUse { resource: String, attachment_count: usize },

    /// Storage layer unreachable; caller may retry.
    Transient(String),

    /// A caller-supplied deadline elapsed before the operation completed.
    DeadlineExceeded,

    /// Invariant violation or unexpected internal state.
    Internal(String),
}

impl Display for IamError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Validation(msg) => write!(f, "validation error: {}", msg),
            Self::NotFound(what) => write!(f, "not found: {}", what),
            Self::Conflict(msg) => write!(f, "conflict: {}", msg),
            Self::Authentication(msg) => write!(f, "authentication error: {}", msg),
            Self::AuthorizationDenied { reason, .. } => write!(f, "authorization denied: {}", reason),
            Self::ResourceInUse { resource, attachment_count } => {
                write!(f, "resource in use: {} has {} attachment(s)", resource, attachment_count)
            }
            Self::Transient(msg) => write!(f, "transient failure: {}", msg),
            Self::DeadlineExceeded => write!(f, "deadline exceeded"),
            Self::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl Error for IamError {}

impl IamError {
    #[inline]
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    #[inline]
    pub fn not_found<S: Into<String>>(what: S) -> Self {
        Self::NotFound(what.into())
    }

    #[inline]
    pub fn conflict<S: Into<String>>(msg: S) -> Self {
        Self::Conflict(msg.into())
    }

    #[inline]
    pub fn authentication<S: Into<String>>(msg: S) -> Self {
        Self::Authentication(msg.into())
    }

    #[inline]
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Storage failures alone are retried by the caller; everything else is
    /// surfaced unchanged (validation and authorization errors in particular).
    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

#[cfg(test)]
mod tests {
    use {crate::IamError, pretty_assertions::assert_eq};

    #[test_log::test]
    fn test_display() {
        assert_eq!(IamError::validation("bad Version").to_string(), "validation error: bad Version");
        assert_eq!(IamError::not_found("user u1").to_string(), "not found: user u1");
        assert_eq!(
            IamError::AuthorizationDenied { reason: "explicit deny".into(), matched_policies: vec![] }.to_string(),
            "authorization denied: explicit deny"
        );
        assert_eq!(IamError::DeadlineExceeded.to_string(), "deadline exceeded");
    }

    #[test_log::test]
    fn test_eq() {
        assert_eq!(IamError::validation("x"), IamError::validation("x"));
        assert_ne!(IamError::validation("x"), IamError::validation("y"));
    }
}
