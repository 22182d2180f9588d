//! Session lifecycle (C8 — §4.9): the state machine `AssumeRole -> Active
//! -> {Expired, Revoked}`, plus `RefreshExtend` as an `Active -> Active`
//! self-loop. Pure functions over `model::Session`; the `Store` traits own
//! persistence.

use {
    crate::model::{Role, Session},
    chrono::{DateTime, Duration, Utc},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionState {
    Active,
    Expired,
    Revoked,
}

pub fn session_state(session: &Session, now: DateTime<Utc>) -> SessionState {
    if !session.is_active {
        SessionState::Revoked
    } else if session.is_expired(now) {
        SessionState::Expired
    } else {
        SessionState::Active
    }
}

/// §4.9 AssumeRole: `expiresAt = now + min(requestedDuration,
/// role.maxSessionDuration)`, default 3600 seconds when no duration is
/// requested.
pub fn compute_assume_role_expiry(role: &Role, requested_duration_secs: Option<u32>, assumed_at: DateTime<Utc>) -> DateTime<Utc> {
    let requested = requested_duration_secs.unwrap_or(Role::DEFAULT_SESSION_DURATION);
    let bounded = requested.min(role.max_session_duration);
    assumed_at + Duration::seconds(bounded as i64)
}

/// §4.9 RefreshExtend: a refresh may push `expiresAt` forward by
/// `extend_by_secs`, but never past `assumedAt + role.maxSessionDuration`.
/// Rejects extending a session that is not currently `Active`.
pub fn compute_refresh_extension(
    session: &Session,
    role: &Role,
    extend_by_secs: u32,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, crate::IamError> {
    if session_state(session, now) != SessionState::Active {
        return Err(crate::IamError::validation("cannot refresh a session that is not active"));
    }

    let ceiling = session.assumed_at + Duration::seconds(role.max_session_duration as i64);
    let requested = session.expires_at + Duration::seconds(extend_by_secs as i64);
    Ok(requested.min(ceiling))
}
