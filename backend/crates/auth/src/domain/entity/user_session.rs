//! User Session Entity
//!
//! A server-side session: opaque token mapped to a user. A user may hold
//! several sessions at once; `session_id` is unique.

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::value_object::user_id::UserId;

/// Session record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    /// Opaque random token (cookie value)
    pub session_id: String,
    /// Owner
    pub user_id: UserId,
    /// Set once at creation
    pub created_at: DateTime<Utc>,
}

impl UserSession {
    /// Create a session starting now
    pub fn new(session_id: impl Into<String>, user_id: UserId) -> Self {
        Self::new_at(session_id, user_id, Utc::now())
    }

    /// Create a session with an explicit creation time
    pub fn new_at(session_id: impl Into<String>, user_id: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            session_id: session_id.into(),
            user_id,
            created_at,
        }
    }

    /// Whether this session is past its lifetime at `now`
    pub fn is_expired_at(&self, policy: ExpirationPolicy, now: DateTime<Utc>) -> bool {
        policy.is_expired(self.created_at, now)
    }
}

/// Session lifetime policy
///
/// A duration of zero or less disables expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExpirationPolicy {
    duration_secs: i64,
}

impl ExpirationPolicy {
    /// Sessions never expire
    pub const NEVER: Self = Self { duration_secs: 0 };

    pub fn from_secs(duration_secs: i64) -> Self {
        Self { duration_secs }
    }

    pub fn duration_secs(&self) -> i64 {
        self.duration_secs
    }

    /// Whether a lifetime is enforced at all
    ///
    /// Durations too large for a `TimeDelta` count as no lifetime.
    pub fn is_enabled(&self) -> bool {
        self.lifetime().is_some()
    }

    fn lifetime(&self) -> Option<TimeDelta> {
        if self.duration_secs <= 0 {
            return None;
        }
        TimeDelta::try_seconds(self.duration_secs)
    }

    /// Instant after which a session created at `created_at` is dead
    pub fn expires_at(&self, created_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        created_at.checked_add_signed(self.lifetime()?)
    }

    /// `created_at + duration` strictly before `now`
    pub fn is_expired(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.expires_at(created_at)
            .is_some_and(|deadline| deadline < now)
    }

    /// Oldest creation time still alive at `now`
    ///
    /// Used to purge persisted sessions; `None` when nothing can expire.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        now.checked_sub_signed(self.lifetime()?)
    }
}
