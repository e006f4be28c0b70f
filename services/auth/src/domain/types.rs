use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use portier_domain::id::UserId;
use portier_domain::user::User;

/// Access/refresh token pair returned by a successful authentication.
#[derive(Debug, Clone, Serialize)]
pub struct TokenDetail {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds since UNIX epoch.
    pub access_token_exp: u64,
    /// Seconds since UNIX epoch.
    pub refresh_token_exp: u64,
}

/// Identity facts embedded in both tokens of a pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
    pub roles: Vec<String>,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            roles: user.role_names(),
        }
    }
}

/// The single outstanding one-time passcode for a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpChallenge {
    /// Distinguishes successive challenges so consumption can compare-and-delete.
    pub id: Uuid,
    pub principal_id: String,
    pub code: String,
    pub issued_at: DateTime<Utc>,
}

impl OtpChallenge {
    pub fn expires_at(&self, expire: Duration) -> DateTime<Utc> {
        self.issued_at + expire
    }

    /// Expired strictly after `issued_at + expire`; the boundary instant is still valid.
    pub fn is_expired_at(&self, now: DateTime<Utc>, expire: Duration) -> bool {
        now > self.expires_at(expire)
    }
}

/// Result of an atomic issue attempt against a challenge store.
#[derive(Debug, Clone)]
pub enum IssueOutcome {
    Issued(OtpChallenge),
    /// The previous challenge is too recent; nothing was generated or written.
    Limited { retry_after: Duration },
}

/// Confirmation returned to the caller after a code was issued and handed off
/// for delivery. Never carries the code.
#[derive(Debug, Clone, Serialize)]
pub struct OtpIssued {
    pub principal_id: String,
    pub expires_at: DateTime<Utc>,
    pub resend_after: DateTime<Utc>,
}
