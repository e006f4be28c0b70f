use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::domain::repository::ChallengeStore;
use crate::domain::types::{IssueOutcome, OtpChallenge};
use crate::error::AuthServiceError;
use crate::infra::cache::RedisChallengeStore;
use crate::infra::memory::MemoryChallengeStore;

/// Challenge store chosen at startup from configuration.
#[derive(Clone)]
pub enum ChallengeBackend {
    Memory(MemoryChallengeStore),
    Redis(RedisChallengeStore),
}

impl ChallengeBackend {
    /// Redis when `REDIS_URL` is set, otherwise a process-local store.
    pub fn from_config(config: &AuthConfig) -> anyhow::Result<Self> {
        Ok(match &config.redis_url {
            Some(url) => Self::Redis(RedisChallengeStore::connect(url, config.otp.expire)?),
            None => Self::Memory(MemoryChallengeStore::new(config.otp.expire)),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Redis(_) => "redis",
        }
    }
}

impl ChallengeStore for ChallengeBackend {
    async fn store_unless_recent<F>(
        &self,
        principal_id: &str,
        now: DateTime<Utc>,
        limiter: Duration,
        issue: F,
    ) -> Result<IssueOutcome, AuthServiceError>
    where
        F: FnOnce() -> OtpChallenge + Send,
    {
        match self {
            Self::Memory(s) => s.store_unless_recent(principal_id, now, limiter, issue).await,
            Self::Redis(s) => s.store_unless_recent(principal_id, now, limiter, issue).await,
        }
    }

    async fn find(&self, principal_id: &str) -> Result<Option<OtpChallenge>, AuthServiceError> {
        match self {
            Self::Memory(s) => s.find(principal_id).await,
            Self::Redis(s) => s.find(principal_id).await,
        }
    }

    async fn consume(&self, principal_id: &str, challenge_id: Uuid) -> Result<bool, AuthServiceError> {
        match self {
            Self::Memory(s) => s.consume(principal_id, challenge_id).await,
            Self::Redis(s) => s.consume(principal_id, challenge_id).await,
        }
    }

    async fn ping(&self) -> Result<(), AuthServiceError> {
        match self {
            Self::Memory(s) => s.ping().await,
            Self::Redis(s) => s.ping().await,
        }
    }
}
