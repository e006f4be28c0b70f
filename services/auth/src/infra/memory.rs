use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::repository::ChallengeStore;
use crate::domain::types::{IssueOutcome, OtpChallenge};
use crate::error::AuthServiceError;

/// Never sweep a map smaller than this.
const MIN_SWEEP_LEN: usize = 64;

struct Challenges {
    by_principal: HashMap<String, OtpChallenge>,
    /// Length at which the next insert sweeps stale challenges.
    sweep_at: usize,
}

/// Process-local challenge store.
///
/// Only principals with an outstanding challenge occupy an entry: consuming
/// removes it, and challenges older than `retention` are swept as the map
/// grows. Every operation runs under one lock without awaiting, which makes
/// check-then-set atomic.
#[derive(Clone)]
pub struct MemoryChallengeStore {
    inner: Arc<Mutex<Challenges>>,
    retention: Duration,
}

impl MemoryChallengeStore {
    /// Retain challenges for twice the expiry window, like the Redis store.
    pub fn new(expire: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Challenges {
                by_principal: HashMap::new(),
                sweep_at: MIN_SWEEP_LEN,
            })),
            retention: expire * 2,
        }
    }

    /// Number of principals with a stored challenge.
    pub fn len(&self) -> usize {
        self.lock().by_principal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Challenges> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Challenges {
    fn sweep(&mut self, now: DateTime<Utc>, retention: Duration) {
        self.by_principal
            .retain(|_, c| now - c.issued_at <= retention);
        self.sweep_at = (self.by_principal.len() * 2).max(MIN_SWEEP_LEN);
    }
}

impl ChallengeStore for MemoryChallengeStore {
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
        let mut challenges = self.lock();

        if let Some(existing) = challenges.by_principal.get(principal_id) {
            let elapsed = now - existing.issued_at;
            if elapsed < limiter {
                return Ok(IssueOutcome::Limited {
                    retry_after: limiter - elapsed,
                });
            }
        }

        let challenge = issue();
        challenges
            .by_principal
            .insert(principal_id.to_owned(), challenge.clone());
        if challenges.by_principal.len() >= challenges.sweep_at {
            challenges.sweep(now, self.retention);
        }
        Ok(IssueOutcome::Issued(challenge))
    }

    async fn find(&self, principal_id: &str) -> Result<Option<OtpChallenge>, AuthServiceError> {
        Ok(self.lock().by_principal.get(principal_id).cloned())
    }

    async fn consume(&self, principal_id: &str, challenge_id: Uuid) -> Result<bool, AuthServiceError> {
        let mut challenges = self.lock();
        let current = challenges
            .by_principal
            .get(principal_id)
            .is_some_and(|c| c.id == challenge_id);
        if current {
            challenges.by_principal.remove(principal_id);
        }
        Ok(current)
    }

    async fn ping(&self) -> Result<(), AuthServiceError> {
        Ok(())
    }
}
