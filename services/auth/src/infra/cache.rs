use std::sync::LazyLock;

use anyhow::Context as _;
use chrono::{DateTime, Duration, Utc};
use deadpool_redis::redis::{AsyncCommands, Script, cmd, pipe};
use deadpool_redis::{Connection, Pool, Runtime};
use tracing::warn;
use uuid::Uuid;

use crate::domain::repository::ChallengeStore;
use crate::domain::types::{IssueOutcome, OtpChallenge};
use crate::error::AuthServiceError;

/// Delete the challenge only if it still carries the expected id, together
/// with the limiter window opened by that same challenge.
static CONSUME_SCRIPT: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
local raw = redis.call('GET', KEYS[1])
if not raw then
    return 0
end
if cjson.decode(raw)['id'] ~= ARGV[1] then
    return 0
end
redis.call('DEL', KEYS[1])
if redis.call('GET', KEYS[2]) == ARGV[1] then
    redis.call('DEL', KEYS[2])
end
return 1
"#,
    )
});

/// Delete a key only if it still holds the expected value.
static RELEASE_SCRIPT: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
end
return 0
"#,
    )
});

/// Redis-backed challenge store shared by every auth replica.
///
/// `otp:{principal}` holds the JSON challenge for `retention`, which should
/// outlive the expiry window so late submissions still report an expired
/// code. `otp_limit:{principal}` is the atomic limiter gate, acquired with
/// `SET NX PX` and measured by the Redis clock. While a challenge is being
/// written it holds a random lease; afterwards it holds the challenge id, so
/// consuming that challenge also lifts the window and a failed write
/// releases it.
#[derive(Clone)]
pub struct RedisChallengeStore {
    pub pool: Pool,
    pub retention: Duration,
}

impl RedisChallengeStore {
    /// Retain challenges for twice the expiry window.
    pub fn new(pool: Pool, expire: Duration) -> Self {
        Self {
            pool,
            retention: expire * 2,
        }
    }

    /// Build a connection pool for `url`. Connections are opened lazily.
    pub fn connect(url: &str, expire: Duration) -> anyhow::Result<Self> {
        let pool = deadpool_redis::Config::from_url(url)
            .create_pool(Some(Runtime::Tokio1))
            .context("create redis pool")?;
        Ok(Self::new(pool, expire))
    }

    async fn conn(&self) -> Result<Connection, AuthServiceError> {
        self.pool
            .get()
            .await
            .map_err(|e| AuthServiceError::Internal(e.into()))
    }

    fn retention_secs(&self) -> u64 {
        u64::try_from(self.retention.num_seconds())
            .unwrap_or(1)
            .max(1)
    }

    /// Write the challenge and, when a limiter lease is held, hand the
    /// limiter key over to the challenge id without touching its TTL.
    async fn commit(
        &self,
        conn: &mut Connection,
        principal_id: &str,
        challenge: &OtpChallenge,
        limited: bool,
    ) -> Result<(), AuthServiceError> {
        let payload = serde_json::to_vec(challenge).context("serialize otp challenge")?;
        let mut tx = pipe();
        tx.atomic()
            .set_ex(challenge_key(principal_id), payload, self.retention_secs())
            .ignore();
        if limited {
            tx.cmd("SET")
                .arg(limiter_key(principal_id))
                .arg(challenge.id.to_string())
                .arg("XX")
                .arg("KEEPTTL")
                .ignore();
        }
        let (): () = tx
            .query_async(conn)
            .await
            .context("store otp challenge")?;
        Ok(())
    }
}

fn challenge_key(principal_id: &str) -> String {
    format!("otp:{}", principal_id)
}

fn limiter_key(principal_id: &str) -> String {
    format!("otp_limit:{}", principal_id)
}

impl ChallengeStore for RedisChallengeStore {
    async fn store_unless_recent<F>(
        &self,
        principal_id: &str,
        _now: DateTime<Utc>,
        limiter: Duration,
        issue: F,
    ) -> Result<IssueOutcome, AuthServiceError>
    where
        F: FnOnce() -> OtpChallenge + Send,
    {
        let mut conn = self.conn().await?;

        let limiter_ms = limiter.num_milliseconds();
        let limited = limiter_ms > 0;
        let key = limiter_key(principal_id);
        let lease = Uuid::new_v4().to_string();
        if limited {
            let acquired: Option<String> = cmd("SET")
                .arg(&key)
                .arg(&lease)
                .arg("NX")
                .arg("PX")
                .arg(limiter_ms)
                .query_async(&mut conn)
                .await
                .context("acquire otp limiter")?;
            if acquired.is_none() {
                let remaining_ms: i64 = conn.pttl(&key).await.context("read otp limiter ttl")?;
                return Ok(IssueOutcome::Limited {
                    retry_after: Duration::milliseconds(remaining_ms.max(0)),
                });
            }
        }

        let challenge = issue();
        if let Err(e) = self.commit(&mut conn, principal_id, &challenge, limited).await {
            if limited {
                let released: Result<i64, _> = RELEASE_SCRIPT
                    .key(&key)
                    .arg(&lease)
                    .invoke_async(&mut conn)
                    .await;
                if let Err(release_err) = released {
                    warn!(principal_id, error = %release_err, "failed to release otp limiter");
                }
            }
            return Err(e);
        }
        Ok(IssueOutcome::Issued(challenge))
    }

    async fn find(&self, principal_id: &str) -> Result<Option<OtpChallenge>, AuthServiceError> {
        let mut conn = self.conn().await?;
        let raw: Option<Vec<u8>> = conn
            .get(challenge_key(principal_id))
            .await
            .context("load otp challenge")?;
        raw.map(|bytes| serde_json::from_slice(&bytes).context("decode otp challenge"))
            .transpose()
            .map_err(AuthServiceError::from)
    }

    async fn consume(&self, principal_id: &str, challenge_id: Uuid) -> Result<bool, AuthServiceError> {
        let mut conn = self.conn().await?;
        let removed: i64 = CONSUME_SCRIPT
            .key(challenge_key(principal_id))
            .key(limiter_key(principal_id))
            .arg(challenge_id.to_string())
            .invoke_async(&mut conn)
            .await
            .context("consume otp challenge")?;
        Ok(removed == 1)
    }

    async fn ping(&self) -> Result<(), AuthServiceError> {
        let mut conn = self.conn().await?;
        let _: String = cmd("PING")
            .query_async(&mut conn)
            .await
            .context("ping redis")?;
        Ok(())
    }
}
