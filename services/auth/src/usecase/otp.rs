use chrono::{DateTime, Duration, Utc};
use rand::RngExt;
use subtle::ConstantTimeEq;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::OtpConfig;
use crate::domain::repository::{ChallengeStore, OtpDelivery};
use crate::domain::types::{IssueOutcome, OtpChallenge, OtpIssued};
use crate::error::AuthServiceError;
use crate::usecase::cancellable;

/// Most digits a `u32` code can carry.
const MAX_DIGITS: u32 = 9;

/// Uniformly random code with exactly `digits` decimal digits, first digit non-zero.
///
/// `digits` is clamped to `1..=9`; `OtpConfig::validate` rejects anything else
/// at startup.
pub(crate) fn generate_code(digits: u32) -> String {
    let digits = digits.clamp(1, MAX_DIGITS);
    let low = 10u32.pow(digits - 1);
    let high = 10u32.pow(digits) - 1;
    let mut rng = rand::rng();
    rng.random_range(low..=high).to_string()
}

/// Whole seconds until a resend is allowed, rounded up so clients never retry early.
fn retry_after_secs(retry_after: Duration) -> u64 {
    let ms = u64::try_from(retry_after.num_milliseconds()).unwrap_or_default();
    ms.div_ceil(1000).max(1)
}

/// Per-principal OTP lifecycle: NoChallenge → Active → (consumed | Expired).
#[derive(Clone)]
pub struct OtpManager<C> {
    store: C,
    config: OtpConfig,
}

impl<C: ChallengeStore> OtpManager<C> {
    pub fn new(store: C, config: OtpConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &OtpConfig {
        &self.config
    }

    pub fn store(&self) -> &C {
        &self.store
    }

    pub async fn issue_code(&self, principal_id: &str) -> Result<OtpChallenge, AuthServiceError> {
        self.issue_code_at(principal_id, Utc::now()).await
    }

    /// Issue a fresh code unless the previous one is younger than the limiter
    /// interval, in which case the previous code stays in force untouched.
    pub async fn issue_code_at(
        &self,
        principal_id: &str,
        now: DateTime<Utc>,
    ) -> Result<OtpChallenge, AuthServiceError> {
        let digits = self.config.digits;
        let outcome = self
            .store
            .store_unless_recent(principal_id, now, self.config.limiter, || OtpChallenge {
                id: Uuid::new_v4(),
                principal_id: principal_id.to_owned(),
                code: generate_code(digits),
                issued_at: now,
            })
            .await?;

        match outcome {
            IssueOutcome::Issued(challenge) => Ok(challenge),
            IssueOutcome::Limited { retry_after } => {
                let retry_after_secs = retry_after_secs(retry_after);
                warn!(principal_id, retry_after_secs, "otp requested within limiter interval");
                Err(AuthServiceError::RateLimited { retry_after_secs })
            }
        }
    }

    pub async fn validate_code(
        &self,
        principal_id: &str,
        code: &str,
    ) -> Result<(), AuthServiceError> {
        self.validate_code_at(principal_id, code, Utc::now()).await
    }

    /// Single-use check. An expired challenge is discarded without looking at
    /// `code`; a mismatch leaves the challenge in place.
    pub async fn validate_code_at(
        &self,
        principal_id: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AuthServiceError> {
        let challenge = self
            .store
            .find(principal_id)
            .await?
            .ok_or(AuthServiceError::NoActiveChallenge)?;

        if challenge.is_expired_at(now, self.config.expire) {
            self.store.consume(principal_id, challenge.id).await?;
            return Err(AuthServiceError::CodeExpired);
        }

        let matches: bool = challenge.code.as_bytes().ct_eq(code.as_bytes()).into();
        if !matches {
            return Err(AuthServiceError::CodeMismatch);
        }

        // A concurrent validation may have consumed it between find and here.
        if !self.store.consume(principal_id, challenge.id).await? {
            return Err(AuthServiceError::NoActiveChallenge);
        }
        Ok(())
    }
}

// ── IssueOtp ─────────────────────────────────────────────────────────────────

pub struct IssueOtpUseCase<C: ChallengeStore, D: OtpDelivery> {
    pub otp: OtpManager<C>,
    pub delivery: D,
}

impl<C: ChallengeStore, D: OtpDelivery> IssueOtpUseCase<C, D> {
    pub async fn execute(
        &self,
        principal_id: &str,
        cancel: &CancellationToken,
    ) -> Result<OtpIssued, AuthServiceError> {
        let challenge = cancellable(cancel, self.otp.issue_code(principal_id)).await?;
        cancellable(cancel, self.delivery.deliver(principal_id, &challenge.code)).await?;

        let config = self.otp.config();
        info!(principal_id, "otp issued");
        Ok(OtpIssued {
            principal_id: challenge.principal_id.clone(),
            expires_at: challenge.expires_at(config.expire),
            resend_after: challenge.issued_at + config.limiter,
        })
    }
}

// ── ValidateOtp ──────────────────────────────────────────────────────────────

pub struct ValidateOtpUseCase<C: ChallengeStore> {
    pub otp: OtpManager<C>,
}

impl<C: ChallengeStore> ValidateOtpUseCase<C> {
    pub async fn execute(
        &self,
        principal_id: &str,
        code: &str,
        cancel: &CancellationToken,
    ) -> Result<(), AuthServiceError> {
        cancellable(cancel, self.otp.validate_code(principal_id, code)).await?;
        info!(principal_id, "otp validated");
        Ok(())
    }
}
