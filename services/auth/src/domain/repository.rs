//! Collaborator contracts consumed by the usecases.
//!
//! Methods return `impl Future + Send` so usecases stay `Send` when generic
//! over an implementation; implementors may still write `async fn`.

use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use portier_domain::id::RoleId;
use portier_domain::user::{NewUser, User};

use crate::domain::types::{IssueOutcome, OtpChallenge};
use crate::error::AuthServiceError;

/// User persistence. Uniqueness and password comparison live behind this contract.
pub trait CredentialStore: Send + Sync {
    fn exists_mobile_number(
        &self,
        mobile_number: &str,
    ) -> impl Future<Output = Result<bool, AuthServiceError>> + Send;

    fn exists_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<bool, AuthServiceError>> + Send;

    fn exists_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<bool, AuthServiceError>> + Send;

    /// Fetch the user matching `identifier` whose stored hash verifies `password`.
    ///
    /// Fails the same way for an unknown identifier and a wrong password.
    fn fetch_user_info(
        &self,
        identifier: &str,
        password: &str,
    ) -> impl Future<Output = Result<User, AuthServiceError>> + Send;

    /// Role assigned to newly registered users.
    fn get_default_role(&self) -> impl Future<Output = Result<RoleId, AuthServiceError>> + Send;

    fn create_user(
        &self,
        user: &NewUser,
    ) -> impl Future<Output = Result<User, AuthServiceError>> + Send;
}

/// Keyed storage for OTP challenges, at most one per principal.
pub trait ChallengeStore: Send + Sync {
    /// Atomically replace the principal's challenge with one built by `issue`,
    /// unless the current challenge was issued less than `limiter` before `now`.
    ///
    /// `issue` is only called when the write will happen. Two concurrent calls
    /// for the same principal never both observe an empty limiter window. A
    /// failed write leaves no limiter window behind.
    fn store_unless_recent<F>(
        &self,
        principal_id: &str,
        now: DateTime<Utc>,
        limiter: Duration,
        issue: F,
    ) -> impl Future<Output = Result<IssueOutcome, AuthServiceError>> + Send
    where
        F: FnOnce() -> OtpChallenge + Send;

    fn find(
        &self,
        principal_id: &str,
    ) -> impl Future<Output = Result<Option<OtpChallenge>, AuthServiceError>> + Send;

    /// Remove the principal's challenge if it is still `challenge_id`.
    /// Returns `true` if this call removed it. Removing the challenge also
    /// lifts its limiter window: the next issuance is not rate limited.
    fn consume(
        &self,
        principal_id: &str,
        challenge_id: Uuid,
    ) -> impl Future<Output = Result<bool, AuthServiceError>> + Send;

    /// Succeeds when the store can serve requests.
    fn ping(&self) -> impl Future<Output = Result<(), AuthServiceError>> + Send;
}

/// Password hashing capability used on registration.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> impl Future<Output = Result<String, AuthServiceError>> + Send;
}

/// Out-of-band channel (SMS, email) that carries a code to its principal.
pub trait OtpDelivery: Send + Sync {
    fn deliver(
        &self,
        principal_id: &str,
        code: &str,
    ) -> impl Future<Output = Result<(), AuthServiceError>> + Send;
}
