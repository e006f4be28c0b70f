use axum::{extract::State, http::StatusCode};

use portier_core::health::readiness;

use crate::domain::repository::{ChallengeStore, CredentialStore, OtpDelivery, PasswordHasher};
use crate::state::{AppState, Component};

// ── GET /readyz ───────────────────────────────────────────────────────────────

/// Ready once the OTP challenge store answers.
pub async fn readyz<S, C, H, D>(State(state): State<AppState<S, C, H, D>>) -> StatusCode
where
    S: CredentialStore + Component,
    C: ChallengeStore + Component,
    H: PasswordHasher + Component,
    D: OtpDelivery + Component,
{
    readiness("challenge store", state.otp.store().ping().await)
}
