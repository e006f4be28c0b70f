use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;

use crate::domain::repository::{ChallengeStore, CredentialStore, OtpDelivery, PasswordHasher};
use crate::error::AuthServiceError;
use crate::state::{AppState, Component};

// ── POST /auth/otp ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct IssueOtpRequest {
    pub principal_id: String,
}

pub async fn issue_otp<S, C, H, D>(
    State(state): State<AppState<S, C, H, D>>,
    Json(body): Json<IssueOtpRequest>,
) -> Result<impl IntoResponse, AuthServiceError>
where
    S: CredentialStore + Component,
    C: ChallengeStore + Component,
    H: PasswordHasher + Component,
    D: OtpDelivery + Component,
{
    let issued = state
        .issue_otp_usecase()
        .execute(&body.principal_id, &state.request_cancel())
        .await?;
    Ok((StatusCode::CREATED, Json(issued)))
}

// ── POST /auth/otp/validate ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ValidateOtpRequest {
    pub principal_id: String,
    pub code: String,
}

pub async fn validate_otp<S, C, H, D>(
    State(state): State<AppState<S, C, H, D>>,
    Json(body): Json<ValidateOtpRequest>,
) -> Result<StatusCode, AuthServiceError>
where
    S: CredentialStore + Component,
    C: ChallengeStore + Component,
    H: PasswordHasher + Component,
    D: OtpDelivery + Component,
{
    state
        .validate_otp_usecase()
        .execute(&body.principal_id, &body.code, &state.request_cancel())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
