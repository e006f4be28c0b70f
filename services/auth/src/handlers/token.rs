use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;

use crate::domain::repository::{ChallengeStore, CredentialStore, OtpDelivery, PasswordHasher};
use crate::error::AuthServiceError;
use crate::state::{AppState, Component};
use crate::usecase::token::LoginInput;

// ── POST /auth/login ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

pub async fn login<S, C, H, D>(
    State(state): State<AppState<S, C, H, D>>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthServiceError>
where
    S: CredentialStore + Component,
    C: ChallengeStore + Component,
    H: PasswordHasher + Component,
    D: OtpDelivery + Component,
{
    let detail = state
        .login_usecase()
        .execute(
            LoginInput {
                identifier: body.identifier,
                password: body.password,
            },
            &state.request_cancel(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// ── PATCH /auth/token ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

pub async fn refresh_token<S, C, H, D>(
    State(state): State<AppState<S, C, H, D>>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthServiceError>
where
    S: CredentialStore + Component,
    C: ChallengeStore + Component,
    H: PasswordHasher + Component,
    D: OtpDelivery + Component,
{
    let detail = state.refresh_usecase().execute(&body.refresh_token)?;
    Ok((StatusCode::CREATED, Json(detail)))
}
