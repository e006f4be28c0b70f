use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;

use crate::domain::repository::{ChallengeStore, CredentialStore, OtpDelivery, PasswordHasher};
use crate::error::AuthServiceError;
use crate::state::{AppState, Component};
use crate::usecase::user::RegisterUserInput;

#[derive(Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_number: String,
    pub password: String,
}

pub async fn register_user<S, C, H, D>(
    State(state): State<AppState<S, C, H, D>>,
    Json(body): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, AuthServiceError>
where
    S: CredentialStore + Component,
    C: ChallengeStore + Component,
    H: PasswordHasher + Component,
    D: OtpDelivery + Component,
{
    let user = state
        .register_usecase()
        .execute(
            RegisterUserInput {
                username: body.username,
                first_name: body.first_name,
                last_name: body.last_name,
                email: body.email,
                mobile_number: body.mobile_number,
                password: body.password,
            },
            &state.request_cancel(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}
