use axum::{
    Router,
    routing::{get, patch, post},
};
use tower_http::trace::TraceLayer;

use portier_core::health::healthz;
use portier_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::domain::repository::{ChallengeStore, CredentialStore, OtpDelivery, PasswordHasher};
use crate::handlers::{
    health::readyz,
    otp::{issue_otp, validate_otp},
    token::{login, refresh_token},
    user::register_user,
};
use crate::state::{AppState, Component};

pub fn build_router<S, C, H, D>(state: AppState<S, C, H, D>) -> Router
where
    S: CredentialStore + Component,
    C: ChallengeStore + Component,
    H: PasswordHasher + Component,
    D: OtpDelivery + Component,
{
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz::<S, C, H, D>))
        // Token
        .route("/auth/login", post(login::<S, C, H, D>))
        .route("/auth/token", patch(refresh_token::<S, C, H, D>))
        // Registration
        .route("/auth/users", post(register_user::<S, C, H, D>))
        // OTP
        .route("/auth/otp", post(issue_otp::<S, C, H, D>))
        .route("/auth/otp/validate", post(validate_otp::<S, C, H, D>))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
